//! Integration tests for interface proxy shapes.
//!
//! Covers the three interface shapes end to end: fixed target, replaceable target,
//! and no target, exercising argument round-trips, interceptor ordering,
//! short-circuiting, by-ref copy-back and the terminal no-target failure.

use proxyscope::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn calculator_contract(model: &TypeModel) -> Result<TypeDescRc> {
    TypeDesc::interface("demo", "ICalculator")
        .method(
            MethodDesc::build("sum")
                .param("a", ValueType::Int32)
                .param("b", ValueType::Int32)
                .returns(ValueType::Int32),
        )
        .method(MethodDesc::build("fill").by_ref_param("slot", ValueType::Int32))
        .build(model)
}

struct Calculator {
    token: Token,
    bias: i32,
    calls: AtomicUsize,
}

impl Calculator {
    fn new(bias: i32) -> Arc<Self> {
        Arc::new(Calculator {
            token: Token::alloc(TokenKind::TypeDesc),
            bias,
            calls: AtomicUsize::new(0),
        })
    }
}

impl Dispatch for Calculator {
    fn type_token(&self) -> Token {
        self.token
    }

    fn invoke(
        &self,
        method: &MethodDesc,
        _generic_args: &[ValueType],
        args: &mut [Value],
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method.name() {
            "sum" => Ok(Value::Int32(args[0].as_i32()? + args[1].as_i32()? + self.bias)),
            "fill" => {
                args[0] = Value::Int32(7);
                Ok(Value::Unit)
            }
            other => Err(Error::Custom(format!("unknown member '{other}'"))),
        }
    }
}

struct Recorder {
    log: Mutex<Vec<String>>,
}

impl Recorder {
    fn new() -> Arc<Self> {
        Arc::new(Recorder {
            log: Mutex::new(Vec::new()),
        })
    }

    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Interceptor for Recorder {
    fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(invocation.method().name().to_string());
        invocation.proceed()
    }
}

#[test]
fn test_arguments_round_trip_through_the_chain() -> Result<()> {
    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let target = Calculator::new(0);
    let generator = ProxyGenerator::new(model);

    let recorder = Recorder::new();
    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        target.clone(),
        &ProxyGenerationOptions::default(),
        vec![recorder.clone()],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let mut args = [Value::Int32(20), Value::Int32(25)];
    let result = proxy.invoke(&sum, &[], &mut args)?;

    assert_eq!(result, Value::Int32(45));
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.entries(), vec!["sum".to_string()]);
    Ok(())
}

#[test]
fn test_interceptors_run_in_chain_order() -> Result<()> {
    struct Tagger {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Interceptor for Tagger {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            self.log.lock().unwrap().push(self.tag);
            invocation.proceed()
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let log = Arc::new(Mutex::new(Vec::new()));
    let first: InterceptorRc = Arc::new(Tagger {
        tag: "first",
        log: log.clone(),
    });
    let second: InterceptorRc = Arc::new(Tagger {
        tag: "second",
        log: log.clone(),
    });

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Calculator::new(0),
        &ProxyGenerationOptions::default(),
        vec![first, second],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    proxy.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)])?;

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    Ok(())
}

#[test]
fn test_short_circuit_skips_the_target() -> Result<()> {
    struct ShortCircuit;

    impl Interceptor for ShortCircuit {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            invocation.set_return_value(Value::Int32(-1));
            Ok(())
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let target = Calculator::new(0);
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        target.clone(),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(ShortCircuit)],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(20), Value::Int32(25)])?;

    assert_eq!(result, Value::Int32(-1));
    assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_interceptor_rewrites_arguments_before_target() -> Result<()> {
    struct DoubleFirst;

    impl Interceptor for DoubleFirst {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            let doubled = invocation.get_argument(0).unwrap().as_i32()? * 2;
            invocation.set_argument(0, Value::Int32(doubled))?;
            invocation.proceed()
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Calculator::new(0),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(DoubleFirst)],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(10), Value::Int32(5)])?;

    assert_eq!(result, Value::Int32(25));
    Ok(())
}

#[test]
fn test_by_ref_arguments_copy_back_on_error() -> Result<()> {
    struct WriteThenFail;

    impl Interceptor for WriteThenFail {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            invocation.set_argument(0, Value::Int32(99))?;
            Err(Error::Custom("deliberate failure".to_string()))
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Calculator::new(0),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(WriteThenFail)],
    )?;

    let fill = contract.method_by_name("fill").unwrap();
    let mut args = [Value::Int32(0)];
    let outcome = proxy.invoke(&fill, &[], &mut args);

    assert!(outcome.is_err());
    // Output the chain produced before failing is still visible to the caller.
    assert_eq!(args[0], Value::Int32(99));
    Ok(())
}

#[test]
fn test_proceed_without_target_is_terminal() -> Result<()> {
    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_without_target(
        &contract,
        &[],
        &ProxyGenerationOptions::default(),
        vec![Arc::new(StandardInterceptor)],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let outcome = proxy.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)]);

    match outcome {
        Err(Error::NoTarget { method }) => assert_eq!(method, "sum"),
        other => panic!("expected NoTarget, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_targetless_proxy_works_when_interceptors_answer() -> Result<()> {
    struct FixedAnswer;

    impl Interceptor for FixedAnswer {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            invocation.set_return_value(Value::Int32(42));
            Ok(())
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_without_target(
        &contract,
        &[],
        &ProxyGenerationOptions::default(),
        vec![Arc::new(FixedAnswer)],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(0), Value::Int32(0)])?;
    assert_eq!(result, Value::Int32(42));
    Ok(())
}

#[test]
fn test_change_invocation_target_mid_call() -> Result<()> {
    struct Redirect {
        replacement: DynObject,
    }

    impl Interceptor for Redirect {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            invocation.change_invocation_target(self.replacement.clone())?;
            invocation.proceed()
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let original = Calculator::new(0);
    let replacement = Calculator::new(100);
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target_interface(
        &contract,
        &[],
        Some(original.clone()),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(Redirect {
            replacement: replacement.clone(),
        })],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(20), Value::Int32(25)])?;

    assert_eq!(result, Value::Int32(145));
    assert_eq!(original.calls.load(Ordering::SeqCst), 0);
    assert_eq!(replacement.calls.load(Ordering::SeqCst), 1);

    // The replacement was scoped to that one call; the stored slot is untouched.
    let original_obj: DynObject = original;
    let stored = proxy.target()?.unwrap();
    assert!(Arc::ptr_eq(&stored, &original_obj));
    Ok(())
}

#[test]
fn test_replaceable_shape_fails_on_empty_slot() -> Result<()> {
    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target_interface(
        &contract,
        &[],
        None,
        &ProxyGenerationOptions::default(),
        vec![Arc::new(StandardInterceptor)],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let outcome = proxy.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)]);

    match outcome {
        Err(Error::InvalidProxyTarget { method }) => assert_eq!(method, "sum"),
        other => panic!("expected InvalidProxyTarget, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_fixed_target_change_is_rejected() -> Result<()> {
    struct Redirect {
        replacement: DynObject,
    }

    impl Interceptor for Redirect {
        fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
            invocation.change_invocation_target(self.replacement.clone())
        }
    }

    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Calculator::new(0),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(Redirect {
            replacement: Calculator::new(1),
        })],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let outcome = proxy.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)]);
    assert!(matches!(outcome, Err(Error::Violation { .. })));
    Ok(())
}

#[test]
fn test_argument_shape_is_validated() -> Result<()> {
    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Calculator::new(0),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(StandardInterceptor)],
    )?;

    let sum = contract.method_by_name("sum").unwrap();

    let wrong_count = proxy.invoke(&sum, &[], &mut [Value::Int32(1)]);
    assert!(matches!(
        wrong_count,
        Err(Error::ArgumentCount {
            expected: 2,
            actual: 1
        })
    ));

    let wrong_type = proxy.invoke(
        &sum,
        &[],
        &mut [Value::Str("not a number".to_string()), Value::Int32(2)],
    );
    assert!(matches!(
        wrong_type,
        Err(Error::ArgumentType { index: 0, .. })
    ));
    Ok(())
}

#[test]
fn test_proxying_a_proxy_is_rejected() -> Result<()> {
    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let inner = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Calculator::new(0),
        &ProxyGenerationOptions::default(),
        vec![],
    )?;

    let outcome = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        inner,
        &ProxyGenerationOptions::default(),
        vec![],
    );
    assert!(matches!(outcome, Err(Error::TargetAlreadyProxy { .. })));
    Ok(())
}

fn worker_contract(model: &TypeModel) -> Result<(TypeDescRc, TypeDescRc)> {
    let interface = TypeDesc::interface("demo", "IWorker")
        .method(MethodDesc::build("run").returns(ValueType::Int32))
        .build(model)?;
    let run = interface.method_by_name("run").unwrap();
    let class = TypeDesc::class("demo", "Worker")
        .implements(interface.token())
        .method(
            MethodDesc::build("run_explicit")
                .returns(ValueType::Int32)
                .attributes(MethodAttributes::VIRTUAL),
        )
        .map_interface_method(run.token(), "run_explicit")
        .build(model)?;
    Ok((interface, class))
}

struct Worker {
    token: Token,
    seen: Mutex<Vec<String>>,
}

impl Worker {
    fn described(class: &TypeDesc) -> Arc<Self> {
        Arc::new(Worker {
            token: class.token(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl Dispatch for Worker {
    fn type_token(&self) -> Token {
        self.token
    }

    fn invoke(
        &self,
        method: &MethodDesc,
        _generic_args: &[ValueType],
        _args: &mut [Value],
    ) -> Result<Value> {
        self.seen.lock().unwrap().push(method.name().to_string());
        match method.name() {
            "run_explicit" => Ok(Value::Int32(7)),
            other => Err(Error::Custom(format!("unknown member '{other}'"))),
        }
    }
}

#[test]
fn test_explicit_implementation_receives_its_own_identity() -> Result<()> {
    let model = TypeModel::new();
    let (interface, class) = worker_contract(&model)?;
    let target = Worker::described(&class);
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &interface,
        &[],
        target.clone(),
        &ProxyGenerationOptions::default(),
        vec![Arc::new(StandardInterceptor)],
    )?;

    let run = interface.method_by_name("run").unwrap();
    let result = proxy.invoke(&run, &[], &mut [])?;

    assert_eq!(result, Value::Int32(7));
    // The class exposes the member under its own name; that is what it must see.
    assert_eq!(
        *target.seen.lock().unwrap(),
        vec!["run_explicit".to_string()]
    );
    assert_eq!(generator.scope().delegate_class_count(), 1);
    Ok(())
}

#[test]
fn test_delegate_shapes_are_shared_across_generations() -> Result<()> {
    struct NamedHook(&'static str);

    impl GenerationHook for NamedHook {
        fn should_intercept_method(&self, _proxied_type: &TypeDesc, _method: &MethodDesc) -> bool {
            true
        }

        fn non_proxyable_member_notification(
            &self,
            _proxied_type: &TypeDesc,
            _method: &MethodDesc,
            _reason: &str,
        ) {
        }

        fn methods_inspected(&self) {}

        fn fingerprint(&self) -> String {
            format!("tests::NamedHook::{}", self.0)
        }
    }

    let model = TypeModel::new();
    let (interface, class) = worker_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let mut options_a = ProxyGenerationOptions::default();
    options_a.set_hook(Arc::new(NamedHook("a")));
    let mut options_b = ProxyGenerationOptions::default();
    options_b.set_hook(Arc::new(NamedHook("b")));

    let class_a = generator.create_interface_proxy_with_target_type(
        &interface,
        &[],
        Some(class.clone()),
        &options_a,
    )?;
    let class_b = generator.create_interface_proxy_with_target_type(
        &interface,
        &[],
        Some(class.clone()),
        &options_b,
    )?;

    // Distinct hooks force two proxy types; the delegate shape is keyed only by the
    // declaring type and member, so both share one.
    assert!(!Arc::ptr_eq(&class_a, &class_b));
    assert_eq!(generator.scope().generated_type_count(), 2);
    assert_eq!(generator.scope().delegate_class_count(), 1);
    Ok(())
}

#[test]
fn test_empty_chain_falls_through_to_target() -> Result<()> {
    let model = TypeModel::new();
    let contract = calculator_contract(&model)?;
    let target = Calculator::new(0);
    let generator = ProxyGenerator::new(model);

    let proxy = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        target.clone(),
        &ProxyGenerationOptions::default(),
        vec![],
    )?;

    let sum = contract.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(3), Value::Int32(4)])?;
    assert_eq!(result, Value::Int32(7));
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    Ok(())
}
