//! Integration tests for mixins and interceptor selectors.

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
        .build(model)
}

fn greeter_contract(model: &TypeModel) -> Result<TypeDescRc> {
    TypeDesc::interface("demo", "IGreeter")
        .method(
            MethodDesc::build("greet")
                .param("name", ValueType::Str)
                .returns(ValueType::Str),
        )
        .build(model)
}

/// Answers for whichever interface its token claims; used both as target and mixin.
struct Answering {
    token: Token,
    reply: i32,
    calls: AtomicUsize,
}

impl Answering {
    fn with_token(token: Token, reply: i32) -> Arc<Self> {
        Arc::new(Answering {
            token,
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn unregistered(reply: i32) -> Arc<Self> {
        Self::with_token(Token::alloc(TokenKind::TypeDesc), reply)
    }
}

impl Dispatch for Answering {
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
            "sum" => Ok(Value::Int32(args[0].as_i32()? + args[1].as_i32()? + self.reply)),
            "greet" => Ok(Value::Str(format!("reply {}", self.reply))),
            other => Err(Error::Custom(format!("unknown member '{other}'"))),
        }
    }
}

#[test]
fn test_mixin_interface_is_answered_by_the_mixin_instance() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let greeter = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let target = Answering::unregistered(0);
    let mixin = Answering::with_token(greeter.token(), 9);

    let mut options = ProxyGenerationOptions::default();
    options.add_mixin_instance(mixin.clone());

    let proxy = generator.create_interface_proxy_with_target(
        &calculator,
        &[],
        target.clone(),
        &options,
        vec![Arc::new(StandardInterceptor)],
    )?;

    let greet = greeter.method_by_name("greet").unwrap();
    let reply = proxy.invoke(&greet, &[], &mut [Value::Str("hi".to_string())])?;
    assert_eq!(reply, Value::Str("reply 9".to_string()));
    assert_eq!(mixin.calls.load(Ordering::SeqCst), 1);
    assert_eq!(target.calls.load(Ordering::SeqCst), 0);

    let sum = calculator.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)])?;
    assert_eq!(result, Value::Int32(3));
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_target_wins_over_mixin_for_claimed_interfaces() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let target = Answering::unregistered(0);
    // This mixin claims the proxied interface itself; the target must keep it.
    let shadowing_mixin = Answering::with_token(calculator.token(), 1000);

    let mut options = ProxyGenerationOptions::default();
    options.add_mixin_instance(shadowing_mixin.clone());

    let proxy = generator.create_interface_proxy_with_target(
        &calculator,
        &[],
        target.clone(),
        &options,
        vec![],
    )?;

    let sum = calculator.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(20), Value::Int32(25)])?;

    assert_eq!(result, Value::Int32(45));
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    assert_eq!(shadowing_mixin.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_duplicate_mixin_interfaces_are_rejected() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let greeter = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let mut options = ProxyGenerationOptions::default();
    options.add_mixin_instance(Answering::with_token(greeter.token(), 1));
    options.add_mixin_instance(Answering::with_token(greeter.token(), 2));

    let outcome = generator.create_interface_proxy_without_target_type(
        &calculator,
        &[],
        &options,
    );
    match outcome {
        Err(Error::DuplicateMixin(token)) => assert_eq!(token, greeter.token()),
        other => panic!("expected DuplicateMixin, got {other:?}"),
    }
    Ok(())
}

struct CountingSelector {
    invocations: AtomicUsize,
    keep_methods: Vec<String>,
}

impl InterceptorSelector for CountingSelector {
    fn select_interceptors(
        &self,
        _proxied_type: &TypeDesc,
        method: &MethodDesc,
        interceptors: &[InterceptorRc],
    ) -> Vec<InterceptorRc> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.keep_methods.iter().any(|m| m == method.name()) {
            interceptors.to_vec()
        } else {
            Vec::new()
        }
    }

    fn fingerprint(&self) -> String {
        format!("tests::CountingSelector::{}", self.keep_methods.join(","))
    }
}

struct Blocker;

impl Interceptor for Blocker {
    fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
        invocation.set_return_value(Value::Int32(-1));
        Ok(())
    }
}

#[test]
fn test_selector_narrows_the_chain_per_method() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let selector = Arc::new(CountingSelector {
        invocations: AtomicUsize::new(0),
        keep_methods: Vec::new(),
    });
    let mut options = ProxyGenerationOptions::default();
    options.set_selector(selector.clone());

    let target = Answering::unregistered(0);
    let proxy = generator.create_interface_proxy_with_target(
        &calculator,
        &[],
        target.clone(),
        &options,
        vec![Arc::new(Blocker)],
    )?;

    // The selector dropped the blocker, so the call reaches the target.
    let sum = calculator.method_by_name("sum").unwrap();
    let result = proxy.invoke(&sum, &[], &mut [Value::Int32(20), Value::Int32(25)])?;
    assert_eq!(result, Value::Int32(45));
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_selector_runs_once_per_instance_and_method() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let selector = Arc::new(CountingSelector {
        invocations: AtomicUsize::new(0),
        keep_methods: vec!["sum".to_string()],
    });
    let mut options = ProxyGenerationOptions::default();
    options.set_selector(selector.clone());

    let proxy = generator.create_interface_proxy_with_target(
        &calculator,
        &[],
        Answering::unregistered(0),
        &options,
        vec![Arc::new(StandardInterceptor)],
    )?;

    let sum = calculator.method_by_name("sum").unwrap();
    proxy.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)])?;
    proxy.invoke(&sum, &[], &mut [Value::Int32(3), Value::Int32(4)])?;
    proxy.invoke(&sum, &[], &mut [Value::Int32(5), Value::Int32(6)])?;

    // The filtered chain is memoized on the instance after the first call.
    assert_eq!(selector.invocations.load(Ordering::SeqCst), 1);

    // A fresh instance computes its own memo.
    let other = generator.create_interface_proxy_with_target(
        &calculator,
        &[],
        Answering::unregistered(0),
        &options,
        vec![Arc::new(StandardInterceptor)],
    )?;
    other.invoke(&sum, &[], &mut [Value::Int32(1), Value::Int32(2)])?;
    assert_eq!(selector.invocations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_selector_identity_participates_in_caching() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let mut with_selector = ProxyGenerationOptions::default();
    with_selector.set_selector(Arc::new(CountingSelector {
        invocations: AtomicUsize::new(0),
        keep_methods: Vec::new(),
    }));

    let plain = generator.create_interface_proxy_without_target_type(
        &calculator,
        &[],
        &ProxyGenerationOptions::default(),
    )?;
    let selected =
        generator.create_interface_proxy_without_target_type(&calculator, &[], &with_selector)?;

    assert!(!Arc::ptr_eq(&plain, &selected));
    Ok(())
}

#[test]
fn test_mixin_instances_do_not_split_the_cache() -> Result<()> {
    let model = TypeModel::new();
    let calculator = calculator_contract(&model)?;
    let greeter = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let mut options_a = ProxyGenerationOptions::default();
    options_a.add_mixin_instance(Answering::with_token(greeter.token(), 1));
    let mut options_b = ProxyGenerationOptions::default();
    options_b.add_mixin_instance(Answering::with_token(greeter.token(), 2));

    let class_a =
        generator.create_interface_proxy_without_target_type(&calculator, &[], &options_a)?;
    let class_b =
        generator.create_interface_proxy_without_target_type(&calculator, &[], &options_b)?;

    // Same mixin interface set, different instances: one generated class.
    assert!(Arc::ptr_eq(&class_a, &class_b));
    Ok(())
}
