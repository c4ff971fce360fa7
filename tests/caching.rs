//! Integration tests for the generated-class cache.
//!
//! Verifies the identity invariant: structurally equal requests resolve to the same
//! runtime class, carriers are shared across proxy instances, open generic
//! definitions are generated once and closed per argument list, and blueprints
//! replay onto the identical cached class.

use proxyscope::prelude::*;
use std::sync::Arc;

fn greeter_contract(model: &TypeModel) -> Result<TypeDescRc> {
    TypeDesc::interface("demo", "IGreeter")
        .method(
            MethodDesc::build("greet")
                .param("name", ValueType::Str)
                .returns(ValueType::Str),
        )
        .build(model)
}

struct Greeter {
    token: Token,
}

impl Greeter {
    fn new() -> Arc<Self> {
        Arc::new(Greeter {
            token: Token::alloc(TokenKind::TypeDesc),
        })
    }
}

impl Dispatch for Greeter {
    fn type_token(&self) -> Token {
        self.token
    }

    fn invoke(
        &self,
        _method: &MethodDesc,
        _generic_args: &[ValueType],
        args: &mut [Value],
    ) -> Result<Value> {
        Ok(Value::Str(format!("hello {}", args[0].as_str()?)))
    }
}

#[test]
fn test_equal_requests_share_one_class() -> Result<()> {
    let model = TypeModel::new();
    let contract = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let options = ProxyGenerationOptions::default();
    let first = generator.create_interface_proxy_without_target_type(&contract, &[], &options)?;
    let second =
        generator.create_interface_proxy_without_target_type(&contract, &[], &options)?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(generator.scope().generated_type_count(), 1);
    Ok(())
}

#[test]
fn test_distinct_kinds_get_distinct_classes() -> Result<()> {
    let model = TypeModel::new();
    let contract = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let options = ProxyGenerationOptions::default();
    let without =
        generator.create_interface_proxy_without_target_type(&contract, &[], &options)?;
    let replaceable = generator
        .create_interface_proxy_with_target_interface_type(&contract, &[], &options)?;

    assert!(!Arc::ptr_eq(&without, &replaceable));
    assert_eq!(generator.scope().generated_type_count(), 2);
    Ok(())
}

#[test]
fn test_instances_share_class_and_carriers() -> Result<()> {
    let model = TypeModel::new();
    let contract = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let options = ProxyGenerationOptions::default();
    let first = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Greeter::new(),
        &options,
        vec![Arc::new(StandardInterceptor)],
    )?;
    let carriers_after_first = generator.scope().invocation_class_count();

    let second = generator.create_interface_proxy_with_target(
        &contract,
        &[],
        Greeter::new(),
        &options,
        vec![Arc::new(StandardInterceptor)],
    )?;

    assert!(Arc::ptr_eq(first.class(), second.class()));
    // The second instance reused every cached carrier.
    assert_eq!(
        generator.scope().invocation_class_count(),
        carriers_after_first
    );

    let greet = contract.method_by_name("greet").unwrap();
    let reply = second.invoke(&greet, &[], &mut [Value::Str("world".to_string())])?;
    assert_eq!(reply, Value::Str("hello world".to_string()));
    Ok(())
}

#[test]
fn test_hook_identity_splits_the_cache() -> Result<()> {
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
    let contract = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let mut options_a = ProxyGenerationOptions::default();
    options_a.set_hook(Arc::new(NamedHook("a")));
    let mut options_b = ProxyGenerationOptions::default();
    options_b.set_hook(Arc::new(NamedHook("b")));

    let class_a =
        generator.create_interface_proxy_without_target_type(&contract, &[], &options_a)?;
    let class_b =
        generator.create_interface_proxy_without_target_type(&contract, &[], &options_b)?;

    assert!(!Arc::ptr_eq(&class_a, &class_b));
    Ok(())
}

#[test]
fn test_additional_interface_order_is_irrelevant() -> Result<()> {
    let model = TypeModel::new();
    let contract = greeter_contract(&model)?;
    let extra_a = TypeDesc::interface("demo", "IAudited")
        .method(MethodDesc::build("audit"))
        .build(&model)?;
    let extra_b = TypeDesc::interface("demo", "ITagged")
        .method(MethodDesc::build("tag").returns(ValueType::Str))
        .build(&model)?;
    let generator = ProxyGenerator::new(model);

    let options = ProxyGenerationOptions::default();
    let forward = generator.create_interface_proxy_without_target_type(
        &contract,
        &[extra_a.clone(), extra_b.clone()],
        &options,
    )?;
    let reversed = generator.create_interface_proxy_without_target_type(
        &contract,
        &[extra_b, extra_a],
        &options,
    )?;

    assert!(Arc::ptr_eq(&forward, &reversed));
    Ok(())
}

#[test]
fn test_open_generic_definition_is_generated_once() -> Result<()> {
    let model = TypeModel::new();
    let open = TypeDesc::interface("demo", "IRepository")
        .generic_params(&["T"])
        .method(
            MethodDesc::build("get")
                .param("id", ValueType::Int32)
                .returns(ValueType::TypeGeneric(0)),
        )
        .build(&model)?;

    let closed_int = model.instantiate(open.token(), &[ValueType::Int32])?;
    let closed_str = model.instantiate(open.token(), &[ValueType::Str])?;
    let generator = ProxyGenerator::new(model);

    let options = ProxyGenerationOptions::default();
    let class_int =
        generator.create_interface_proxy_without_target_type(&closed_int, &[], &options)?;
    let class_str =
        generator.create_interface_proxy_without_target_type(&closed_str, &[], &options)?;

    assert!(!Arc::ptr_eq(&class_int, &class_str));
    assert_eq!(class_int.generic_source(), class_str.generic_source());
    // One cached top-level class: the shared open definition.
    assert_eq!(generator.scope().generated_type_count(), 1);

    let again =
        generator.create_interface_proxy_without_target_type(&closed_int, &[], &options)?;
    assert!(Arc::ptr_eq(&class_int, &again));
    Ok(())
}

#[test]
fn test_closed_generic_classes_type_check_at_runtime() -> Result<()> {
    struct Shelf {
        token: Token,
    }

    impl Dispatch for Shelf {
        fn type_token(&self) -> Token {
            self.token
        }

        fn invoke(
            &self,
            _method: &MethodDesc,
            _generic_args: &[ValueType],
            _args: &mut [Value],
        ) -> Result<Value> {
            Ok(Value::Str("stored".to_string()))
        }
    }

    let model = TypeModel::new();
    let open = TypeDesc::interface("demo", "IRepository")
        .generic_params(&["T"])
        .method(
            MethodDesc::build("get")
                .param("id", ValueType::Int32)
                .returns(ValueType::TypeGeneric(0)),
        )
        .build(&model)?;
    let closed = model.instantiate(open.token(), &[ValueType::Str])?;
    let generator = ProxyGenerator::new(model);

    let target: DynObject = Arc::new(Shelf {
        token: Token::alloc(TokenKind::TypeDesc),
    });
    let proxy = generator.create_interface_proxy_with_target(
        &closed,
        &[],
        target,
        &ProxyGenerationOptions::default(),
        vec![Arc::new(StandardInterceptor)],
    )?;

    let get = closed.method_by_name("get").unwrap();
    let reply = proxy.invoke(&get, &[], &mut [Value::Int32(1)])?;
    assert_eq!(reply, Value::Str("stored".to_string()));
    Ok(())
}

#[test]
fn test_open_definition_rejects_instance_creation() -> Result<()> {
    let model = TypeModel::new();
    let open = TypeDesc::interface("demo", "IRepository")
        .generic_params(&["T"])
        .method(MethodDesc::build("get").returns(ValueType::TypeGeneric(0)))
        .build(&model)?;
    let generator = ProxyGenerator::new(model);

    let outcome = generator.create_interface_proxy_without_target(
        &open,
        &[],
        &ProxyGenerationOptions::default(),
        vec![],
    );
    assert!(matches!(outcome, Err(Error::GenericTypeDefinition { .. })));

    // The type-only variant still serves the open definition.
    let definition = generator.create_interface_proxy_without_target_type(
        &open,
        &[],
        &ProxyGenerationOptions::default(),
    )?;
    assert!(definition.is_open_generic());
    Ok(())
}

#[test]
fn test_blueprint_replays_onto_the_cached_class() -> Result<()> {
    let model = TypeModel::new();
    let contract = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model);

    let original = generator.create_interface_proxy_without_target_type(
        &contract,
        &[],
        &ProxyGenerationOptions::default(),
    )?;

    let blueprint = ProxyBlueprint::new(
        ProxyKind::InterfaceWithoutTarget,
        contract.token(),
        None,
        Vec::new(),
        ProxyGenerationOptions::default(),
    );
    let replayed = generator.replay(&blueprint)?;

    assert!(Arc::ptr_eq(&original, &replayed));
    assert_eq!(generator.scope().generated_type_count(), 1);
    Ok(())
}

#[test]
fn test_blueprint_key_matches_generation_key() -> Result<()> {
    let model = TypeModel::new();
    let contract = greeter_contract(&model)?;
    let generator = ProxyGenerator::new(model.clone());

    let blueprint = ProxyBlueprint::new(
        ProxyKind::InterfaceWithoutTarget,
        contract.token(),
        None,
        Vec::new(),
        ProxyGenerationOptions::default(),
    );

    generator.create_interface_proxy_without_target_type(
        &contract,
        &[],
        &ProxyGenerationOptions::default(),
    )?;

    assert!(generator
        .scope()
        .get_from_cache(&blueprint.cache_key())
        .is_some());
    Ok(())
}
