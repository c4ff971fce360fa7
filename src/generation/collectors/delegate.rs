//! Collector for delegate shapes.

use crate::generation::collectors::MembersCollector;
use crate::generation::hook::HookRc;
use crate::generation::meta::{DispatchRule, MetaMethod, MetaType};
use crate::model::registry::TypeModel;
use crate::model::types::TypeDescRc;
use crate::Result;

/// Name of the single member a delegate shape carries.
pub const DELEGATE_INVOKE: &str = "invoke";

/// Collects the single `invoke` member of a delegate shape.
pub struct DelegateMembersCollector {
    delegate: TypeDescRc,
}

impl DelegateMembersCollector {
    /// Creates a collector over the given delegate shape.
    #[must_use]
    pub fn new(delegate: TypeDescRc) -> Self {
        DelegateMembersCollector { delegate }
    }
}

impl MembersCollector for DelegateMembersCollector {
    fn collect(&self, _model: &TypeModel, hook: &HookRc, meta: &mut MetaType) -> Result<()> {
        let Some(invoke) = self.delegate.method_by_name(DELEGATE_INVOKE) else {
            return Err(violation_error!(
                "delegate shape '{}' has no '{}' member",
                self.delegate.full_name(),
                DELEGATE_INVOKE
            ));
        };
        let proxyable = hook.should_intercept_method(&self.delegate, &invoke);
        meta.add_method(MetaMethod::new(
            invoke.clone(),
            Some(invoke),
            proxyable,
            true,
            DispatchRule::Direct,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::hook::AllMethodsHook;
    use crate::model::types::{MethodDesc, TypeDesc};
    use crate::model::value::ValueType;
    use std::sync::Arc;

    #[test]
    fn test_collects_only_invoke() {
        let model = TypeModel::new();
        let shape = TypeDesc::delegate("Demo", "Adder")
            .method(
                MethodDesc::build(DELEGATE_INVOKE)
                    .param("a", ValueType::Int32)
                    .param("b", ValueType::Int32)
                    .returns(ValueType::Int32),
            )
            .build(&model)
            .unwrap();

        let hook: HookRc = Arc::new(AllMethodsHook);
        let mut meta = MetaType::new();
        DelegateMembersCollector::new(shape)
            .collect(&model, &hook, &mut meta)
            .unwrap();
        assert_eq!(meta.methods().len(), 1);
        assert_eq!(meta.methods()[0].method().name(), DELEGATE_INVOKE);
    }
}
