//! Collectors for class contracts.

use crate::generation::collectors::{group_accessors, MembersCollector};
use crate::generation::hook::HookRc;
use crate::generation::meta::{DispatchRule, MetaMethod, MetaType};
use crate::model::flags::MethodAttributes;
use crate::model::registry::TypeModel;
use crate::model::types::{MethodDescRc, TypeDescRc};
use crate::Result;

/// Collects a class's members, walking its base chain most-derived first.
///
/// Only overridable members can be intercepted; sealed and non-virtual members get
/// flagged to the hook with the reason and are carried as non-proxyable pass-through
/// entries so the proxy still exposes the full class surface. Infrastructure members
/// never surface at all.
pub struct ClassMembersCollector {
    class: TypeDescRc,
}

impl ClassMembersCollector {
    /// Creates a collector over the given class.
    #[must_use]
    pub fn new(class: TypeDescRc) -> Self {
        ClassMembersCollector { class }
    }
}

impl MembersCollector for ClassMembersCollector {
    fn collect(&self, model: &TypeModel, hook: &HookRc, meta: &mut MetaType) -> Result<()> {
        collect_class_members(&self.class, model, hook, meta)
    }
}

/// Collects a class's members for a proxy forwarding to a held instance of it.
///
/// Identical surface walk to [`ClassMembersCollector`]; entries differ only in that
/// the counterpart on the target is the member itself, which the contributor later
/// pairs with composition-style target resolution.
pub struct WrappedClassMembersCollector {
    class: TypeDescRc,
}

impl WrappedClassMembersCollector {
    /// Creates a collector over the given class.
    #[must_use]
    pub fn new(class: TypeDescRc) -> Self {
        WrappedClassMembersCollector { class }
    }
}

impl MembersCollector for WrappedClassMembersCollector {
    fn collect(&self, model: &TypeModel, hook: &HookRc, meta: &mut MetaType) -> Result<()> {
        collect_class_members(&self.class, model, hook, meta)
    }
}

fn collect_class_members(
    class: &TypeDescRc,
    model: &TypeModel,
    hook: &HookRc,
    meta: &mut MetaType,
) -> Result<()> {
    let mut current = Some(class.clone());
    while let Some(level) = current {
        for (_, method) in level.methods().iter() {
            if let Some(member) = classify(class, method, hook) {
                meta.add_method(member);
            }
        }
        group_accessors(&level, meta);
        current = match level.base() {
            Some(base) => Some(model.resolve(base)?),
            None => None,
        };
    }
    Ok(())
}

fn classify(class: &TypeDescRc, method: &MethodDescRc, hook: &HookRc) -> Option<MetaMethod> {
    let attributes = method.attributes();
    if attributes.contains(MethodAttributes::INFRASTRUCTURE) {
        return None;
    }

    if !attributes.is_overridable() {
        let reason = if attributes.contains(MethodAttributes::FINAL) {
            "member is sealed"
        } else {
            "member is not virtual"
        };
        hook.non_proxyable_member_notification(class, method, reason);
        return Some(MetaMethod::new(
            method.clone(),
            Some(method.clone()),
            false,
            true,
            DispatchRule::Direct,
        ));
    }

    let proxyable = hook.should_intercept_method(class, method);
    Some(MetaMethod::new(
        method.clone(),
        Some(method.clone()),
        proxyable,
        true,
        DispatchRule::Direct,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::hook::{AllMethodsHook, GenerationHook};
    use crate::model::types::{MethodDesc, TypeDesc};
    use crate::model::value::ValueType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHook {
        declined: AtomicUsize,
    }

    impl GenerationHook for CountingHook {
        fn should_intercept_method(
            &self,
            _proxied_type: &crate::model::types::TypeDesc,
            _method: &MethodDesc,
        ) -> bool {
            true
        }

        fn non_proxyable_member_notification(
            &self,
            _proxied_type: &crate::model::types::TypeDesc,
            _method: &MethodDesc,
            _reason: &str,
        ) {
            self.declined.fetch_add(1, Ordering::Relaxed);
        }

        fn methods_inspected(&self) {}
    }

    #[test]
    fn test_base_chain_walked_most_derived_first() {
        let model = TypeModel::new();
        let base = TypeDesc::class("Demo", "Animal")
            .method(MethodDesc::build("speak").returns(ValueType::Str))
            .build(&model)
            .unwrap();
        let derived = TypeDesc::class("Demo", "Dog")
            .base(base.token())
            .method(MethodDesc::build("speak").returns(ValueType::Str))
            .method(MethodDesc::build("fetch"))
            .build(&model)
            .unwrap();

        let hook: HookRc = Arc::new(AllMethodsHook);
        let mut meta = MetaType::new();
        ClassMembersCollector::new(derived.clone())
            .collect(&model, &hook, &mut meta)
            .unwrap();

        // The base's `speak` is shadowed by signature; only the derived entry survives.
        assert_eq!(meta.methods().len(), 2);
        assert_eq!(
            meta.methods()[0].method().declaring_type(),
            derived.token()
        );
    }

    #[test]
    fn test_non_virtual_members_notify_and_pass_through() {
        let model = TypeModel::new();
        let class = TypeDesc::class("Demo", "Service")
            .method(MethodDesc::build("frozen").attributes(MethodAttributes::PUBLIC))
            .method(MethodDesc::build("open"))
            .build(&model)
            .unwrap();

        let hook = Arc::new(CountingHook {
            declined: AtomicUsize::new(0),
        });
        let dyn_hook: HookRc = hook.clone();
        let mut meta = MetaType::new();
        ClassMembersCollector::new(class)
            .collect(&model, &dyn_hook, &mut meta)
            .unwrap();

        assert_eq!(hook.declined.load(Ordering::Relaxed), 1);
        let frozen = meta
            .methods()
            .iter()
            .find(|m| m.method().name() == "frozen")
            .unwrap();
        assert!(!frozen.proxyable());
        assert!(frozen.has_target());
    }
}
