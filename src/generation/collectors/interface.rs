//! Collectors for interface contracts.

use crate::generation::collectors::{group_accessors, MembersCollector};
use crate::generation::hook::HookRc;
use crate::generation::meta::{DispatchRule, MetaMethod, MetaType};
use crate::model::registry::TypeModel;
use crate::model::types::TypeDescRc;
use crate::Result;

/// Collects an interface's members with no backing target.
///
/// Every member is interceptable; whether it is intercepted is the hook's call.
/// Members without interception and without a target have nothing to run, which the
/// method generator turns into the default-value member body.
pub struct InterfaceMembersCollector {
    interface: TypeDescRc,
    backed: bool,
}

impl InterfaceMembersCollector {
    /// Creates a collector over an interface with no live implementation behind it.
    #[must_use]
    pub fn new(interface: TypeDescRc) -> Self {
        InterfaceMembersCollector {
            interface,
            backed: false,
        }
    }

    /// Creates a collector over an interface backed by an object implementing it
    /// under the interface's own member identities (mixins, interface targets without
    /// a described class).
    #[must_use]
    pub fn backed(interface: TypeDescRc) -> Self {
        InterfaceMembersCollector {
            interface,
            backed: true,
        }
    }
}

impl MembersCollector for InterfaceMembersCollector {
    fn collect(&self, _model: &TypeModel, hook: &HookRc, meta: &mut MetaType) -> Result<()> {
        for (_, method) in self.interface.methods().iter() {
            let proxyable = hook.should_intercept_method(&self.interface, method);
            let on_target = self.backed.then(|| method.clone());
            meta.add_method(MetaMethod::new(
                method.clone(),
                on_target,
                proxyable,
                self.backed,
                DispatchRule::Direct,
            ));
        }
        group_accessors(&self.interface, meta);
        Ok(())
    }
}

/// Collects an interface's members resolved against a class's interface map.
///
/// Each interface member maps to the class method implementing it. Implementations the
/// class exposes under a different identity or without public access are still
/// reachable, through a generated delegate shape rather than direct dispatch.
pub struct InterfaceMembersOnClassCollector {
    interface: TypeDescRc,
    target: TypeDescRc,
}

impl InterfaceMembersOnClassCollector {
    /// Creates a collector resolving `interface` against `target`.
    #[must_use]
    pub fn new(interface: TypeDescRc, target: TypeDescRc) -> Self {
        InterfaceMembersOnClassCollector { interface, target }
    }
}

impl MembersCollector for InterfaceMembersOnClassCollector {
    fn collect(&self, _model: &TypeModel, hook: &HookRc, meta: &mut MetaType) -> Result<()> {
        for (_, method) in self.interface.methods().iter() {
            let mapped = self
                .target
                .interface_map()
                .get(&method.token())
                .and_then(|t| self.target.method_by_token(*t));

            let dispatch = match &mapped {
                Some(on_target) if !on_target.attributes().is_directly_accessible() => {
                    DispatchRule::Indirect
                }
                _ => DispatchRule::Direct,
            };

            let proxyable = hook.should_intercept_method(&self.interface, method);
            meta.add_method(MetaMethod::new(
                method.clone(),
                mapped,
                proxyable,
                true,
                dispatch,
            ));
        }
        group_accessors(&self.interface, meta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::hook::AllMethodsHook;
    use crate::model::flags::MethodAttributes;
    use crate::model::types::{MethodDesc, TypeDesc};
    use crate::model::value::ValueType;
    use std::sync::Arc;

    #[test]
    fn test_interface_members_have_no_target() {
        let model = TypeModel::new();
        let contract = TypeDesc::interface("Demo", "IGreeter")
            .method(
                MethodDesc::build("greet")
                    .param("name", ValueType::Str)
                    .returns(ValueType::Str),
            )
            .build(&model)
            .unwrap();

        let hook: HookRc = Arc::new(AllMethodsHook);
        let mut meta = MetaType::new();
        InterfaceMembersCollector::new(contract)
            .collect(&model, &hook, &mut meta)
            .unwrap();

        assert_eq!(meta.methods().len(), 1);
        let member = &meta.methods()[0];
        assert!(member.proxyable());
        assert!(!member.has_target());
        assert!(member.method_on_target().is_none());
    }

    #[test]
    fn test_event_accessors_group_into_one_entry() {
        let model = TypeModel::new();
        let contract = TypeDesc::interface("Demo", "IObservable")
            .method(
                MethodDesc::build("add_changed")
                    .param("handler", ValueType::Object(None))
                    .event_add("changed"),
            )
            .method(
                MethodDesc::build("remove_changed")
                    .param("handler", ValueType::Object(None))
                    .event_remove("changed"),
            )
            .build(&model)
            .unwrap();

        let hook: HookRc = Arc::new(AllMethodsHook);
        let mut meta = MetaType::new();
        InterfaceMembersCollector::new(contract)
            .collect(&model, &hook, &mut meta)
            .unwrap();

        assert_eq!(meta.events().len(), 1);
        let event = &meta.events()[0];
        assert_eq!(event.name, "changed");
        assert_eq!(event.add.as_ref().unwrap().method().name(), "add_changed");
        assert_eq!(
            event.remove.as_ref().unwrap().method().name(),
            "remove_changed"
        );
    }

    #[test]
    fn test_explicit_implementation_goes_indirect() {
        let model = TypeModel::new();
        let contract = TypeDesc::interface("Demo", "IWorker")
            .method(MethodDesc::build("run"))
            .build(&model)
            .unwrap();
        let iface_run = contract.method_by_name("run").unwrap();

        let target = TypeDesc::class("Demo", "Worker")
            .implements(contract.token())
            .method(MethodDesc::build("run_explicit").attributes(MethodAttributes::VIRTUAL))
            .map_interface_method(iface_run.token(), "run_explicit")
            .build(&model)
            .unwrap();

        let hook: HookRc = Arc::new(AllMethodsHook);
        let mut meta = MetaType::new();
        InterfaceMembersOnClassCollector::new(contract, target)
            .collect(&model, &hook, &mut meta)
            .unwrap();

        assert_eq!(meta.methods().len(), 1);
        let member = &meta.methods()[0];
        assert!(member.has_target());
        assert_eq!(member.dispatch(), DispatchRule::Indirect);
        assert_eq!(member.method_on_target().unwrap().name(), "run_explicit");
    }
}
