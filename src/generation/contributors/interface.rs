//! Contributor for interface proxy surfaces, in all three target modes.

use crate::generation::collectors::{
    interface::{InterfaceMembersCollector, InterfaceMembersOnClassCollector},
    MembersCollector,
};
use crate::generation::contributors::{choose_generator, TypeContributor};
use crate::generation::emitter::ClassEmitter;
use crate::generation::generators::invocation::InvocationKind;
use crate::generation::generators::method::TargetSource;
use crate::generation::hook::HookRc;
use crate::generation::meta::MetaType;
use crate::generation::scope::ModuleScope;
use crate::model::registry::TypeModel;
use crate::model::types::TypeDescRc;
use crate::Result;

/// How an interface contributor resolves its target at call time.
#[derive(Clone)]
pub enum InterfaceTargetMode {
    /// Fixed target whose described class resolves explicit implementations
    OnClass(TypeDescRc),
    /// Fixed target implementing the interface under its own member identities
    Backed,
    /// Target slot that may be empty or replaced mid-call
    Replaceable,
    /// No target at all; interceptors supply every member's behavior
    None,
}

/// Surface of one interface on an interface proxy.
///
/// One instance per contributed interface; the top-level generators stack several of
/// these (proxied contract first, then additional interfaces) into one request.
pub struct InterfaceProxyContributor {
    interface: TypeDescRc,
    mode: InterfaceTargetMode,
    meta: MetaType,
}

impl InterfaceProxyContributor {
    /// Creates the contributor for one interface in the given target mode.
    #[must_use]
    pub fn new(interface: TypeDescRc, mode: InterfaceTargetMode) -> Self {
        InterfaceProxyContributor {
            interface,
            mode,
            meta: MetaType::new(),
        }
    }

    fn invocation_kind(&self) -> InvocationKind {
        match self.mode {
            InterfaceTargetMode::Replaceable => InvocationKind::ChangeTarget,
            _ => InvocationKind::Composition,
        }
    }

    fn target_source(&self) -> TargetSource {
        match self.mode {
            InterfaceTargetMode::None => TargetSource::None,
            _ => TargetSource::TargetField,
        }
    }
}

impl TypeContributor for InterfaceProxyContributor {
    fn collect(&mut self, model: &TypeModel, hook: &HookRc) -> Result<()> {
        match &self.mode {
            InterfaceTargetMode::OnClass(target) => {
                InterfaceMembersOnClassCollector::new(self.interface.clone(), target.clone())
                    .collect(model, hook, &mut self.meta)
            }
            InterfaceTargetMode::Backed | InterfaceTargetMode::Replaceable => {
                InterfaceMembersCollector::backed(self.interface.clone())
                    .collect(model, hook, &mut self.meta)
            }
            InterfaceTargetMode::None => InterfaceMembersCollector::new(self.interface.clone())
                .collect(model, hook, &mut self.meta),
        }
    }

    fn generate(&self, scope: &ModuleScope, emitter: &mut ClassEmitter) -> Result<()> {
        let kind = self.invocation_kind();
        let source = self.target_source();
        for member in self.meta.methods() {
            choose_generator(member, kind, &source).generate(
                scope,
                &self.interface,
                member,
                emitter,
            )?;
        }
        Ok(())
    }
}
