//! Contributor for surfaces delegated to mixin instances.

use crate::generation::collectors::{interface::InterfaceMembersCollector, MembersCollector};
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

/// Name of the instance field holding the mixin at the given construction position.
#[must_use]
pub fn mixin_field_name(position: usize) -> String {
    format!("__mixin_{position}")
}

/// Surface of one interface delegated to a mixin instance.
///
/// Mixin members run the full interception pipeline with the mixin instance as the
/// composition target, so interceptors see mixin calls exactly like target calls.
pub struct MixinContributor {
    interface: TypeDescRc,
    position: usize,
    meta: MetaType,
}

impl MixinContributor {
    /// Creates the contributor for the interface stored at construction position
    /// `position`.
    #[must_use]
    pub fn new(interface: TypeDescRc, position: usize) -> Self {
        MixinContributor {
            interface,
            position,
            meta: MetaType::new(),
        }
    }
}

impl TypeContributor for MixinContributor {
    fn collect(&mut self, model: &TypeModel, hook: &HookRc) -> Result<()> {
        InterfaceMembersCollector::backed(self.interface.clone())
            .collect(model, hook, &mut self.meta)
    }

    fn generate(&self, scope: &ModuleScope, emitter: &mut ClassEmitter) -> Result<()> {
        let field = mixin_field_name(self.position);
        emitter.define_field(&field, crate::runtime::class::FieldKind::Mixin(self.position))?;

        let source = TargetSource::Mixin(field);
        for member in self.meta.methods() {
            choose_generator(member, InvocationKind::Composition, &source).generate(
                scope,
                &self.interface,
                member,
                emitter,
            )?;
        }
        Ok(())
    }
}
