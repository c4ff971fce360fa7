//! Contributors for class proxy surfaces.

use crate::generation::collectors::{
    class::{ClassMembersCollector, WrappedClassMembersCollector},
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

/// Surface of a subclass-style class proxy without an explicit target.
///
/// The proxy owns a private base instance built through the class's constructor; to
/// interceptors the invocation target is the proxy itself, which is the defining
/// behavior of inheritance-style carriers.
pub struct ClassProxyContributor {
    class: TypeDescRc,
    meta: MetaType,
}

impl ClassProxyContributor {
    /// Creates the contributor for the proxied class.
    #[must_use]
    pub fn new(class: TypeDescRc) -> Self {
        ClassProxyContributor {
            class,
            meta: MetaType::new(),
        }
    }
}

impl TypeContributor for ClassProxyContributor {
    fn collect(&mut self, model: &TypeModel, hook: &HookRc) -> Result<()> {
        ClassMembersCollector::new(self.class.clone()).collect(model, hook, &mut self.meta)
    }

    fn generate(&self, scope: &ModuleScope, emitter: &mut ClassEmitter) -> Result<()> {
        for member in self.meta.methods() {
            choose_generator(
                member,
                InvocationKind::Inheritance,
                &TargetSource::TargetField,
            )
            .generate(scope, &self.class, member, emitter)?;
        }
        Ok(())
    }
}

/// Surface of a class proxy forwarding to a held instance of the proxied class.
pub struct WrappedClassContributor {
    class: TypeDescRc,
    meta: MetaType,
}

impl WrappedClassContributor {
    /// Creates the contributor for the proxied class.
    #[must_use]
    pub fn new(class: TypeDescRc) -> Self {
        WrappedClassContributor {
            class,
            meta: MetaType::new(),
        }
    }
}

impl TypeContributor for WrappedClassContributor {
    fn collect(&mut self, model: &TypeModel, hook: &HookRc) -> Result<()> {
        WrappedClassMembersCollector::new(self.class.clone()).collect(model, hook, &mut self.meta)
    }

    fn generate(&self, scope: &ModuleScope, emitter: &mut ClassEmitter) -> Result<()> {
        for member in self.meta.methods() {
            choose_generator(
                member,
                InvocationKind::Composition,
                &TargetSource::TargetField,
            )
            .generate(scope, &self.class, member, emitter)?;
        }
        Ok(())
    }
}
