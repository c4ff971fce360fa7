//! The proxy generation facade.
//!
//! [`ProxyGenerator`] is the crate's front door: it owns the generation scope (the
//! cache of every generated class) and exposes one `create_*` entry point per proxy
//! shape, plus the matching type-only variants. Proxy creation is two steps under the
//! hood: obtain the (cached) runtime class, then instantiate it with the request's
//! target, interceptors, selector and mixins.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use proxyscope::generation::options::ProxyGenerationOptions;
//! use proxyscope::model::registry::TypeModel;
//! use proxyscope::proxygen::ProxyGenerator;
//! # fn example(
//! #     contract: proxyscope::model::types::TypeDescRc,
//! #     target: proxyscope::model::dispatch::DynObject,
//! #     logger: proxyscope::interception::interceptor::InterceptorRc,
//! # ) -> proxyscope::Result<()> {
//! let model = TypeModel::new();
//! let generator = ProxyGenerator::new(model);
//! let proxy = generator.create_interface_proxy_with_target(
//!     &contract,
//!     &[],
//!     target,
//!     &ProxyGenerationOptions::default(),
//!     vec![logger],
//! )?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::blueprint::ProxyBlueprint;
use crate::generation::generators::class_proxy::{
    ClassProxyGenerator, ClassProxyWithTargetGenerator,
};
use crate::generation::generators::interface_proxy::{
    InterfaceProxyWithTargetGenerator, InterfaceProxyWithTargetInterfaceGenerator,
    InterfaceProxyWithoutTargetGenerator,
};
use crate::generation::options::ProxyGenerationOptions;
use crate::generation::scope::{ModuleScope, ProxyKind};
use crate::interception::interceptor::InterceptorRc;
use crate::model::dispatch::DynObject;
use crate::model::registry::TypeModel;
use crate::model::types::{TypeDescRc, TypeKind};
use crate::model::value::Value;
use crate::runtime::class::RuntimeTypeRc;
use crate::runtime::object::{is_proxy, ProxyArguments, ProxyObject};
use crate::{Error, Result};

/// Front door for proxy generation; owns the cache of generated classes.
///
/// One generator instance per type model is the intended usage: all proxies created
/// through it share one scope, which is what makes the identity invariant observable
/// (equal requests yield the same runtime class).
pub struct ProxyGenerator {
    model: Arc<TypeModel>,
    scope: Arc<ModuleScope>,
}

impl ProxyGenerator {
    /// Creates a generator over the given type model with a fresh scope.
    #[must_use]
    pub fn new(model: Arc<TypeModel>) -> Self {
        ProxyGenerator {
            model,
            scope: ModuleScope::new(),
        }
    }

    /// The type model this generator resolves contracts against.
    #[must_use]
    pub fn model(&self) -> &Arc<TypeModel> {
        &self.model
    }

    /// The scope caching every class this generator produced.
    #[must_use]
    pub fn scope(&self) -> &Arc<ModuleScope> {
        &self.scope
    }

    /// Creates a subclass-style proxy of `class`, constructing the base instance with
    /// `ctor_args`.
    ///
    /// # Errors
    ///
    /// - [`Error::GenericTypeDefinition`] when `class` is an open generic definition
    /// - [`Error::MissingConstructor`] / [`Error::InvalidBaseType`] on contract problems
    /// - Generation and base-constructor failures, unmodified
    pub fn create_class_proxy(
        &self,
        class: &TypeDescRc,
        additional: &[TypeDescRc],
        options: &ProxyGenerationOptions,
        interceptors: Vec<InterceptorRc>,
        ctor_args: Vec<Value>,
    ) -> Result<Arc<ProxyObject>> {
        self.require_closed(class)?;
        let runtime = self.create_class_proxy_type(class, additional, options)?;
        self.instantiate(&runtime, options, None, interceptors, ctor_args)
    }

    /// Returns the runtime class a [`ProxyGenerator::create_class_proxy`] call would
    /// instantiate. Open generic definitions are allowed here.
    ///
    /// # Errors
    ///
    /// Same as [`ProxyGenerator::create_class_proxy`], minus instantiation failures.
    pub fn create_class_proxy_type(
        &self,
        class: &TypeDescRc,
        additional: &[TypeDescRc],
        options: &ProxyGenerationOptions,
    ) -> Result<RuntimeTypeRc> {
        ClassProxyGenerator::generate_type(&self.model, &self.scope, options, class, additional)
    }

    /// Creates a class proxy forwarding every member to `target`, a live instance of
    /// `class`.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetAlreadyProxy`] when `target` is itself a generated proxy
    /// - [`Error::GenericTypeDefinition`] when `class` is an open generic definition
    /// - Generation failures, unmodified
    pub fn create_class_proxy_with_target(
        &self,
        class: &TypeDescRc,
        additional: &[TypeDescRc],
        target: DynObject,
        options: &ProxyGenerationOptions,
        interceptors: Vec<InterceptorRc>,
    ) -> Result<Arc<ProxyObject>> {
        self.require_closed(class)?;
        self.reject_proxy_target(&target)?;
        let runtime = self.create_class_proxy_with_target_type(class, additional, options)?;
        self.instantiate(&runtime, options, Some(target), interceptors, Vec::new())
    }

    /// Type-only variant of [`ProxyGenerator::create_class_proxy_with_target`].
    ///
    /// # Errors
    ///
    /// Same as the instance variant, minus target and instantiation failures.
    pub fn create_class_proxy_with_target_type(
        &self,
        class: &TypeDescRc,
        additional: &[TypeDescRc],
        options: &ProxyGenerationOptions,
    ) -> Result<RuntimeTypeRc> {
        ClassProxyWithTargetGenerator::generate_type(
            &self.model,
            &self.scope,
            options,
            class,
            additional,
        )
    }

    /// Creates an interface proxy bound to a fixed `target` implementing `interface`.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetAlreadyProxy`] when `target` is itself a generated proxy
    /// - [`Error::GenericTypeDefinition`] when `interface` is an open generic definition
    /// - Generation failures, unmodified
    pub fn create_interface_proxy_with_target(
        &self,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
        target: DynObject,
        options: &ProxyGenerationOptions,
        interceptors: Vec<InterceptorRc>,
    ) -> Result<Arc<ProxyObject>> {
        self.require_closed(interface)?;
        self.reject_proxy_target(&target)?;
        let target_class = self.described_class_of(&target);
        let runtime = InterfaceProxyWithTargetGenerator::generate_type(
            &self.model,
            &self.scope,
            options,
            interface,
            target_class,
            additional,
        )?;
        self.instantiate(&runtime, options, Some(target), interceptors, Vec::new())
    }

    /// Type-only variant of [`ProxyGenerator::create_interface_proxy_with_target`].
    ///
    /// `target_class` is the described class of the intended target, when known; it
    /// participates in the cache key because its interface map shapes dispatch.
    ///
    /// # Errors
    ///
    /// Same as the instance variant, minus target and instantiation failures.
    pub fn create_interface_proxy_with_target_type(
        &self,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
        target_class: Option<TypeDescRc>,
        options: &ProxyGenerationOptions,
    ) -> Result<RuntimeTypeRc> {
        InterfaceProxyWithTargetGenerator::generate_type(
            &self.model,
            &self.scope,
            options,
            interface,
            target_class,
            additional,
        )
    }

    /// Creates an interface proxy whose target may be absent and may be replaced by
    /// interceptors for the remainder of a call.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetAlreadyProxy`] when an initial `target` is itself a proxy
    /// - [`Error::GenericTypeDefinition`] when `interface` is an open generic definition
    /// - Generation failures, unmodified
    pub fn create_interface_proxy_with_target_interface(
        &self,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
        target: Option<DynObject>,
        options: &ProxyGenerationOptions,
        interceptors: Vec<InterceptorRc>,
    ) -> Result<Arc<ProxyObject>> {
        self.require_closed(interface)?;
        if let Some(target) = &target {
            self.reject_proxy_target(target)?;
        }
        let runtime = self.create_interface_proxy_with_target_interface_type(
            interface, additional, options,
        )?;
        self.instantiate(&runtime, options, target, interceptors, Vec::new())
    }

    /// Type-only variant of
    /// [`ProxyGenerator::create_interface_proxy_with_target_interface`].
    ///
    /// # Errors
    ///
    /// Same as the instance variant, minus target and instantiation failures.
    pub fn create_interface_proxy_with_target_interface_type(
        &self,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
        options: &ProxyGenerationOptions,
    ) -> Result<RuntimeTypeRc> {
        InterfaceProxyWithTargetInterfaceGenerator::generate_type(
            &self.model,
            &self.scope,
            options,
            interface,
            additional,
        )
    }

    /// Creates an interface proxy with no target; the interceptor chain supplies all
    /// behavior, and running past its end fails with the no-target error.
    ///
    /// # Errors
    ///
    /// - [`Error::GenericTypeDefinition`] when `interface` is an open generic definition
    /// - Generation failures, unmodified
    pub fn create_interface_proxy_without_target(
        &self,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
        options: &ProxyGenerationOptions,
        interceptors: Vec<InterceptorRc>,
    ) -> Result<Arc<ProxyObject>> {
        self.require_closed(interface)?;
        let runtime =
            self.create_interface_proxy_without_target_type(interface, additional, options)?;
        self.instantiate(&runtime, options, None, interceptors, Vec::new())
    }

    /// Type-only variant of [`ProxyGenerator::create_interface_proxy_without_target`].
    ///
    /// # Errors
    ///
    /// Same as the instance variant, minus instantiation failures.
    pub fn create_interface_proxy_without_target_type(
        &self,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
        options: &ProxyGenerationOptions,
    ) -> Result<RuntimeTypeRc> {
        InterfaceProxyWithoutTargetGenerator::generate_type(
            &self.model,
            &self.scope,
            options,
            interface,
            additional,
        )
    }

    /// Reconstructs the runtime class a captured request produced.
    ///
    /// Replaying a [`ProxyBlueprint`] through the generator that served the original
    /// request lands on the identical cached class; through a fresh generator it
    /// regenerates an equivalent one under the same cache key.
    ///
    /// # Errors
    ///
    /// [`Error::TypeNotFound`] when a captured token no longer resolves, plus the
    /// generation failures of the matching `create_*_type` entry point.
    pub fn replay(&self, blueprint: &ProxyBlueprint) -> Result<RuntimeTypeRc> {
        let primary = self.model.resolve(blueprint.primary())?;
        let additional = blueprint
            .additional()
            .iter()
            .map(|token| self.model.resolve(*token))
            .collect::<Result<Vec<_>>>()?;
        let options = blueprint.options();
        match blueprint.kind() {
            ProxyKind::Class => self.create_class_proxy_type(&primary, &additional, options),
            ProxyKind::ClassWithTarget => {
                self.create_class_proxy_with_target_type(&primary, &additional, options)
            }
            ProxyKind::InterfaceWithTarget => {
                let target_class = blueprint
                    .target_class()
                    .map(|token| self.model.resolve(token))
                    .transpose()?;
                self.create_interface_proxy_with_target_type(
                    &primary,
                    &additional,
                    target_class,
                    options,
                )
            }
            ProxyKind::InterfaceWithTargetInterface => {
                self.create_interface_proxy_with_target_interface_type(
                    &primary,
                    &additional,
                    options,
                )
            }
            ProxyKind::InterfaceWithoutTarget => {
                self.create_interface_proxy_without_target_type(&primary, &additional, options)
            }
        }
    }

    fn instantiate(
        &self,
        runtime: &RuntimeTypeRc,
        options: &ProxyGenerationOptions,
        target: Option<DynObject>,
        interceptors: Vec<InterceptorRc>,
        base_args: Vec<Value>,
    ) -> Result<Arc<ProxyObject>> {
        options.initialize(&self.model)?;
        let mixins: Vec<DynObject> = options.mixin_data().instances().cloned().collect();
        ProxyObject::instantiate(
            runtime,
            ProxyArguments {
                target,
                interceptors: Arc::from(interceptors),
                selector: options.selector().cloned(),
                mixins,
                base_args,
            },
        )
    }

    fn require_closed(&self, contract: &TypeDescRc) -> Result<()> {
        if contract.is_open_generic() {
            return Err(Error::GenericTypeDefinition {
                type_name: contract.full_name(),
            });
        }
        Ok(())
    }

    fn reject_proxy_target(&self, target: &DynObject) -> Result<()> {
        if is_proxy(target) {
            let type_name = self
                .model
                .get(&target.type_token())
                .map_or_else(|| target.type_token().to_string(), |d| d.full_name());
            return Err(Error::TargetAlreadyProxy { type_name });
        }
        Ok(())
    }

    fn described_class_of(&self, target: &DynObject) -> Option<TypeDescRc> {
        self.model
            .get(&target.type_token())
            .filter(|desc| desc.kind() == TypeKind::Class)
    }
}
