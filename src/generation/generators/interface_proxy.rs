//! Top-level generators for interface proxy shapes.

use std::sync::Arc;

use crate::generation::generators::base::{obtain_proxy_type, ProxyShape};
use crate::generation::options::ProxyGenerationOptions;
use crate::generation::scope::ModuleScope;
use crate::model::registry::TypeModel;
use crate::model::types::TypeDescRc;
use crate::runtime::class::RuntimeTypeRc;
use crate::Result;

/// Generates interface proxies bound to a fixed target.
///
/// When the target's described class is known, its interface map resolves explicit
/// and non-public implementations; otherwise the target is assumed to answer the
/// interface's members under their own identities.
pub struct InterfaceProxyWithTargetGenerator;

impl InterfaceProxyWithTargetGenerator {
    /// Returns the proxy type for `interface` plus `additional` interfaces,
    /// generating and caching it on first use.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidBaseType`] when `interface` is not an interface
    /// contract, and contributor or emitter failures.
    pub fn generate_type(
        model: &Arc<TypeModel>,
        scope: &Arc<ModuleScope>,
        options: &ProxyGenerationOptions,
        interface: &TypeDescRc,
        target_class: Option<TypeDescRc>,
        additional: &[TypeDescRc],
    ) -> Result<RuntimeTypeRc> {
        obtain_proxy_type(
            model,
            scope,
            options,
            &ProxyShape::InterfaceWithTarget(target_class),
            interface,
            additional,
        )
    }
}

/// Generates interface proxies whose target may be absent or replaced mid-call.
///
/// Members use change-target carriers, so an interceptor may swap the target for the
/// remainder of the current call; running past the end of the chain with an empty
/// target slot fails.
pub struct InterfaceProxyWithTargetInterfaceGenerator;

impl InterfaceProxyWithTargetInterfaceGenerator {
    /// Returns the proxy type for `interface` plus `additional` interfaces,
    /// generating and caching it on first use.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidBaseType`] when `interface` is not an interface
    /// contract, and contributor or emitter failures.
    pub fn generate_type(
        model: &Arc<TypeModel>,
        scope: &Arc<ModuleScope>,
        options: &ProxyGenerationOptions,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
    ) -> Result<RuntimeTypeRc> {
        obtain_proxy_type(
            model,
            scope,
            options,
            &ProxyShape::InterfaceWithTargetInterface,
            interface,
            additional,
        )
    }
}

/// Generates interface proxies with no target: interceptors supply all behavior.
pub struct InterfaceProxyWithoutTargetGenerator;

impl InterfaceProxyWithoutTargetGenerator {
    /// Returns the proxy type for `interface` plus `additional` interfaces,
    /// generating and caching it on first use.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidBaseType`] when `interface` is not an interface
    /// contract, and contributor or emitter failures.
    pub fn generate_type(
        model: &Arc<TypeModel>,
        scope: &Arc<ModuleScope>,
        options: &ProxyGenerationOptions,
        interface: &TypeDescRc,
        additional: &[TypeDescRc],
    ) -> Result<RuntimeTypeRc> {
        obtain_proxy_type(
            model,
            scope,
            options,
            &ProxyShape::InterfaceWithoutTarget,
            interface,
            additional,
        )
    }
}
