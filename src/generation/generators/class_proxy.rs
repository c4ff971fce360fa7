//! Top-level generators for class proxy shapes.

use std::sync::Arc;

use crate::generation::generators::base::{obtain_proxy_type, ProxyShape};
use crate::generation::options::ProxyGenerationOptions;
use crate::generation::scope::ModuleScope;
use crate::model::registry::TypeModel;
use crate::model::types::TypeDescRc;
use crate::runtime::class::RuntimeTypeRc;
use crate::Result;

/// Generates subclass-style proxies of a described class.
///
/// The generated class owns a private base instance built through the class's
/// constructor; interceptors observe the proxy itself as the invocation target.
pub struct ClassProxyGenerator;

impl ClassProxyGenerator {
    /// Returns the proxy type for `class` plus `additional` interfaces, generating
    /// and caching it on first use.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidBaseType`] when `class` is not a class contract
    /// - [`crate::Error::MissingConstructor`] when `class` carries no constructor
    /// - Contributor and emitter failures, unmodified
    pub fn generate_type(
        model: &Arc<TypeModel>,
        scope: &Arc<ModuleScope>,
        options: &ProxyGenerationOptions,
        class: &TypeDescRc,
        additional: &[TypeDescRc],
    ) -> Result<RuntimeTypeRc> {
        obtain_proxy_type(model, scope, options, &ProxyShape::Class, class, additional)
    }
}

/// Generates class proxies forwarding every member to a held instance of the class.
pub struct ClassProxyWithTargetGenerator;

impl ClassProxyWithTargetGenerator {
    /// Returns the proxy type for `class` plus `additional` interfaces, generating
    /// and caching it on first use.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidBaseType`] when `class` is not a class contract, and
    /// contributor or emitter failures.
    pub fn generate_type(
        model: &Arc<TypeModel>,
        scope: &Arc<ModuleScope>,
        options: &ProxyGenerationOptions,
        class: &TypeDescRc,
        additional: &[TypeDescRc],
    ) -> Result<RuntimeTypeRc> {
        obtain_proxy_type(
            model,
            scope,
            options,
            &ProxyShape::ClassWithTarget,
            class,
            additional,
        )
    }
}
