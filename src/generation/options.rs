//! Generation options: mixins, hook, selector, base override, attributes.
//!
//! A [`ProxyGenerationOptions`] value configures one generation request. It is a
//! mutable builder consumed once: [`ProxyGenerationOptions::initialize`] idempotently
//! freezes the derived state (the [`MixinData`]), after which the options contribute a
//! semantic digest to the cache key. Two structurally equal option sets digest
//! identically and therefore resolve to the same generated runtime type, independent of
//! call order or target instances.
//!
//! # Key Components
//!
//! - [`ProxyGenerationOptions`] - The per-request configuration surface
//! - [`MixinData`] - Frozen, deterministically ordered mixin registrations
//!
//! # Examples
//!
//! ```rust,no_run
//! use proxyscope::generation::options::ProxyGenerationOptions;
//! # fn example(mixin: proxyscope::model::dispatch::DynObject) {
//! let mut options = ProxyGenerationOptions::default();
//! options.add_mixin_instance(mixin);
//! # }
//! ```

use std::sync::OnceLock;

use sha1::{Digest, Sha1};

use crate::generation::hook::{AllMethodsHook, HookRc};
use crate::interception::selector::SelectorRc;
use crate::model::dispatch::DynObject;
use crate::model::registry::TypeModel;
use crate::model::token::Token;
use crate::{Error, Result};
use std::sync::Arc;

/// Frozen mixin registrations: one entry per mixin interface, deterministically
/// ordered by interface token.
///
/// Built once by [`ProxyGenerationOptions::initialize`]. Interface sets of distinct
/// mixin instances must be disjoint; a shared interface is a configuration error
/// because which instance would answer for it would depend on registration order.
#[derive(Clone, Default)]
pub struct MixinData {
    entries: Vec<(Token, DynObject)>,
}

impl MixinData {
    /// Builds mixin data from registered instances, resolving each instance's
    /// interface set against the model.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeNotFound`] when a mixin's type descriptor is not registered
    /// - [`Error::DuplicateMixin`] when two mixins contribute the same interface
    pub fn build(model: &TypeModel, mixins: &[DynObject]) -> Result<MixinData> {
        let mut entries: Vec<(Token, DynObject)> = Vec::new();
        for mixin in mixins {
            let desc = model.resolve(mixin.type_token())?;
            let mut interfaces = model.class_interfaces(&desc.token())?;
            // a mixin that *is* an interface instance contributes itself
            if interfaces.is_empty() && model.is_interface(&desc.token()) {
                interfaces.push(desc.token());
            }
            for interface in interfaces {
                if entries.iter().any(|(t, _)| *t == interface) {
                    return Err(Error::DuplicateMixin(interface));
                }
                entries.push((interface, mixin.clone()));
            }
        }
        entries.sort_by_key(|(token, _)| token.value());
        Ok(MixinData { entries })
    }

    /// Mixin interfaces in digest order.
    #[must_use]
    pub fn mixin_interfaces(&self) -> impl Iterator<Item = Token> + '_ {
        self.entries.iter().map(|(token, _)| *token)
    }

    /// Mixin instances positionally aligned with [`MixinData::mixin_interfaces`].
    #[must_use]
    pub fn instances(&self) -> impl Iterator<Item = &DynObject> + '_ {
        self.entries.iter().map(|(_, instance)| instance)
    }

    /// The instance answering for the given mixin interface.
    #[must_use]
    pub fn mixin_for(&self, interface: &Token) -> Option<&DynObject> {
        self.entries
            .iter()
            .find(|(token, _)| token == interface)
            .map(|(_, instance)| instance)
    }

    /// Returns true when the interface is contributed by a registered mixin.
    #[must_use]
    pub fn contains_mixin(&self, interface: &Token) -> bool {
        self.entries.iter().any(|(token, _)| token == interface)
    }

    /// Number of mixin interfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no mixin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration for one proxy-generation request.
///
/// Mutable until consumed; `initialize` freezes derived state and later mutation of
/// mixins has no effect on an already-initialized value. Equality of two option sets,
/// for caching purposes, is defined by [`ProxyGenerationOptions::digest`].
pub struct ProxyGenerationOptions {
    hook: HookRc,
    selector: Option<SelectorRc>,
    mixins: Vec<DynObject>,
    base_type_override: Option<Token>,
    additional_attributes: Vec<String>,
    mixin_data: OnceLock<MixinData>,
}

impl Default for ProxyGenerationOptions {
    fn default() -> Self {
        ProxyGenerationOptions {
            hook: Arc::new(AllMethodsHook),
            selector: None,
            mixins: Vec::new(),
            base_type_override: None,
            additional_attributes: Vec::new(),
            mixin_data: OnceLock::new(),
        }
    }
}

impl ProxyGenerationOptions {
    /// The per-member proxyability hook (defaults to [`AllMethodsHook`]).
    #[must_use]
    pub fn hook(&self) -> &HookRc {
        &self.hook
    }

    /// Replaces the hook.
    pub fn set_hook(&mut self, hook: HookRc) {
        self.hook = hook;
    }

    /// The per-method interceptor selector, when configured.
    #[must_use]
    pub fn selector(&self) -> Option<&SelectorRc> {
        self.selector.as_ref()
    }

    /// Configures an interceptor selector.
    pub fn set_selector(&mut self, selector: SelectorRc) {
        self.selector = Some(selector);
    }

    /// Registers a mixin instance; the proxy will also implement every interface the
    /// mixin's type implements, forwarding to the instance.
    pub fn add_mixin_instance(&mut self, mixin: DynObject) {
        self.mixins.push(mixin);
    }

    /// Returns true when any mixin is registered.
    #[must_use]
    pub fn has_mixins(&self) -> bool {
        !self.mixins.is_empty()
    }

    /// The base type override for interface proxies, when configured.
    #[must_use]
    pub fn base_type_override(&self) -> Option<Token> {
        self.base_type_override
    }

    /// Overrides the runtime base type interface proxies extend.
    pub fn set_base_type_override(&mut self, base: Token) {
        self.base_type_override = Some(base);
    }

    /// Attributes copied onto the generated type.
    #[must_use]
    pub fn additional_attributes(&self) -> &[String] {
        &self.additional_attributes
    }

    /// Adds an attribute to copy onto the generated type.
    pub fn add_attribute(&mut self, attribute: &str) {
        self.additional_attributes.push(attribute.to_string());
    }

    /// Idempotently freezes derived state (the mixin data).
    ///
    /// Called by every generator before the cache key is computed; calling it again is
    /// a no-op, including after the options were used for a generation.
    ///
    /// # Errors
    ///
    /// Mixin resolution failures; see [`MixinData::build`].
    pub fn initialize(&self, model: &TypeModel) -> Result<()> {
        if self.mixin_data.get().is_some() {
            return Ok(());
        }
        let data = MixinData::build(model, &self.mixins)?;
        // a concurrent initialize may have won; both built from the same inputs
        let _ = self.mixin_data.set(data);
        Ok(())
    }

    /// The frozen mixin data; empty until `initialize` ran.
    #[must_use]
    pub fn mixin_data(&self) -> MixinData {
        self.mixin_data.get().cloned().unwrap_or_default()
    }

    /// Semantic digest of this option set, folded into cache keys.
    ///
    /// Covers hook identity, selector presence and identity, the ordered mixin
    /// interface set, the base type override and additional attributes. Non-semantic
    /// state (the concrete mixin instances) deliberately does not participate: two
    /// requests differing only in mixin instances share one generated type.
    #[must_use]
    pub fn digest(&self) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(self.hook.fingerprint().as_bytes());
        hasher.update([0xFF]);
        match &self.selector {
            Some(selector) => {
                hasher.update([0x01]);
                hasher.update(selector.fingerprint().as_bytes());
            }
            None => hasher.update([0x00]),
        }
        hasher.update([0xFF]);
        for interface in self.mixin_data().mixin_interfaces() {
            hasher.update(interface.value().to_le_bytes());
        }
        hasher.update([0xFF]);
        hasher.update(
            self.base_type_override
                .map_or(0u32, |t| t.value())
                .to_le_bytes(),
        );
        for attribute in &self.additional_attributes {
            hasher.update([0xFF]);
            hasher.update(attribute.as_bytes());
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_digest_stable() {
        let a = ProxyGenerationOptions::default();
        let b = ProxyGenerationOptions::default();
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_attribute_changes_digest() {
        let a = ProxyGenerationOptions::default();
        let mut b = ProxyGenerationOptions::default();
        b.add_attribute("generated");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_base_override_changes_digest() {
        let a = ProxyGenerationOptions::default();
        let mut b = ProxyGenerationOptions::default();
        b.set_base_type_override(crate::model::token::Token::new(0x0100_0042));
        assert_ne!(a.digest(), b.digest());
    }
}
