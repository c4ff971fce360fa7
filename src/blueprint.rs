//! Serializable-in-spirit capture of a proxy-generation request.
//!
//! A [`ProxyBlueprint`] records everything that determines which runtime class a
//! request produces: the proxy kind, the primary contract token, the target class
//! token when dispatch depends on one, the additional interface tokens, and the
//! option set. Replaying a blueprint through the same [`crate::proxygen::ProxyGenerator`]
//! lands on the identical cached class; the mapping to a [`CacheKey`] is pure and
//! matches generation exactly.

use crate::generation::options::ProxyGenerationOptions;
use crate::generation::scope::{CacheKey, ProxyKind};
use crate::model::token::Token;

/// Value object capturing one proxy-generation request.
pub struct ProxyBlueprint {
    kind: ProxyKind,
    primary: Token,
    target_class: Option<Token>,
    additional: Vec<Token>,
    options: ProxyGenerationOptions,
}

impl ProxyBlueprint {
    /// Captures a request.
    ///
    /// `target_class` matters only for [`ProxyKind::InterfaceWithTarget`], where the
    /// target's described class shapes dispatch; pass `None` for every other kind.
    #[must_use]
    pub fn new(
        kind: ProxyKind,
        primary: Token,
        target_class: Option<Token>,
        additional: Vec<Token>,
        options: ProxyGenerationOptions,
    ) -> Self {
        let target_class = match kind {
            ProxyKind::InterfaceWithTarget => target_class,
            _ => None,
        };
        ProxyBlueprint {
            kind,
            primary,
            target_class,
            additional,
            options,
        }
    }

    /// The proxy kind this blueprint reproduces.
    #[must_use]
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    /// Token of the primary contract (the proxied class or interface).
    #[must_use]
    pub fn primary(&self) -> Token {
        self.primary
    }

    /// Token of the target's described class, when the kind depends on one.
    #[must_use]
    pub fn target_class(&self) -> Option<Token> {
        self.target_class
    }

    /// Tokens of the additional interfaces.
    #[must_use]
    pub fn additional(&self) -> &[Token] {
        &self.additional
    }

    /// The captured option set.
    #[must_use]
    pub fn options(&self) -> &ProxyGenerationOptions {
        &self.options
    }

    /// The cache key this request resolves to.
    ///
    /// Pure function of the blueprint; two blueprints with equal keys always yield
    /// the same runtime class from a given generator.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::proxy(
            self.kind,
            self.primary,
            self.target_class,
            &self.additional,
            self.options.digest(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::token::TokenKind;

    #[test]
    fn test_equal_requests_share_a_key() {
        let primary = Token::alloc(TokenKind::TypeDesc);
        let extra = Token::alloc(TokenKind::TypeDesc);
        let a = ProxyBlueprint::new(
            ProxyKind::InterfaceWithoutTarget,
            primary,
            None,
            vec![extra],
            ProxyGenerationOptions::default(),
        );
        let b = ProxyBlueprint::new(
            ProxyKind::InterfaceWithoutTarget,
            primary,
            None,
            vec![extra],
            ProxyGenerationOptions::default(),
        );
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_kind_distinguishes_keys() {
        let primary = Token::alloc(TokenKind::TypeDesc);
        let with = ProxyBlueprint::new(
            ProxyKind::InterfaceWithTargetInterface,
            primary,
            None,
            Vec::new(),
            ProxyGenerationOptions::default(),
        );
        let without = ProxyBlueprint::new(
            ProxyKind::InterfaceWithoutTarget,
            primary,
            None,
            Vec::new(),
            ProxyGenerationOptions::default(),
        );
        assert_ne!(with.cache_key(), without.cache_key());
    }

    #[test]
    fn test_target_class_ignored_outside_interface_with_target() {
        let primary = Token::alloc(TokenKind::TypeDesc);
        let stray = Token::alloc(TokenKind::TypeDesc);
        let blueprint = ProxyBlueprint::new(
            ProxyKind::Class,
            primary,
            Some(stray),
            Vec::new(),
            ProxyGenerationOptions::default(),
        );
        assert_eq!(blueprint.target_class(), None);
    }
}
