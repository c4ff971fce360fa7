//! Type contributors: each owns part of a generated proxy's surface.
//!
//! A generation request assembles an ordered contributor list; each contributor claims
//! the interfaces it is responsible for, collects their members through the member
//! collectors, then emits the corresponding bodies. Interface claims follow a strict
//! precedence: the proxied contract first, then mixins, then additional interfaces.
//! A later contributor asking for an already-claimed interface either skips it (a
//! mixin duplicating the proxied contract loses to the target) or fails the request
//! (two mixins bringing the same interface is a configuration error reported before
//! anything is generated).
//!
//! # Key Components
//!
//! - [`TypeContributor`] - The contributor contract: collect, then generate
//! - [`InterfaceClaims`] - Precedence bookkeeping shared across one request's contributors
//! - [`class::ClassProxyContributor`] / [`class::WrappedClassContributor`] - Class surfaces
//! - [`interface::InterfaceProxyContributor`] - Interface surfaces in all three target modes
//! - [`mixin::MixinContributor`] - Surfaces delegated to mixin instances

pub mod class;
pub mod interface;
pub mod mixin;

use std::collections::HashSet;

use crate::generation::emitter::ClassEmitter;
use crate::generation::hook::HookRc;
use crate::generation::meta::MetaMethod;
use crate::generation::scope::ModuleScope;
use crate::model::registry::TypeModel;
use crate::model::token::Token;
use crate::Result;

use crate::generation::generators::invocation::InvocationKind;
use crate::generation::generators::method::{MethodGenerator, TargetSource};

/// One contributor to a generated proxy's surface.
///
/// `collect` runs for every contributor before any `generate` call, so the hook's
/// `methods_inspected` notification can fire between the two phases.
pub trait TypeContributor {
    /// Collects this contributor's members, consulting the hook per member.
    ///
    /// # Errors
    ///
    /// Descriptor resolution failures against `model`.
    fn collect(&mut self, model: &TypeModel, hook: &HookRc) -> Result<()>;

    /// Emits bodies for every collected member.
    ///
    /// # Errors
    ///
    /// Carrier generation failures and duplicate-member violations.
    fn generate(&self, scope: &ModuleScope, emitter: &mut ClassEmitter) -> Result<()>;
}

/// Tracks which interfaces are already claimed by an earlier contributor.
#[derive(Debug, Default)]
pub struct InterfaceClaims {
    claimed: HashSet<Token>,
}

impl InterfaceClaims {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        InterfaceClaims::default()
    }

    /// Claims an interface, returning `false` when it was already taken.
    pub fn claim(&mut self, interface: Token) -> bool {
        self.claimed.insert(interface)
    }

    /// `true` when the interface is already claimed.
    #[must_use]
    pub fn is_claimed(&self, interface: &Token) -> bool {
        self.claimed.contains(interface)
    }
}

/// Picks the body strategy for one collected member.
///
/// Proxyable members get the full pipeline; members the hook declined fall back to a
/// pass-through when a target backs them, and to the default-value body otherwise.
pub(crate) fn choose_generator(
    member: &MetaMethod,
    kind: InvocationKind,
    source: &TargetSource,
) -> MethodGenerator {
    if member.proxyable() {
        MethodGenerator::WithInvocation(kind, source.clone())
    } else if member.has_target() {
        MethodGenerator::Forwarding(source.clone())
    } else {
        MethodGenerator::Minimalistic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::token::TokenKind;

    #[test]
    fn test_claims_are_first_come() {
        let mut claims = InterfaceClaims::new();
        let iface = Token::alloc(TokenKind::TypeDesc);
        assert!(claims.claim(iface));
        assert!(!claims.claim(iface));
        assert!(claims.is_claimed(&iface));
    }
}
