//! Generation hook: per-member proxyability decisions.
//!
//! A [`GenerationHook`] is consulted once per member per generation request, in member
//! collection order: `should_intercept_method` for interceptable members,
//! `non_proxyable_member_notification` for members that cannot be intercepted (with the
//! reason), and `methods_inspected` exactly once after collection completes, before
//! any method generator runs.

use std::sync::Arc;

use crate::model::types::{MethodDesc, TypeDesc};

/// Reference-counted handle to a generation hook.
pub type HookRc = Arc<dyn GenerationHook>;

/// Callback set deciding per-member proxyability during member collection.
///
/// # Call Ordering
///
/// For each member, exactly one of `should_intercept_method` or
/// `non_proxyable_member_notification` fires, in collection order;
/// `methods_inspected` fires exactly once per generation request, after all members
/// were inspected and before any method generator runs.
///
/// # Caching
///
/// A hook's decisions shape the generated type, so hook identity participates in the
/// generation-options digest via [`GenerationHook::fingerprint`]. Two structurally
/// equal hook configurations should report the same fingerprint to share one cached
/// type.
pub trait GenerationHook: Send + Sync {
    /// Decides whether the given interceptable member should be proxied.
    fn should_intercept_method(&self, proxied_type: &TypeDesc, method: &MethodDesc) -> bool;

    /// Notification that a member cannot be intercepted (non-virtual, final, or
    /// infrastructure), with a human-readable reason.
    fn non_proxyable_member_notification(
        &self,
        proxied_type: &TypeDesc,
        method: &MethodDesc,
        reason: &str,
    );

    /// Notification that member inspection for this generation request completed.
    fn methods_inspected(&self);

    /// Identity contribution to the generation-options digest.
    fn fingerprint(&self) -> String {
        "<anonymous hook>".to_string()
    }
}

/// Default hook: intercept every member that can be intercepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllMethodsHook;

impl GenerationHook for AllMethodsHook {
    fn should_intercept_method(&self, _proxied_type: &TypeDesc, _method: &MethodDesc) -> bool {
        true
    }

    fn non_proxyable_member_notification(
        &self,
        _proxied_type: &TypeDesc,
        _method: &MethodDesc,
        _reason: &str,
    ) {
    }

    fn methods_inspected(&self) {}

    fn fingerprint(&self) -> String {
        "proxyscope::AllMethodsHook".to_string()
    }
}
