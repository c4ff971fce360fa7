//! Per-method interceptor filtering.
//!
//! A selector narrows the proxy's interceptor chain for a specific method before the
//! first call to that method; the filtered set is memoized per method on the proxy
//! instance, so a selector runs at most once per (proxy, method) pair.

use std::sync::Arc;

use crate::interception::interceptor::InterceptorRc;
use crate::model::types::{MethodDesc, TypeDesc};

/// Reference-counted handle to an interceptor selector.
pub type SelectorRc = Arc<dyn InterceptorSelector>;

/// Strategy filtering the interceptor set for a specific method.
///
/// # Caching
///
/// Selection results are memoized per method on each proxy instance; a selector must be
/// deterministic for a given (type, method) pair. Selectors participate in the
/// generation-options digest through [`InterceptorSelector::fingerprint`], so two
/// structurally equal option sets with the same selector identity share one generated
/// type.
pub trait InterceptorSelector: Send + Sync {
    /// Returns the interceptors to run for `method`, in call order.
    ///
    /// `interceptors` is the proxy's full chain; returning it unchanged is always valid.
    fn select_interceptors(
        &self,
        proxied_type: &TypeDesc,
        method: &MethodDesc,
        interceptors: &[InterceptorRc],
    ) -> Vec<InterceptorRc>;

    /// Identity contribution to the generation-options digest.
    ///
    /// The default is anonymous, meaning two different anonymous selectors are treated
    /// as the same for type-caching purposes; override this when selector identity
    /// should force distinct generated types.
    fn fingerprint(&self) -> String {
        "<anonymous selector>".to_string()
    }
}
