//! The interceptor contract.
//!
//! An interceptor is one link of the ordered chain every intercepted call flows
//! through. Each interceptor receives the live [`Invocation`](crate::interception::invocation::Invocation),
//! may observe and rewrite arguments, short-circuit by setting a return value without
//! delegating, or delegate onward by calling `proceed`, which runs the next
//! interceptor or, at the end of the chain, the real implementation.

use std::sync::Arc;

use crate::interception::invocation::Invocation;
use crate::Result;

/// Reference-counted handle to an interceptor.
pub type InterceptorRc = Arc<dyn Interceptor>;

/// Immutable, shared interceptor chain in call order.
pub type InterceptorChain = Arc<[InterceptorRc]>;

/// One link of the interception chain.
///
/// # Short-Circuiting
///
/// Setting a return value and *not* calling `proceed` is how an interceptor fully
/// handles a call. Calling `proceed` past the end of the chain on a proxy without a
/// target raises the dedicated no-target error instead of silently returning a default.
///
/// # Thread Safety
///
/// Interceptors are shared across proxy instances and threads; implementations must be
/// `Send + Sync` and manage their own interior mutability.
pub trait Interceptor: Send + Sync {
    /// Handles (or delegates) one intercepted call.
    ///
    /// # Errors
    ///
    /// Whatever the interceptor or downstream chain raises; errors propagate unmodified
    /// to the proxy caller.
    fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()>;
}

/// Interceptor that delegates every call onward unchanged.
///
/// Useful as the terminal element of a chain for pure pass-through proxies.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardInterceptor;

impl Interceptor for StandardInterceptor {
    fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
        invocation.proceed()
    }
}
