//! Dynamic dispatch surface implemented by user objects and generated proxies.
//!
//! proxyscope has no reflection over native Rust types; instead, any object that wants to
//! participate as a proxy target, mixin instance or base-class instance implements
//! [`Dispatch`]: a single dynamic entry point that routes a described method plus a boxed
//! argument array to real behavior. Generated proxies implement the same trait, which is
//! what makes proxies stackable (and detectable, via [`ProxyTargetAccessor`]).
//!
//! # Key Components
//!
//! - [`Dispatch`] - Dynamic invocation entry point, implemented by user types
//! - [`DynObject`] - Shared handle to any dispatchable object
//! - [`ProxyTargetAccessor`] - Marker surface every generated proxy exposes
//!
//! # Examples
//!
//! ```rust,no_run
//! use proxyscope::model::dispatch::{Dispatch, DynObject};
//! use proxyscope::model::token::Token;
//! use proxyscope::model::types::MethodDesc;
//! use proxyscope::model::value::{Value, ValueType};
//! use proxyscope::Result;
//!
//! struct Calculator {
//!     type_token: Token,
//! }
//!
//! impl Dispatch for Calculator {
//!     fn type_token(&self) -> Token {
//!         self.type_token
//!     }
//!
//!     fn invoke(&self, method: &MethodDesc, _generic_args: &[ValueType], args: &mut [Value]) -> Result<Value> {
//!         match method.name() {
//!             "sum" => Ok(Value::Int32(args[0].as_i32()? + args[1].as_i32()?)),
//!             other => Err(proxyscope::Error::Custom(format!("unknown method {other}"))),
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::interception::interceptor::InterceptorRc;
use crate::model::token::Token;
use crate::model::types::MethodDesc;
use crate::model::value::{Value, ValueType};
use crate::Result;

/// Shared handle to any dispatchable object.
pub type DynObject = Arc<dyn Dispatch>;

/// Dynamic invocation entry point implemented by user types and generated proxies.
///
/// Implementations dispatch on the method descriptor (by token or name) and read their
/// arguments out of the boxed array. By-ref parameters are written back into `args`
/// before returning, even on the error path, so callers observe partial output.
///
/// # Thread Safety
///
/// Objects are shared across threads behind [`DynObject`]; implementations must be
/// `Send + Sync` and manage their own interior mutability.
pub trait Dispatch: Send + Sync {
    /// Token of the type descriptor this instance conforms to.
    ///
    /// For generated proxies this is the generated type's token, whose kind tag marks
    /// it as generated.
    fn type_token(&self) -> Token;

    /// Invokes the described method with the given boxed arguments.
    ///
    /// `generic_args` carries the runtime type arguments closing a generic method; it is
    /// empty for non-generic methods.
    ///
    /// # Errors
    ///
    /// Whatever the real implementation raises; errors are propagated unmodified through
    /// the interception machinery.
    fn invoke(
        &self,
        method: &MethodDesc,
        generic_args: &[ValueType],
        args: &mut [Value],
    ) -> Result<Value>;

    /// The proxy marker surface, when this object is a generated proxy.
    ///
    /// Every generated proxy returns `Some`; plain user objects keep the default `None`.
    /// This is how "target is already a generated proxy" is detected without reflection.
    fn proxy_accessor(&self) -> Option<&dyn ProxyTargetAccessor> {
        None
    }
}

/// Marker surface implemented by every generated proxy type.
///
/// Exposes the dynamic pieces of a live proxy: the wrapped target (if any) and the
/// interceptor chain the proxy was constructed with. User code should never implement
/// this trait; its presence on an object is the definition of "is a generated proxy".
pub trait ProxyTargetAccessor {
    /// The current proxy target, if the proxy wraps one.
    fn dyn_proxy_target(&self) -> Option<DynObject>;

    /// The interceptor chain the proxy was constructed with.
    fn dyn_interceptors(&self) -> Vec<InterceptorRc>;
}
