//! Delegate shapes for members that cannot be dispatched directly.
//!
//! Some members are visible on the proxied contract but cannot be handed to the
//! target's own dispatch under their declared identity, such as an explicit interface
//! implementation the class maps to a differently named private method. For those the
//! engine generates a delegate shape once per (declaring type, method) pair: a small
//! generated class binding the member's parameter shape to an invoker that routes the
//! call through the mapped member. Carriers for indirect members call through the
//! delegate shape instead of the contract method.

use std::fmt;
use std::sync::Arc;

use crate::generation::naming::NamingScope;
use crate::generation::scope::{CacheKey, ModuleScope};
use crate::model::dispatch::DynObject;
use crate::model::token::{Token, TokenKind};
use crate::model::types::{MethodDescRc, TypeDescRc};
use crate::model::value::{Value, ValueType};
use crate::Result;

/// Reference-counted handle to a generated delegate shape.
pub type DelegateClassRc = Arc<DelegateClass>;

/// Invoker bound into a delegate shape.
pub type DelegateInvoker =
    Arc<dyn Fn(&DynObject, &[ValueType], &mut [Value]) -> Result<Value> + Send + Sync>;

/// A generated delegate shape routing one member to its mapped target member.
pub struct DelegateClass {
    token: Token,
    name: String,
    declaring_type: Token,
    method: MethodDescRc,
    invoker: DelegateInvoker,
}

impl DelegateClass {
    /// Token identifying this delegate shape.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Synthesized name of the shape.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token of the type declaring the routed member.
    #[must_use]
    pub fn declaring_type(&self) -> Token {
        self.declaring_type
    }

    /// The member as declared on the proxied contract.
    #[must_use]
    pub fn method(&self) -> &MethodDescRc {
        &self.method
    }

    /// Routes one call through the mapped member on `target`.
    ///
    /// # Errors
    ///
    /// Whatever the target's dispatch raises, unmodified.
    pub fn invoke(
        &self,
        target: &DynObject,
        generic_args: &[ValueType],
        args: &mut [Value],
    ) -> Result<Value> {
        (self.invoker)(target, generic_args, args)
    }
}

impl fmt::Debug for DelegateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateClass")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("method", &self.method.name())
            .finish_non_exhaustive()
    }
}

/// Generator of delegate shapes, cached per (declaring type, method).
pub struct DelegateTypeGenerator;

impl DelegateTypeGenerator {
    /// Returns the delegate shape routing `method` through its mapped counterpart,
    /// generating and caching it on first request.
    ///
    /// # Errors
    ///
    /// Propagates generation failures; cache hits never fail.
    pub fn get_delegate_class(
        scope: &ModuleScope,
        declaring: &TypeDescRc,
        method: &MethodDescRc,
        mapped: &MethodDescRc,
        naming: &Arc<NamingScope>,
    ) -> Result<DelegateClassRc> {
        let key = CacheKey::delegate(declaring.token(), method.token());
        let mapped = mapped.clone();
        scope.obtain_delegate(key, || {
            let suggested = format!(
                "proxyscope.delegates.{}_{}",
                declaring.name(),
                method.name()
            );
            let name = naming.get_unique_name(&suggested);
            let routed = mapped.clone();
            let invoker: DelegateInvoker =
                Arc::new(move |target, generic_args, args| {
                    target.invoke(&routed, generic_args, args)
                });
            Ok(Arc::new(DelegateClass {
                token: Token::alloc(TokenKind::DelegateClass),
                name,
                declaring_type: declaring.token(),
                method: method.clone(),
                invoker,
            }))
        })
    }
}
