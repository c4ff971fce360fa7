//! Invocation carrier classes and their generator, the central state machine.
//!
//! For every intercepted member, interceptors receive an instance of a dedicated
//! carrier class holding the call's arguments, generic type arguments, the interceptor
//! chain and the "invoke the real implementation" callback. Carrier classes are
//! generated once per (declaring type, method, carrier kind) triple and
//! cached in the [`ModuleScope`](crate::generation::scope::ModuleScope) under the same
//! identity invariant as top-level proxy types: requesting the carrier for an
//! already-seen signature returns the same runtime class.
//!
//! # Carrier Kinds
//!
//! - [`InvocationKind::Inheritance`] - class proxy without explicit target; the real
//!   implementation is the proxy's own base, and the invocation target surfaces as the
//!   proxy itself
//! - [`InvocationKind::Composition`] - a separate held target, validated non-null
//!   before the real implementation runs
//! - [`InvocationKind::ChangeTarget`] - target mutable mid-chain; an interceptor may
//!   swap it for the remainder of the current call, and it is re-validated on each
//!   access
//!
//! # Invoke-Real-Implementation Contract
//!
//! The carrier's invoke operation is built once per carrier class, not per call. It
//! checks the argument array against the exact parameter shapes (closing type-level
//! and method-level generic positions with the runtime arguments carried on the
//! invocation, not the ones seen at generation time), invokes the callback, checks and
//! stores the return value. A carrier without a callback (interface proxy without
//! target) fails with the dedicated no-target error: a deliberate terminal failure
//! signaling a miswired interceptor chain, never a silent no-op.

use std::fmt;
use std::sync::Arc;

use strum::Display;

use crate::generation::generators::delegates::DelegateClassRc;
use crate::generation::meta::{DispatchRule, MetaMethod};
use crate::generation::naming::NamingScope;
use crate::generation::scope::{CacheKey, ModuleScope};
use crate::interception::invocation::{Invocation, ProxyInvocation};
use crate::model::token::{Token, TokenKind};
use crate::model::types::{MethodDescRc, TypeDescRc};
use crate::model::value::{Value, ValueType};
use crate::{Error, Result};

/// Reference-counted handle to a generated carrier class.
pub type InvocationClassRc = Arc<InvocationClass>;

/// Callback invoking the real implementation for one carrier class.
pub type InvocationCallback =
    Arc<dyn Fn(&mut ProxyInvocation) -> Result<Value> + Send + Sync>;

/// Target-resolution strategy baked into a carrier class.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    /// Target is the proxy object itself (class proxy without explicit target)
    Inheritance,
    /// Target is a separate held object, validated before invoking
    Composition,
    /// Target is mutable mid-call-chain and validated on each access
    ChangeTarget,
}

/// A generated invocation carrier class.
///
/// Structurally reusable across *any* proxy instance sharing the (declaring type,
/// method) pair: two different targets proxied through the same interface produce
/// invocations of the identical carrier class.
pub struct InvocationClass {
    token: Token,
    name: String,
    declaring_type: Token,
    method: MethodDescRc,
    method_on_target: Option<MethodDescRc>,
    kind: InvocationKind,
    unbox_plan: Vec<ValueType>,
    return_plan: ValueType,
    callback: Option<InvocationCallback>,
}

impl InvocationClass {
    /// Token identifying this carrier class.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Synthesized name of the carrier class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token of the type declaring the proxied method.
    #[must_use]
    pub fn declaring_type(&self) -> Token {
        self.declaring_type
    }

    /// The method as declared on the proxied contract.
    #[must_use]
    pub fn method(&self) -> &MethodDescRc {
        &self.method
    }

    /// The most-derived counterpart on the target, when one exists.
    #[must_use]
    pub fn method_on_target(&self) -> Option<&MethodDescRc> {
        self.method_on_target.as_ref()
    }

    /// Target-resolution strategy.
    #[must_use]
    pub fn kind(&self) -> InvocationKind {
        self.kind
    }

    /// Invokes the real implementation for an invocation that ran past the end of its
    /// interceptor chain.
    ///
    /// # Errors
    ///
    /// - [`Error::NoTarget`] when no callback exists (interface proxy without target)
    /// - [`Error::InvalidProxyTarget`] when a required target slot is empty
    /// - [`Error::ArgumentCount`] / [`Error::ArgumentType`] /
    ///   [`Error::GenericArgumentCount`] on argument-array shape mismatches
    /// - Any error the real implementation raises, unmodified
    pub fn invoke_method_on_target(&self, invocation: &mut ProxyInvocation) -> Result<()> {
        let params = self.method.params();
        if invocation.argument_count() != params.len() {
            return Err(Error::ArgumentCount {
                expected: params.len(),
                actual: invocation.argument_count(),
            });
        }
        if self.method.generic_arity() > 0
            && invocation.generic_arguments().len() != self.method.generic_arity()
        {
            return Err(Error::GenericArgumentCount {
                expected: self.method.generic_arity(),
                actual: invocation.generic_arguments().len(),
            });
        }

        self.check_arguments(invocation)?;

        let callback = self.callback.clone().ok_or_else(|| Error::NoTarget {
            method: self.method.name().to_string(),
        })?;

        match self.kind {
            InvocationKind::Inheritance => {}
            InvocationKind::Composition | InvocationKind::ChangeTarget => {
                if invocation.raw_target().is_none() {
                    return Err(Error::InvalidProxyTarget {
                        method: self.method.name().to_string(),
                    });
                }
            }
        }

        let result = callback(invocation)?;
        self.check_return(invocation, &result)?;
        invocation.store_return(result);
        Ok(())
    }

    /// Unboxes/validates each argument against its exact parameter shape, closing
    /// generic positions with the invocation's runtime arguments.
    fn check_arguments(&self, invocation: &ProxyInvocation) -> Result<()> {
        for (index, plan) in self.unbox_plan.iter().enumerate() {
            let resolved =
                plan.resolve(invocation.type_arguments(), invocation.generic_arguments())?;
            let argument = invocation
                .get_argument(index)
                .ok_or(Error::ArgumentCount {
                    expected: self.unbox_plan.len(),
                    actual: index,
                })?;
            if !resolved.matches(argument) {
                return Err(Error::ArgumentType {
                    index,
                    expected: resolved.display_name(),
                    actual: argument.kind_name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_return(&self, invocation: &ProxyInvocation, value: &Value) -> Result<()> {
        let resolved = self
            .return_plan
            .resolve(invocation.type_arguments(), invocation.generic_arguments())?;
        if resolved == ValueType::Unit || resolved.matches(value) {
            return Ok(());
        }
        Err(Error::ArgumentType {
            index: 0,
            expected: resolved.display_name(),
            actual: value.kind_name().to_string(),
        })
    }
}

impl fmt::Debug for InvocationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationClass")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("method", &self.method.name())
            .finish_non_exhaustive()
    }
}

/// Generator of invocation carrier classes, cache-checked per (declaring type, method,
/// kind) exactly like top-level proxies.
pub struct InvocationTypeGenerator {
    kind: InvocationKind,
}

impl InvocationTypeGenerator {
    /// Creates a generator for the given carrier kind.
    #[must_use]
    pub fn new(kind: InvocationKind) -> Self {
        InvocationTypeGenerator { kind }
    }

    /// Returns the carrier class for the member, generating and caching it on first
    /// request.
    ///
    /// # Errors
    ///
    /// Propagates carrier-construction failures; cache hits never fail.
    pub fn get_invocation_class(
        &self,
        scope: &ModuleScope,
        declaring: &TypeDescRc,
        meta: &MetaMethod,
        naming: &Arc<NamingScope>,
        delegate: Option<DelegateClassRc>,
    ) -> Result<InvocationClassRc> {
        let key = CacheKey::invocation(self.kind, declaring.token(), meta.method().token());
        scope.obtain_invocation(key, || self.generate(declaring, meta, naming, delegate))
    }

    fn generate(
        &self,
        declaring: &TypeDescRc,
        meta: &MetaMethod,
        naming: &Arc<NamingScope>,
        delegate: Option<DelegateClassRc>,
    ) -> Result<InvocationClassRc> {
        let method = meta.method().clone();
        let suggested = format!(
            "proxyscope.invocations.{}_{}",
            declaring.name(),
            method.name()
        );
        let name = naming.get_unique_name(&suggested);

        let unbox_plan: Vec<ValueType> = method.params().iter().map(|p| p.ty.clone()).collect();
        let return_plan = method.return_type().clone();

        let callback = build_callback(meta, delegate);

        Ok(Arc::new(InvocationClass {
            token: Token::alloc(TokenKind::InvocationClass),
            name,
            declaring_type: declaring.token(),
            method,
            method_on_target: meta.method_on_target().cloned(),
            kind: self.kind,
            unbox_plan,
            return_plan,
            callback,
        }))
    }
}

/// Builds the "invoke the real implementation" callback for a carrier class.
///
/// Members without a live target get no callback; invoking them is the terminal
/// no-target failure. Indirect members route through their generated delegate shape,
/// everything else dispatches the meta entry's method-on-target (or the declared
/// method itself for inheritance carriers) on the target directly.
fn build_callback(
    meta: &MetaMethod,
    delegate: Option<DelegateClassRc>,
) -> Option<InvocationCallback> {
    if !meta.has_target() || meta.dispatch() == DispatchRule::Skip {
        return None;
    }
    let method = meta
        .method_on_target()
        .cloned()
        .unwrap_or_else(|| meta.method().clone());

    Some(Arc::new(move |invocation: &mut ProxyInvocation| {
        let target = invocation
            .raw_target()
            .cloned()
            .ok_or(Error::InvalidProxyTarget {
                method: method.name().to_string(),
            })?;
        match &delegate {
            Some(shape) => invocation.dispatch_through(shape, &target),
            None => invocation.dispatch_to(&target, &method),
        }
    }))
}
