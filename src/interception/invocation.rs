//! The live invocation object passed through the interceptor chain.
//!
//! Every intercepted call materializes one [`ProxyInvocation`]: the per-call instance
//! of a cached invocation carrier class
//! ([`InvocationClass`](crate::generation::generators::invocation::InvocationClass)).
//! The carrier class is generated once per (declaring type, method) pair; the
//! invocation instance holds the call's boxed arguments, runtime generic arguments,
//! the interceptor chain and the `proceed` cursor.
//!
//! # Proceed Semantics
//!
//! `proceed` advances through the chain by index. At the end of the chain it invokes
//! the real implementation through the carrier's callback; a carrier without a callback
//! (interface proxy without target) raises the dedicated no-target error there. The
//! cursor is restored after each interceptor returns, so an interceptor may call
//! `proceed` more than once and observe consistent positions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use proxyscope::interception::interceptor::Interceptor;
//! use proxyscope::interception::invocation::Invocation;
//! use proxyscope::model::value::Value;
//! use proxyscope::Result;
//!
//! struct Doubler;
//!
//! impl Interceptor for Doubler {
//!     fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
//!         invocation.proceed()?;
//!         let doubled = invocation.return_value().as_i32()? * 2;
//!         invocation.set_return_value(Value::Int32(doubled));
//!         Ok(())
//!     }
//! }
//! ```

use crate::generation::generators::invocation::{InvocationClassRc, InvocationKind};
use crate::model::dispatch::DynObject;
use crate::model::types::MethodDescRc;
use crate::model::value::{Value, ValueType};
use crate::interception::interceptor::InterceptorChain;
use crate::{Error, Result};

/// The invocation surface interceptors receive.
///
/// Exposes the pieces of one intercepted call: the boxed argument array (readable and
/// writable by position), the runtime generic arguments of the called method, the
/// method and its on-target counterpart, proxy and target references, the return-value
/// slot and the `proceed` operation.
pub trait Invocation {
    /// The boxed argument array, mutable by position.
    fn arguments(&mut self) -> &mut [Value];

    /// Number of arguments (equal to the method's parameter count).
    fn argument_count(&self) -> usize;

    /// Reads one argument by position.
    fn get_argument(&self, index: usize) -> Option<&Value>;

    /// Replaces one argument by position.
    ///
    /// # Errors
    ///
    /// [`Error::ArgumentCount`] when the index is out of range.
    fn set_argument(&mut self, index: usize, value: Value) -> Result<()>;

    /// Runtime type arguments closing the called generic method; empty otherwise.
    fn generic_arguments(&self) -> &[ValueType];

    /// Sets the runtime type arguments for a generic method call.
    fn set_generic_arguments(&mut self, arguments: Vec<ValueType>);

    /// The method as declared on the proxied contract.
    fn method(&self) -> &MethodDescRc;

    /// The most-derived counterpart of [`Invocation::method`] on the target, when the
    /// proxy forwards to one.
    fn method_invocation_target(&self) -> Option<&MethodDescRc>;

    /// The owning proxy instance.
    fn proxy(&self) -> &DynObject;

    /// The object the real implementation runs on.
    ///
    /// For inheritance-style class proxies this is the proxy itself; for composition
    /// proxies it is the wrapped target, `None` when the proxy has no target.
    fn invocation_target(&self) -> Option<DynObject>;

    /// The return-value slot; [`Value::Unit`] until set.
    fn return_value(&self) -> &Value;

    /// Sets the return value. Combined with not calling `proceed`, this is how an
    /// interceptor short-circuits the call.
    fn set_return_value(&mut self, value: Value);

    /// Runs the next interceptor, or the real implementation at the end of the chain.
    ///
    /// # Errors
    ///
    /// - [`Error::NoTarget`] at the end of the chain on a proxy without a target
    /// - [`Error::InvalidProxyTarget`] when a required target slot is empty
    /// - Any error the real implementation or a downstream interceptor raises
    fn proceed(&mut self) -> Result<()>;

    /// Replaces the invocation target for the remainder of this call only.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupportedMember`]-style violation when the carrier does not support
    /// target replacement (only change-target carriers do).
    fn change_invocation_target(&mut self, new_target: DynObject) -> Result<()>;
}

/// Per-call instance of a cached invocation carrier class.
///
/// Constructed by generated method bodies with exactly (target-or-self, proxy-self,
/// interceptor chain, carrier class, boxed arguments); generic method bodies
/// additionally set the runtime type arguments before the first `proceed`.
pub struct ProxyInvocation {
    class: InvocationClassRc,
    proxy: DynObject,
    target: Option<DynObject>,
    interceptors: InterceptorChain,
    arguments: Vec<Value>,
    generic_arguments: Vec<ValueType>,
    type_arguments: Vec<ValueType>,
    return_value: Value,
    index: usize,
}

impl ProxyInvocation {
    /// Creates the invocation for one intercepted call.
    #[must_use]
    pub fn new(
        class: InvocationClassRc,
        proxy: DynObject,
        target: Option<DynObject>,
        interceptors: InterceptorChain,
        arguments: Vec<Value>,
    ) -> Self {
        ProxyInvocation {
            class,
            proxy,
            target,
            interceptors,
            arguments,
            generic_arguments: Vec::new(),
            type_arguments: Vec::new(),
            return_value: Value::Unit,
            index: 0,
        }
    }

    /// Sets the generic arguments of the proxied type this call runs against.
    ///
    /// Populated by generated method bodies of closed generic proxy types so carriers
    /// can resolve type-level generic positions at call time.
    pub fn set_type_arguments(&mut self, arguments: Vec<ValueType>) {
        self.type_arguments = arguments;
    }

    /// Generic arguments of the proxied type; empty for non-generic proxies.
    #[must_use]
    pub fn type_arguments(&self) -> &[ValueType] {
        &self.type_arguments
    }

    /// Dispatches the described method to `target` with this invocation's arguments.
    ///
    /// Borrows the generic arguments once so the argument array can be handed to the
    /// target mutably.
    pub(crate) fn dispatch_to(
        &mut self,
        target: &DynObject,
        method: &MethodDescRc,
    ) -> Result<Value> {
        let generic_arguments = self.generic_arguments.clone();
        target.invoke(method, &generic_arguments, &mut self.arguments)
    }

    /// Routes the call through a delegate shape on `target` with this invocation's
    /// arguments.
    pub(crate) fn dispatch_through(
        &mut self,
        delegate: &crate::generation::generators::delegates::DelegateClassRc,
        target: &DynObject,
    ) -> Result<Value> {
        let generic_arguments = self.generic_arguments.clone();
        delegate.invoke(target, &generic_arguments, &mut self.arguments)
    }

    /// The carrier class this invocation is an instance of.
    #[must_use]
    pub fn class(&self) -> &InvocationClassRc {
        &self.class
    }

    /// The raw target slot, regardless of carrier kind.
    #[must_use]
    pub(crate) fn raw_target(&self) -> Option<&DynObject> {
        self.target.as_ref()
    }

    /// Consumes the invocation, yielding the final return value.
    #[must_use]
    pub fn take_return_value(self) -> Value {
        self.return_value
    }

    /// Read access to the argument array without requiring `&mut self`.
    #[must_use]
    pub fn arguments_ref(&self) -> &[Value] {
        &self.arguments
    }
}

impl Invocation for ProxyInvocation {
    fn arguments(&mut self) -> &mut [Value] {
        &mut self.arguments
    }

    fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    fn get_argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    fn set_argument(&mut self, index: usize, value: Value) -> Result<()> {
        let count = self.arguments.len();
        let slot = self.arguments.get_mut(index).ok_or(Error::ArgumentCount {
            expected: count,
            actual: index + 1,
        })?;
        *slot = value;
        Ok(())
    }

    fn generic_arguments(&self) -> &[ValueType] {
        &self.generic_arguments
    }

    fn set_generic_arguments(&mut self, arguments: Vec<ValueType>) {
        self.generic_arguments = arguments;
    }

    fn method(&self) -> &MethodDescRc {
        self.class.method()
    }

    fn method_invocation_target(&self) -> Option<&MethodDescRc> {
        self.class.method_on_target()
    }

    fn proxy(&self) -> &DynObject {
        &self.proxy
    }

    fn invocation_target(&self) -> Option<DynObject> {
        match self.class.kind() {
            InvocationKind::Inheritance => Some(self.proxy.clone()),
            InvocationKind::Composition | InvocationKind::ChangeTarget => self.target.clone(),
        }
    }

    fn return_value(&self) -> &Value {
        &self.return_value
    }

    fn set_return_value(&mut self, value: Value) {
        self.return_value = value;
    }

    fn proceed(&mut self) -> Result<()> {
        if self.index == self.interceptors.len() {
            let class = self.class.clone();
            return class.invoke_method_on_target(self);
        }

        let interceptor = self.interceptors[self.index].clone();
        self.index += 1;
        let result = interceptor.intercept(self);
        self.index -= 1;
        result
    }

    fn change_invocation_target(&mut self, new_target: DynObject) -> Result<()> {
        if self.class.kind() != InvocationKind::ChangeTarget {
            return Err(violation_error!(
                "invocation carrier for '{}' does not support changing the target",
                self.class.method().name()
            ));
        }
        self.target = Some(new_target);
        Ok(())
    }
}

impl ProxyInvocation {
    /// Stores the return value from inside carrier callbacks.
    pub(crate) fn store_return(&mut self, value: Value) {
        self.return_value = value;
    }
}
