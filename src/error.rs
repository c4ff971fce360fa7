use thiserror::Error;

use crate::model::token::Token;

macro_rules! violation_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Violation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Violation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur during proxy-type generation
/// and intercepted invocation. Variants fall into four distinct categories, and which category
/// an error belongs to tells the caller how to react:
///
/// # Error Categories
///
/// ## Configuration Errors (eager, caller bugs in the generation request)
/// - [`Error::GenericTypeDefinition`] - Open generic passed where a closed type was required
/// - [`Error::OpenGenericExpected`] - Closed type passed where an open generic was required
/// - [`Error::PartialGenericArguments`] - Generic argument list neither fully closed nor empty
/// - [`Error::TargetAlreadyProxy`] - Attempt to proxy an already-generated proxy
/// - [`Error::DuplicateMixin`] - Two mixins contribute the same interface
/// - [`Error::MissingConstructor`] - Class proxy requested for a type with no constructor
/// - [`Error::InvalidBaseType`] - Interface-proxy base type override is not a usable class
///
/// These are detected synchronously at generation-request time, generation is aborted and
/// nothing is registered in the cache.
///
/// ## Generation Invariant Violations (internal bugs, not recoverable)
/// - [`Error::Violation`] - Duplicate interface claim, cache identity violation, duplicate
///   member definition. Treat as an assertion failure.
///
/// ## Runtime Invocation Errors (deferred to the first actual call)
/// - [`Error::NoTarget`] - `proceed` ran past the end of the chain with no target to invoke
/// - [`Error::InvalidProxyTarget`] - A target was required but the target slot is empty
/// - [`Error::NotSupportedMember`] - Member cannot be proxied and has no forwarding path
/// - [`Error::MethodNotFound`] - No member with the given token/name on the proxy type
/// - [`Error::ArgumentCount`] / [`Error::ArgumentType`] - Argument array shape mismatch
/// - [`Error::GenericArgumentCount`] - Runtime generic arguments do not close the method
///
/// ## User-Code Errors
/// - [`Error::Custom`] - Free-form failures raised by targets or interceptors; propagated
///   unmodified through `proceed`
///
/// # Examples
///
/// ```rust,no_run
/// use proxyscope::{Error, prelude::*};
/// # fn example(generator: &ProxyGenerator, iface: &proxyscope::model::types::TypeDescRc) {
/// let options = ProxyGenerationOptions::default();
/// match generator.create_interface_proxy_without_target(iface, &[], &options, vec![]) {
///     Ok(proxy) => println!("Generated {}", proxy.class().name()),
///     Err(Error::GenericTypeDefinition { type_name }) => {
///         eprintln!("{type_name} must be closed before proxying");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    /// An open generic type definition was passed where a closed type was required.
    ///
    /// Additional interfaces and mixin interfaces must always be closed; only the primary
    /// type of a generation request may be an open generic definition.
    #[error("Open generic type definition '{type_name}' is not allowed here; close it first")]
    GenericTypeDefinition {
        /// Full name of the offending type
        type_name: String,
    },

    /// A closed type was passed where an open generic definition was required.
    ///
    /// Instantiating generic arguments is only meaningful against the open definition.
    #[error("Type '{type_name}' is not an open generic definition")]
    OpenGenericExpected {
        /// Full name of the offending type
        type_name: String,
    },

    /// A generic argument list was neither empty nor a full closed set.
    ///
    /// Generation accepts either the defining open generic (no arguments) or a complete
    /// list of closed type arguments. Partially-specified generics are rejected.
    #[error("Generic arguments for '{type_name}' must be a full closed set ({expected} expected, {actual} given)")]
    PartialGenericArguments {
        /// Full name of the open generic definition
        type_name: String,
        /// Number of generic parameters the definition declares
        expected: usize,
        /// Number of arguments supplied
        actual: usize,
    },

    /// The proxy target is itself a generated proxy.
    ///
    /// Every generated type carries the proxy-target-accessor marker; passing such an
    /// instance (or descriptor) as the target of a new generation request is rejected
    /// eagerly rather than producing a proxy-of-a-proxy by accident.
    #[error("Target '{type_name}' is a generated proxy and cannot be proxied again")]
    TargetAlreadyProxy {
        /// Name of the offending proxy type
        type_name: String,
    },

    /// Two mixins declare the same interface.
    ///
    /// Mixin interfaces must be disjoint; which instance would answer for the shared
    /// interface would otherwise depend on registration order.
    #[error("Mixin interface {0} is contributed by more than one mixin instance")]
    DuplicateMixin(Token),

    /// A class proxy was requested for a descriptor that has no constructor function.
    ///
    /// Class proxies (with or without target) construct or wrap an instance of the base
    /// class, which requires the descriptor to carry a constructor.
    #[error("Type '{type_name}' has no constructor and cannot back a class proxy")]
    MissingConstructor {
        /// Full name of the class descriptor
        type_name: String,
    },

    /// The base-type override supplied in the generation options is not usable.
    ///
    /// Interface proxies may override the runtime base type, but the override must be a
    /// class descriptor (not an interface or delegate shape).
    #[error("Base type override '{type_name}' is not a class")]
    InvalidBaseType {
        /// Full name of the offending descriptor
        type_name: String,
    },

    // Generation-time invariant violations
    /// An internal generation invariant was broken.
    ///
    /// Raised for duplicate interface claims across contributors, attempts to register a
    /// cache key that already maps to a different runtime type, or duplicate member
    /// definitions on a type under construction. This always indicates a bug in the
    /// generation pipeline, not bad caller input; it is not recoverable.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Invariant violation - {file}:{line}: {message}")]
    Violation {
        /// The message to be printed for the Violation error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    // Runtime invocation errors
    /// `proceed` was called at the end of the interceptor chain with no target to invoke.
    ///
    /// This is a deliberate terminal failure: it means an interceptor that was expected to
    /// fully handle the call delegated onward instead. It is distinct from ordinary errors
    /// thrown by a real implementation so miswired chains can be diagnosed.
    #[error("Invocation of '{method}' reached the end of the interceptor chain with no target to invoke")]
    NoTarget {
        /// Name of the method whose chain ran out
        method: String,
    },

    /// The invocation requires a target but the target slot holds none.
    ///
    /// Composition and change-target invocations validate the target before invoking the
    /// real implementation; an empty slot at that point is a chain-composition bug.
    #[error("Invocation of '{method}' requires a target, but the proxy has no valid target")]
    InvalidProxyTarget {
        /// Name of the method being invoked
        method: String,
    },

    /// The member exists on the proxied contract but proxying it is not supported.
    ///
    /// Generated for members that can neither be intercepted nor forwarded; calling the
    /// emitted stub raises this error.
    #[error("Proxying member '{member}' is not supported")]
    NotSupportedMember {
        /// Name of the unsupported member
        member: String,
    },

    /// No member with the given identity exists on the runtime type.
    #[error("Method {0} was not found on the generated type")]
    MethodNotFound(Token),

    /// The argument array does not match the method's parameter count.
    #[error("Argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCount {
        /// Number of parameters the method declares
        expected: usize,
        /// Number of arguments supplied
        actual: usize,
    },

    /// An argument cannot be converted to the parameter's exact type.
    #[error("Argument {index} has kind {actual}, expected {expected}")]
    ArgumentType {
        /// Zero-based position of the offending argument
        index: usize,
        /// Expected type of the parameter
        expected: String,
        /// Kind of the value actually supplied
        actual: String,
    },

    /// The runtime generic arguments do not close the generic method.
    ///
    /// Generic methods are closed with the type arguments carried on the invocation, not
    /// the ones baked in at generation time; the count must match the method's arity.
    #[error("Generic argument count mismatch: method arity is {expected}, {actual} runtime arguments set")]
    GenericArgumentCount {
        /// Generic arity of the method
        expected: usize,
        /// Number of runtime type arguments on the invocation
        actual: usize,
    },

    /// Failed to find a descriptor in the `TypeModel`.
    #[error("Failed to find type in TypeModel - {0}")]
    TypeNotFound(Token),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically when trying to
    /// acquire a mutex or rwlock that is in an invalid state.
    #[error("Failed to lock target")]
    LockError,

    // User-code errors
    /// Free-form error raised by user code (a target implementation or an interceptor).
    ///
    /// Propagated unmodified through `proceed` so interceptors and callers observe
    /// exactly what the real implementation raised.
    #[error("{0}")]
    Custom(String),
}
