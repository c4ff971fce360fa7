//! # proxyscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the proxyscope library. Import this module to get quick access to the essential
//! types for proxy generation and interception.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all proxyscope operations
pub use crate::Error;

/// The result type used throughout proxyscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for proxy generation
pub use crate::proxygen::ProxyGenerator;

/// Per-request generation configuration
pub use crate::generation::options::ProxyGenerationOptions;

/// Captured generation requests for replay
pub use crate::blueprint::ProxyBlueprint;

// ================================================================================================
// Descriptor Model
// ================================================================================================

/// Process-unique identifiers for descriptors and generated artifacts
pub use crate::model::token::{Token, TokenKind};

/// Method and type attribute flags
pub use crate::model::flags::{MethodAttributes, TypeAttributes};

/// Dynamic values and declared value shapes
pub use crate::model::value::{Value, ValueType};

/// Type and member descriptors with their builders
pub use crate::model::types::{
    MethodBuilder, MethodDesc, MethodDescRc, TypeBuilder, TypeDesc, TypeDescRc, TypeKind,
};

/// Dynamic dispatch for user objects
pub use crate::model::dispatch::{Dispatch, DynObject, ProxyTargetAccessor};

/// The descriptor registry
pub use crate::model::registry::TypeModel;

// ================================================================================================
// Interception
// ================================================================================================

/// Interceptor contract and shared handles
pub use crate::interception::interceptor::{
    Interceptor, InterceptorChain, InterceptorRc, StandardInterceptor,
};

/// Live invocation carried through the interceptor chain
pub use crate::interception::invocation::{Invocation, ProxyInvocation};

/// Per-method interceptor narrowing
pub use crate::interception::selector::{InterceptorSelector, SelectorRc};

// ================================================================================================
// Generation and Runtime
// ================================================================================================

/// Generation hook for filtering and observing member collection
pub use crate::generation::hook::{AllMethodsHook, GenerationHook, HookRc};

/// The scope caching generated classes, and the proxy shapes it distinguishes
pub use crate::generation::scope::{CacheKey, ModuleScope, ProxyKind};

/// Generated classes as immutable dispatch tables
pub use crate::runtime::class::{RuntimeType, RuntimeTypeRc};

/// Live proxy instances and proxy detection
pub use crate::runtime::object::{is_proxy, unwrap_proxy_target, ProxyArguments, ProxyObject};
