// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # proxyscope
//!
//! A runtime proxy-generation engine for Rust. `proxyscope` builds intercepting
//! proxy classes over described types at runtime: every call on a proxy flows
//! through an ordered chain of interceptors before (optionally) reaching a wrapped
//! target, letting callers layer logging, caching, validation, or mocking over any
//! contract without touching its implementation.
//!
//! ## Features
//!
//! - **Five proxy shapes** - Subclass-style class proxies (with or without a separate
//!   target) and interface proxies with a fixed, replaceable, or absent target
//! - **Interceptor pipeline** - Ordered chains with `proceed` semantics, per-method
//!   narrowing through selectors, and mid-call target replacement
//! - **Cached generation** - Structurally equal requests share one generated class;
//!   invocation carriers are reused across proxy instances
//! - **Generic contracts** - Open generic definitions generated once and closed per
//!   argument list, sharing the definition's method bodies
//! - **Mixins** - Additional interfaces answered by dedicated instances, with the
//!   proxied target always winning claimed interfaces
//! - **Thread safe** - Lock-free caches on the hot path, generation serialized once
//!
//! ## Quick Start
//!
//! Add `proxyscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! proxyscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust,no_run
//! use proxyscope::prelude::*;
//! # fn example(
//! #     interface: proxyscope::model::types::TypeDescRc,
//! #     target: proxyscope::model::dispatch::DynObject,
//! #     logger: InterceptorRc,
//! # ) -> proxyscope::Result<()> {
//!
//! let model = TypeModel::new();
//! let generator = ProxyGenerator::new(model);
//! let proxy = generator.create_interface_proxy_with_target(
//!     &interface,
//!     &[],
//!     target,
//!     &ProxyGenerationOptions::default(),
//!     vec![logger],
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Describing a Contract
//!
//! Proxies are generated over descriptors registered in a [`TypeModel`]. A contract
//! is described once with the fluent builders and resolved by token thereafter:
//!
//! ```rust,no_run
//! use proxyscope::model::registry::TypeModel;
//! use proxyscope::model::types::{MethodDesc, TypeDesc};
//! use proxyscope::model::value::ValueType;
//!
//! let model = TypeModel::new();
//! let calculator = TypeDesc::interface("demo", "Calculator")
//!     .method(
//!         MethodDesc::build("sum")
//!             .param("a", ValueType::Int32)
//!             .param("b", ValueType::Int32)
//!             .returns(ValueType::Int32),
//!     )
//!     .build(&model)?;
//! # Ok::<(), proxyscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `proxyscope` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`model`] - Descriptors, tokens, dynamic values and the type registry
//! - [`interception`] - Interceptors, live invocations and selectors
//! - [`generation`] - The pipeline turning a described contract into a cached class
//! - [`runtime`] - Generated classes as dispatch tables and their live instances
//! - [`blueprint`] - Captured generation requests and their cache-key mapping
//! - [`proxygen`] - The [`ProxyGenerator`] facade
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Generation Pipeline
//!
//! A request flows through [`generation`] in fixed order: contributors claim the
//! interfaces the proxy will answer (target first, then mixins, then additional
//! interfaces), collectors walk the claimed contracts into a transient member model
//! while the generation hook filters and observes, and method generators emit one
//! compiled body per member. The finished class lands in the scope cache under a
//! structural key; equal requests then share it without regenerating.
//!
//! ### Interception Model
//!
//! Each intercepted call materializes one [`interception::invocation::ProxyInvocation`]
//! carrying the argument snapshot, the narrowed interceptor chain, and a cursor.
//! `proceed` advances the cursor to the next interceptor and finally to the target
//! (when the shape has one); an interceptor may instead short-circuit by storing a
//! return value. The cursor is restored around each delegation, so one interceptor
//! calling `proceed` twice replays the tail of the chain rather than skipping it.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with comprehensive error
//! information:
//!
//! ```rust,no_run
//! use proxyscope::Error;
//! # fn example(outcome: proxyscope::Result<()>) {
//!
//! match outcome {
//!     Ok(()) => println!("call completed"),
//!     Err(Error::NoTarget { method }) => println!("nothing handled {method}"),
//!     Err(Error::ArgumentType { index, expected, actual }) => {
//!         println!("argument {index}: expected {expected}, got {actual}");
//!     }
//!     Err(e) => println!("other error: {e}"),
//! }
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! Generators, scopes and generated classes are shareable across threads. Cache hits
//! never block; a miss serializes generation of top-level proxy classes so equal
//! concurrent requests still converge on one class. Proxy instances are `Send + Sync`
//! and may be invoked concurrently; the replaceable-target shape guards its target
//! slot with a read-write lock.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the proxyscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust,no_run
/// use proxyscope::prelude::*;
///
/// let model = TypeModel::new();
/// let generator = ProxyGenerator::new(model);
/// ```
pub mod prelude;

/// Descriptor model: tokens, flags, values, type/member descriptors and the registry.
///
/// Everything generation knows about user contracts is described here rather than
/// reflected from the language: a [`model::types::TypeDesc`] carries a contract's
/// members, attributes and interface relationships, a [`model::registry::TypeModel`]
/// resolves descriptors by [`model::token::Token`], and user objects participate in
/// dynamic dispatch through the [`model::dispatch::Dispatch`] trait.
pub mod model;

/// Interception contracts: interceptors, live invocations and selectors.
///
/// The caller-facing half of the machinery. An [`interception::interceptor::Interceptor`]
/// observes and steers one call through the [`interception::invocation::Invocation`]
/// it is handed; an [`interception::selector::InterceptorSelector`] narrows the
/// instance-wide chain per method.
pub mod interception;

/// The generation pipeline from described contract to cached runtime class.
///
/// Hosts the [`generation::options::ProxyGenerationOptions`], the generation hook,
/// interface contributors and member collectors, the per-member method generators,
/// the class emitter, and the [`generation::scope::ModuleScope`] cache with its
/// structural [`generation::scope::CacheKey`].
pub mod generation;

/// Runtime representation of generated classes and their instances.
///
/// A [`runtime::class::RuntimeType`] is an immutable dispatch table of compiled
/// method bodies; a [`runtime::object::ProxyObject`] is one instance of such a
/// class, carrying the target, interceptor chain, selector and mixin field slots
/// those bodies read.
pub mod runtime;

/// Captured generation requests.
///
/// A [`blueprint::ProxyBlueprint`] records the parameters determining which class a
/// request produces and maps them to the same cache key generation uses, so a
/// request can be replayed onto the identical cached class.
pub mod blueprint;

/// The proxy generation facade.
///
/// [`ProxyGenerator`] owns the generation scope and exposes one `create_*` entry
/// point per proxy shape, plus type-only variants and blueprint replay.
pub mod proxygen;

/// `proxyscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `proxyscope` Error type
///
/// The main error type for all operations in this crate. Covers contract validation,
/// generation failures, invocation-time argument checking, and the terminal no-target
/// condition.
pub use error::Error;

/// Main entry point for generating proxies.
///
/// See [`proxygen::ProxyGenerator`] for the five `create_*` entry points and their
/// type-only variants.
pub use proxygen::ProxyGenerator;

/// The descriptor registry proxies are generated against.
///
/// See [`model::registry::TypeModel`] for registration and resolution.
pub use model::registry::TypeModel;
