//! Descriptor model: the crate's reflection surface.
//!
//! Everything proxy generation knows about user contracts lives here: tokens, attribute
//! flags, dynamic values, type/member descriptors, the dynamic dispatch trait user
//! objects implement, and the process-wide registry resolving it all.
//!
//! # Key Components
//!
//! - [`token`] - Process-unique identifiers for descriptors and generated artifacts
//! - [`flags`] - Method/type attribute flags deciding interceptability and accessibility
//! - [`value`] - Boxed dynamic values and declared value shapes
//! - [`types`] - Type and member descriptors with their fluent builders
//! - [`dispatch`] - The [`dispatch::Dispatch`] trait user objects implement
//! - [`registry`] - The [`registry::TypeModel`] descriptor registry

pub mod dispatch;
pub mod flags;
pub mod registry;
pub mod token;
pub mod types;
pub mod value;
