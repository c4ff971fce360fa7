//! The generation pipeline: from a described contract to a cached runtime class.
//!
//! A generation request flows through this module top to bottom: the
//! [`options::ProxyGenerationOptions`] configure it, [`contributors`] claim interfaces
//! and collect members through [`collectors`] into the transient [`meta`] model
//! (consulting the [`hook`]), [`generators`] emit method bodies through the
//! [`emitter`], and the finished class lands in the [`scope::ModuleScope`] cache under
//! a structural key. [`naming`] keeps every generated name unique.

pub mod collectors;
pub mod contributors;
pub mod emitter;
pub mod generators;
pub mod hook;
pub mod meta;
pub mod naming;
pub mod options;
pub mod scope;
