//! Generators: from collected members to finished runtime classes.
//!
//! The top-level generators (one per proxy shape) drive the shared flow in `base`;
//! below them sit the per-member strategies in [`method`], the invocation carrier
//! generator in [`invocation`] and the delegate-shape generator in [`delegates`].
//!
//! # Key Components
//!
//! - [`class_proxy::ClassProxyGenerator`] / [`class_proxy::ClassProxyWithTargetGenerator`]
//! - [`interface_proxy::InterfaceProxyWithTargetGenerator`]
//! - [`interface_proxy::InterfaceProxyWithTargetInterfaceGenerator`]
//! - [`interface_proxy::InterfaceProxyWithoutTargetGenerator`]
//! - [`method::MethodGenerator`] - Per-member body strategies
//! - [`invocation::InvocationTypeGenerator`] - Cached invocation carrier classes
//! - [`delegates::DelegateTypeGenerator`] - Cached delegate shapes for indirect dispatch

pub(crate) mod base;
pub mod class_proxy;
pub mod delegates;
pub mod interface_proxy;
pub mod invocation;
pub mod method;
