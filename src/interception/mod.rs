//! Interception contracts: interceptors, invocations and selectors.
//!
//! This module carries the caller-facing half of the interception machinery. The
//! execution contract is deliberately small: an ordered chain of [`interceptor::Interceptor`]s,
//! each handed the live [`invocation::Invocation`], each free to rewrite arguments,
//! short-circuit with a return value, or delegate onward with `proceed`. The
//! [`selector::InterceptorSelector`] narrows the chain per method, memoized per proxy
//! instance.

pub mod interceptor;
pub mod invocation;
pub mod selector;
