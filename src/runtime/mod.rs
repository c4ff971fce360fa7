//! Runtime representation of generated proxy classes and their instances.
//!
//! Generated classes are not source code: a [`class::RuntimeType`] is an immutable
//! dispatch table pairing method descriptors with compiled method bodies, plus the
//! field layout its instances carry. An [`object::ProxyObject`] is one instance of
//! such a class, holding the field slots (target, interceptor chain, selector, mixin
//! references, per-method interceptor memos) the bodies read at call time.

pub mod class;
pub mod object;
