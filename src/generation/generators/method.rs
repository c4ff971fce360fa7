//! Per-member body generation strategies.
//!
//! Contributors pick one strategy per collected member and hand it to the emitter:
//!
//! - [`MethodGenerator::WithInvocation`] - the full interception pipeline: obtain the
//!   cached carrier class, build the invocation, run the chain, copy by-ref arguments
//!   back to the caller even when the chain fails
//! - [`MethodGenerator::Forwarding`] - straight pass-through to the target with no
//!   interception, used for members the hook declined on target-backed proxies
//! - [`MethodGenerator::Minimalistic`] - a body returning the return type's default
//!   value, used for declined members with nothing to forward to
//! - [`MethodGenerator::Skip`] - no body at all; another contributor owns the member

use std::sync::Arc;

use crate::generation::emitter::ClassEmitter;
use crate::generation::generators::delegates::{DelegateClassRc, DelegateTypeGenerator};
use crate::generation::generators::invocation::{InvocationKind, InvocationTypeGenerator};
use crate::generation::meta::{DispatchRule, MetaMethod};
use crate::generation::scope::ModuleScope;
use crate::interception::invocation::{Invocation, ProxyInvocation};
use crate::model::types::{MethodDescRc, TypeDescRc};
use crate::model::value::{Value, ValueType};
use crate::runtime::class::{FieldKind, MethodBody};
use crate::runtime::object::ProxyObject;
use crate::{Error, Result};

/// Where a generated body finds the object to run the real implementation on.
#[derive(Debug, Clone)]
pub enum TargetSource {
    /// No target; interceptors supply all behavior
    None,
    /// The proxy's target slot
    TargetField,
    /// A named mixin field
    Mixin(String),
}

impl TargetSource {
    fn resolve(&self, proxy: &ProxyObject) -> Result<Option<crate::model::dispatch::DynObject>> {
        match self {
            TargetSource::None => Ok(None),
            TargetSource::TargetField => proxy.target(),
            TargetSource::Mixin(field) => Ok(proxy.mixin(field)),
        }
    }
}

/// Body generation strategy for one collected member.
pub enum MethodGenerator {
    /// Emit nothing; the member belongs to another contributor
    Skip,
    /// Uninstrumented pass-through to the target
    Forwarding(TargetSource),
    /// Default-value body for members with neither interception nor target
    Minimalistic,
    /// Full interception pipeline through a cached carrier class
    WithInvocation(InvocationKind, TargetSource),
}

impl MethodGenerator {
    /// Emits the member's body (and its selector memo field, when applicable) onto the
    /// emitter.
    ///
    /// # Errors
    ///
    /// Carrier or delegate generation failures, and duplicate-member violations from
    /// the emitter.
    pub fn generate(
        &self,
        scope: &ModuleScope,
        contract: &TypeDescRc,
        meta: &MetaMethod,
        emitter: &mut ClassEmitter,
    ) -> Result<()> {
        match self {
            MethodGenerator::Skip => Ok(()),
            MethodGenerator::Forwarding(source) => {
                let body = forwarding_body(meta, source.clone());
                emitter.define_method(meta.method().token(), body)
            }
            MethodGenerator::Minimalistic => {
                let body = minimalistic_body(meta.method());
                emitter.define_method(meta.method().token(), body)
            }
            MethodGenerator::WithInvocation(kind, source) => {
                let delegate = self.delegate_for(scope, contract, meta, emitter)?;
                let carrier = InvocationTypeGenerator::new(*kind).get_invocation_class(
                    scope,
                    contract,
                    meta,
                    scope.naming(),
                    delegate,
                )?;

                let memo_field = emitter
                    .member_naming()
                    .get_unique_name(&format!("__interceptors_{}", meta.method().name()));
                emitter.define_field(&memo_field, FieldKind::MethodInterceptors)?;

                let body = with_invocation_body(
                    contract.clone(),
                    meta.method().clone(),
                    carrier,
                    memo_field,
                    source.clone(),
                );
                emitter.define_method(meta.method().token(), body)
            }
        }
    }

    fn delegate_for(
        &self,
        scope: &ModuleScope,
        contract: &TypeDescRc,
        meta: &MetaMethod,
        emitter: &ClassEmitter,
    ) -> Result<Option<DelegateClassRc>> {
        if meta.dispatch() != DispatchRule::Indirect {
            return Ok(None);
        }
        let Some(mapped) = meta.method_on_target() else {
            return Ok(None);
        };
        let delegate = DelegateTypeGenerator::get_delegate_class(
            scope,
            contract,
            meta.method(),
            mapped,
            emitter.member_naming(),
        )?;
        Ok(Some(delegate))
    }
}

/// Body running the full interception pipeline.
///
/// By-ref parameters are copied back into the caller's argument slots after the chain
/// finishes, on the error path too, so callers observe partial output exactly as far
/// as the chain got.
fn with_invocation_body(
    contract: TypeDescRc,
    method: MethodDescRc,
    carrier: crate::generation::generators::invocation::InvocationClassRc,
    memo_field: String,
    source: TargetSource,
) -> MethodBody {
    Arc::new(move |proxy, generic_args, args| {
        let interceptors = proxy.interceptors_for(&memo_field, &contract, &method);
        let target = source.resolve(proxy)?;

        let mut invocation = ProxyInvocation::new(
            carrier.clone(),
            proxy.self_object()?,
            target,
            interceptors,
            args.to_vec(),
        );
        invocation.set_generic_arguments(generic_args.to_vec());
        invocation.set_type_arguments(proxy.class().type_arguments().to_vec());

        let outcome = invocation.proceed();

        for (index, param) in method.params().iter().enumerate() {
            if param.by_ref {
                args[index] = invocation.arguments_ref()[index].clone();
            }
        }

        outcome.map(|()| invocation.take_return_value())
    })
}

fn forwarding_body(meta: &MetaMethod, source: TargetSource) -> MethodBody {
    let method = meta
        .method_on_target()
        .cloned()
        .unwrap_or_else(|| meta.method().clone());
    Arc::new(move |proxy, generic_args, args| {
        let target = source.resolve(proxy)?.ok_or_else(|| Error::NoTarget {
            method: method.name().to_string(),
        })?;
        target.invoke(&method, generic_args, args)
    })
}

fn minimalistic_body(method: &MethodDescRc) -> MethodBody {
    let method = method.clone();
    Arc::new(move |proxy, generic_args, _args| {
        let resolved = method
            .return_type()
            .resolve(proxy.class().type_arguments(), generic_args)?;
        default_value(&resolved, &method)
    })
}

fn default_value(ty: &ValueType, method: &MethodDescRc) -> Result<Value> {
    match ty {
        ValueType::Unit => Ok(Value::Unit),
        ValueType::Bool => Ok(Value::Bool(false)),
        ValueType::Int32 => Ok(Value::Int32(0)),
        ValueType::Int64 => Ok(Value::Int64(0)),
        ValueType::Float64 => Ok(Value::Float64(0.0)),
        ValueType::Str => Ok(Value::Str(String::new())),
        _ => Err(Error::NotSupportedMember {
            member: method.name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let method = Arc::new(
            crate::model::types::MethodDesc::build("noop")
                .finish(crate::model::token::Token::new(0)),
        );
        assert_eq!(
            default_value(&ValueType::Int32, &method).unwrap(),
            Value::Int32(0)
        );
        assert_eq!(
            default_value(&ValueType::Bool, &method).unwrap(),
            Value::Bool(false)
        );
        assert!(default_value(&ValueType::Object(None), &method).is_err());
    }
}
