//! Shared top-level proxy type generation flow.
//!
//! Every proxy shape follows the same sequence: validate the contract, compute the
//! structural cache key, probe the scope cache, and only on a miss assemble the
//! contributor list, collect members, fire the hook's completion notification, emit
//! all bodies and register the finished class. The whole check-generate-register
//! sequence for top-level types runs under the scope lock, so concurrent first
//! requests yield one class.
//!
//! # Open Generic Contracts
//!
//! An open generic contract generates an open proxy *definition*, cached under the
//! open contract's key. A closed contract produced by
//! [`TypeModel::instantiate`](crate::model::registry::TypeModel::instantiate) does not
//! regenerate: the definition is generated (or fetched) first, then closed by aliasing
//! each closed member token onto the matching definition body, cached per argument
//! list.

use std::sync::Arc;

use crate::generation::contributors::{
    class::{ClassProxyContributor, WrappedClassContributor},
    interface::{InterfaceProxyContributor, InterfaceTargetMode},
    mixin::MixinContributor,
    InterfaceClaims, TypeContributor,
};
use crate::generation::emitter::ClassEmitter;
use crate::generation::options::ProxyGenerationOptions;
use crate::generation::scope::{CacheKey, ModuleScope, ProxyKind};
use crate::model::registry::TypeModel;
use crate::model::token::Token;
use crate::model::types::{TypeDescRc, TypeKind};
use crate::runtime::class::{FieldKind, RuntimeTypeRc};
use crate::runtime::object::{INTERCEPTORS_FIELD, SELECTOR_FIELD, TARGET_FIELD};
use crate::{Error, Result};

/// One proxy shape with its shape-specific inputs.
#[derive(Clone)]
pub(crate) enum ProxyShape {
    /// Subclass-style class proxy
    Class,
    /// Class proxy forwarding to a held instance
    ClassWithTarget,
    /// Interface proxy with a fixed target; the target's described class, when known,
    /// resolves explicit implementations
    InterfaceWithTarget(Option<TypeDescRc>),
    /// Interface proxy whose target may be absent or replaced mid-call
    InterfaceWithTargetInterface,
    /// Interface proxy with no target
    InterfaceWithoutTarget,
}

impl ProxyShape {
    pub(crate) fn kind(&self) -> ProxyKind {
        match self {
            ProxyShape::Class => ProxyKind::Class,
            ProxyShape::ClassWithTarget => ProxyKind::ClassWithTarget,
            ProxyShape::InterfaceWithTarget(_) => ProxyKind::InterfaceWithTarget,
            ProxyShape::InterfaceWithTargetInterface => ProxyKind::InterfaceWithTargetInterface,
            ProxyShape::InterfaceWithoutTarget => ProxyKind::InterfaceWithoutTarget,
        }
    }

    fn is_class_shape(&self) -> bool {
        matches!(self, ProxyShape::Class | ProxyShape::ClassWithTarget)
    }

    fn target_class_token(&self) -> Option<Token> {
        match self {
            ProxyShape::InterfaceWithTarget(Some(target)) => Some(target.token()),
            _ => None,
        }
    }

    fn interface_mode(&self) -> InterfaceTargetMode {
        match self {
            ProxyShape::InterfaceWithTarget(Some(target)) => {
                InterfaceTargetMode::OnClass(target.clone())
            }
            ProxyShape::InterfaceWithTarget(None) => InterfaceTargetMode::Backed,
            ProxyShape::InterfaceWithTargetInterface => InterfaceTargetMode::Replaceable,
            _ => InterfaceTargetMode::None,
        }
    }
}

/// Returns the proxy type for the request, generating and caching it on first use.
pub(crate) fn obtain_proxy_type(
    model: &Arc<TypeModel>,
    scope: &Arc<ModuleScope>,
    options: &ProxyGenerationOptions,
    shape: &ProxyShape,
    contract: &TypeDescRc,
    additional: &[TypeDescRc],
) -> Result<RuntimeTypeRc> {
    validate_contract(shape, contract)?;
    options.initialize(model)?;

    if let Some((open_token, type_args)) = contract.generic_source() {
        let open = model.resolve(open_token)?;
        let definition = obtain_proxy_type(model, scope, options, shape, &open, additional)?;
        let type_args = type_args.to_vec();
        return scope.obtain_closed(definition.token(), type_args.clone(), || {
            let aliases: Vec<(Token, Token)> = contract
                .methods()
                .iter()
                .zip(open.methods().iter())
                .map(|((_, closed), (_, opened))| (closed.token(), opened.token()))
                .collect();
            let name = scope
                .naming()
                .get_unique_name(&format!("{}_{}", definition.name(), mangle(&type_args)));
            Ok(definition.close(name, Some(contract.clone()), type_args.clone(), &aliases))
        });
    }

    let additional_tokens: Vec<Token> = additional.iter().map(|i| i.token()).collect();
    let key = CacheKey::proxy(
        shape.kind(),
        contract.token(),
        shape.target_class_token(),
        &additional_tokens,
        options.digest(),
    );
    scope.obtain(key, || {
        generate_fresh(model, scope, options, shape, contract, additional)
    })
}

fn mangle(type_args: &[crate::model::value::ValueType]) -> String {
    type_args
        .iter()
        .map(crate::model::value::ValueType::display_name)
        .collect::<Vec<_>>()
        .join("_")
}

fn validate_contract(shape: &ProxyShape, contract: &TypeDescRc) -> Result<()> {
    match (shape.is_class_shape(), contract.kind()) {
        (true, TypeKind::Class) | (false, TypeKind::Interface) => Ok(()),
        (true, _) => Err(Error::InvalidBaseType {
            type_name: contract.full_name(),
        }),
        (false, _) => Err(Error::InvalidBaseType {
            type_name: contract.full_name(),
        }),
    }
}

fn generate_fresh(
    model: &Arc<TypeModel>,
    scope: &Arc<ModuleScope>,
    options: &ProxyGenerationOptions,
    shape: &ProxyShape,
    contract: &TypeDescRc,
    additional: &[TypeDescRc],
) -> Result<RuntimeTypeRc> {
    if let Some(base_override) = options.base_type_override() {
        let base = model.resolve(base_override)?;
        if base.kind() != TypeKind::Class || base.constructor().is_none() {
            return Err(Error::InvalidBaseType {
                type_name: base.full_name(),
            });
        }
    }

    let mut claims = InterfaceClaims::new();
    let mut contributors: Vec<Box<dyn TypeContributor>> = Vec::new();

    // The proxied contract claims its interfaces first; mixins and additional
    // interfaces only get what is left.
    if shape.is_class_shape() {
        for iface in model.class_interfaces(&contract.token())? {
            claims.claim(iface);
        }
        match shape {
            ProxyShape::Class => {
                contributors.push(Box::new(ClassProxyContributor::new(contract.clone())));
            }
            _ => {
                contributors.push(Box::new(WrappedClassContributor::new(contract.clone())));
            }
        }
    } else {
        let mode = shape.interface_mode();
        for iface_token in model.interface_closure(&[contract.token()])? {
            if !claims.claim(iface_token) {
                continue;
            }
            let iface = model.resolve(iface_token)?;
            contributors.push(Box::new(InterfaceProxyContributor::new(iface, mode.clone())));
        }
    }

    let mixin_data = options.mixin_data();
    for (position, iface_token) in mixin_data.mixin_interfaces().enumerate() {
        if !claims.claim(iface_token) {
            // The proxied contract wins over a mixin bringing the same interface.
            continue;
        }
        let iface = model.resolve(iface_token)?;
        contributors.push(Box::new(MixinContributor::new(iface, position)));
    }

    for iface_token in model.interface_closure(&additional_tokens(additional))? {
        if !claims.claim(iface_token) {
            continue;
        }
        let iface = model.resolve(iface_token)?;
        contributors.push(Box::new(InterfaceProxyContributor::new(
            iface,
            InterfaceTargetMode::None,
        )));
    }

    let hook = options.hook().clone();
    for contributor in &mut contributors {
        contributor.collect(model, &hook)?;
    }
    hook.methods_inspected();

    let mut emitter = ClassEmitter::new(
        &format!("proxyscope.proxies.{}Proxy", contract.name()),
        scope.naming(),
    );
    emitter.define_field(INTERCEPTORS_FIELD, FieldKind::Interceptors)?;
    emitter.define_field(SELECTOR_FIELD, FieldKind::Selector)?;
    if !matches!(shape, ProxyShape::InterfaceWithoutTarget) {
        emitter.define_field(TARGET_FIELD, FieldKind::Target)?;
    }

    if shape.is_class_shape() {
        match contract.constructor() {
            Some(ctor) => emitter.define_constructor(ctor.clone()),
            None if matches!(shape, ProxyShape::Class) => {
                return Err(Error::MissingConstructor {
                    type_name: contract.full_name(),
                });
            }
            None => {}
        }
    }

    if contract.is_open_generic() {
        emitter.copy_generic_parameters_from(contract);
    }

    for contributor in &contributors {
        contributor.generate(scope, &mut emitter)?;
    }

    if shape.is_class_shape() {
        // Calls arriving under interface identities dispatch to the implementing
        // class member's body.
        for (iface_method, class_method) in contract.interface_map() {
            emitter.define_alias(*iface_method, *class_method)?;
        }
    }

    Ok(emitter.finalize(Some(contract.clone())))
}

fn additional_tokens(additional: &[TypeDescRc]) -> Vec<Token> {
    additional.iter().map(|i| i.token()).collect()
}
