//! Proxy instances and their field slots.
//!
//! A [`ProxyObject`] is one live instance of a generated
//! [`RuntimeType`](crate::runtime::class::RuntimeType): it carries
//! the field slots the class declared and dispatches incoming calls through the
//! class's method table. It is the crate's uniform object shape, so proxies nest
//! naturally (a proxy can be the target of another proxy, which the generators
//! reject up front when asked to proxy one).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use crate::interception::interceptor::{InterceptorChain, InterceptorRc};
use crate::interception::selector::SelectorRc;
use crate::model::dispatch::{Dispatch, DynObject, ProxyTargetAccessor};
use crate::model::token::Token;
use crate::model::types::{MethodDesc, MethodDescRc, TypeDesc};
use crate::model::value::{Value, ValueType};
use crate::runtime::class::{FieldKind, RuntimeTypeRc};
use crate::{Error, Result};

/// Name of the instance-wide interceptor chain field.
pub const INTERCEPTORS_FIELD: &str = "__interceptors";
/// Name of the optional selector field.
pub const SELECTOR_FIELD: &str = "__selector";
/// Name of the target slot field.
pub const TARGET_FIELD: &str = "__target";

/// Construction arguments of a proxy instance.
///
/// Generated classes declare which fields they carry; instantiation draws each slot's
/// initial value from here. Subclass-style proxies without an explicit target build
/// one through the class's base constructor from `base_args`.
#[derive(Default)]
pub struct ProxyArguments {
    /// The wrapped target, when the proxy shape takes one
    pub target: Option<DynObject>,
    /// Instance-wide interceptor chain
    pub interceptors: InterceptorChain,
    /// Optional per-call interceptor selector
    pub selector: Option<SelectorRc>,
    /// Mixin instances, positionally matched to the class's mixin fields
    pub mixins: Vec<DynObject>,
    /// Arguments forwarded to the base constructor of subclass-style proxies
    pub base_args: Vec<Value>,
}

enum FieldSlot {
    Target(RwLock<Option<DynObject>>),
    Mixin(DynObject),
    Interceptors(InterceptorChain),
    Selector(Option<SelectorRc>),
    MethodInterceptors(OnceLock<InterceptorChain>),
}

/// One instance of a generated proxy class.
pub struct ProxyObject {
    class: RuntimeTypeRc,
    fields: HashMap<String, FieldSlot>,
    self_handle: std::sync::Weak<ProxyObject>,
}

impl ProxyObject {
    /// Instantiates a generated class.
    ///
    /// # Errors
    ///
    /// - Internal violation when a mixin field has no matching construction argument
    /// - Base-constructor failures of subclass-style proxies, unmodified
    pub fn instantiate(class: &RuntimeTypeRc, args: ProxyArguments) -> Result<Arc<ProxyObject>> {
        let mut fields = HashMap::with_capacity(class.fields().len());
        for field in class.fields() {
            let slot = match &field.kind {
                FieldKind::Target => {
                    let initial = match &args.target {
                        Some(target) => Some(target.clone()),
                        None => match class.base_constructor() {
                            Some(ctor) => Some(ctor(&args.base_args)?),
                            None => None,
                        },
                    };
                    FieldSlot::Target(RwLock::new(initial))
                }
                FieldKind::Mixin(index) => {
                    let mixin = args.mixins.get(*index).cloned().ok_or_else(|| {
                        violation_error!(
                            "missing mixin argument {} for field '{}'",
                            index,
                            field.name
                        )
                    })?;
                    FieldSlot::Mixin(mixin)
                }
                FieldKind::Interceptors => FieldSlot::Interceptors(args.interceptors.clone()),
                FieldKind::Selector => FieldSlot::Selector(args.selector.clone()),
                FieldKind::MethodInterceptors => {
                    FieldSlot::MethodInterceptors(OnceLock::new())
                }
            };
            fields.insert(field.name.clone(), slot);
        }

        Ok(Arc::new_cyclic(|weak| ProxyObject {
            class: class.clone(),
            fields,
            self_handle: weak.clone(),
        }))
    }

    /// The generated class this instance belongs to.
    #[must_use]
    pub fn class(&self) -> &RuntimeTypeRc {
        &self.class
    }

    /// This instance as a shared dispatchable object.
    ///
    /// # Errors
    ///
    /// Internal violation if called while the instance is being dropped.
    pub fn self_object(&self) -> Result<DynObject> {
        self.self_handle
            .upgrade()
            .map(|strong| strong as DynObject)
            .ok_or_else(|| violation_error!("proxy self handle expired during dispatch"))
    }

    /// Current content of the target slot.
    ///
    /// # Errors
    ///
    /// [`Error::LockError`] on slot-lock poisoning.
    pub fn target(&self) -> Result<Option<DynObject>> {
        match self.fields.get(TARGET_FIELD) {
            Some(FieldSlot::Target(slot)) => Ok(read_lock!(slot).clone()),
            _ => Ok(None),
        }
    }

    /// Instance-wide interceptor chain; empty when the class declares none.
    #[must_use]
    pub fn interceptors(&self) -> InterceptorChain {
        match self.fields.get(INTERCEPTORS_FIELD) {
            Some(FieldSlot::Interceptors(chain)) => chain.clone(),
            _ => Arc::from(Vec::new()),
        }
    }

    /// The selector, when one was supplied at construction.
    #[must_use]
    pub fn selector(&self) -> Option<SelectorRc> {
        match self.fields.get(SELECTOR_FIELD) {
            Some(FieldSlot::Selector(selector)) => selector.clone(),
            _ => None,
        }
    }

    /// The mixin instance stored in a named mixin field.
    #[must_use]
    pub fn mixin(&self, field: &str) -> Option<DynObject> {
        match self.fields.get(field) {
            Some(FieldSlot::Mixin(mixin)) => Some(mixin.clone()),
            _ => None,
        }
    }

    /// The interceptor chain to run for one method.
    ///
    /// Without a selector this is the instance chain. With one, the selector's choice
    /// is computed once per (instance, method) and memoized in the method's dedicated
    /// field; later calls reuse the memo.
    #[must_use]
    pub fn interceptors_for(
        &self,
        memo_field: &str,
        proxied_type: &TypeDesc,
        method: &MethodDescRc,
    ) -> InterceptorChain {
        let chain = self.interceptors();
        let Some(selector) = self.selector() else {
            return chain;
        };
        match self.fields.get(memo_field) {
            Some(FieldSlot::MethodInterceptors(memo)) => memo
                .get_or_init(|| {
                    let selected: Vec<InterceptorRc> =
                        selector.select_interceptors(proxied_type, method, &chain);
                    Arc::from(selected)
                })
                .clone(),
            _ => {
                let selected: Vec<InterceptorRc> =
                    selector.select_interceptors(proxied_type, method, &chain);
                Arc::from(selected)
            }
        }
    }
}

impl Dispatch for ProxyObject {
    fn type_token(&self) -> Token {
        self.class.token()
    }

    fn invoke(
        &self,
        method: &MethodDesc,
        generic_args: &[ValueType],
        args: &mut [Value],
    ) -> Result<Value> {
        let body = self
            .class
            .method_body(method.token())
            .ok_or(Error::MethodNotFound(method.token()))?
            .clone();
        body(self, generic_args, args)
    }

    fn proxy_accessor(&self) -> Option<&dyn ProxyTargetAccessor> {
        Some(self)
    }
}

impl ProxyTargetAccessor for ProxyObject {
    fn dyn_proxy_target(&self) -> Option<DynObject> {
        self.target().ok().flatten()
    }

    fn dyn_interceptors(&self) -> Vec<InterceptorRc> {
        self.interceptors().to_vec()
    }
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("class", &self.class.name())
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

/// `true` when the object is a generated proxy instance.
///
/// Checks both the token namespace and the accessor surface, so a handcrafted
/// [`Dispatch`] implementation squatting on a generated-range token is not mistaken
/// for a proxy.
#[must_use]
pub fn is_proxy(object: &DynObject) -> bool {
    object.type_token().is_generated() && object.proxy_accessor().is_some()
}

/// The innermost non-proxy object behind a chain of proxies-of-proxies, or the object
/// itself when it is not a proxy.
#[must_use]
pub fn unwrap_proxy_target(object: &DynObject) -> DynObject {
    let mut current = object.clone();
    while let Some(accessor) = current.proxy_accessor() {
        match accessor.dyn_proxy_target() {
            Some(target) if !Arc::ptr_eq(&target, &current) => current = target,
            _ => break,
        }
    }
    current
}
