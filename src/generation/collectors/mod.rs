//! Member collectors: classify contract members into the transient member model.
//!
//! Each proxy shape collects members differently (an interface contributes everything,
//! a class only its overridable methods, a wrapped class resolves each member against
//! the held target), but all collectors share the same outputs: [`MetaMethod`] entries
//! in a [`MetaType`], with proxyability decided through the generation hook exactly
//! once per member.
//!
//! # Key Components
//!
//! - [`MembersCollector`] - The collector contract
//! - [`interface::InterfaceMembersCollector`] - Interface members with no backing target
//! - [`interface::InterfaceMembersOnClassCollector`] - Interface members resolved
//!   against a class's interface map
//! - [`class::ClassMembersCollector`] - Overridable class members
//! - [`class::WrappedClassMembersCollector`] - Class members forwarded to a held instance
//! - [`delegate::DelegateMembersCollector`] - The single member of a delegate shape

pub mod class;
pub mod delegate;
pub mod interface;

use crate::generation::hook::HookRc;
use crate::generation::meta::{MetaEvent, MetaProperty, MetaType};
use crate::model::registry::TypeModel;
use crate::model::token::Token;
use crate::model::types::TypeDescRc;
use crate::Result;

/// Collects the members one source type contributes to a generation request.
pub trait MembersCollector {
    /// Appends this source's members to `meta`, consulting `hook` per member.
    ///
    /// Members whose signature is already present in `meta` are skipped; the first
    /// collector to see a signature owns it.
    ///
    /// # Errors
    ///
    /// Descriptor resolution failures against `model`.
    fn collect(&self, model: &TypeModel, hook: &HookRc, meta: &mut MetaType) -> Result<()>;
}

/// Regroups a contract's property and event accessors into meta groupings, matching
/// accessor tokens against the members actually collected.
pub(crate) fn group_accessors(contract: &TypeDescRc, meta: &mut MetaType) {
    let find = |token: Option<Token>, meta: &MetaType| {
        token.and_then(|t| {
            meta.methods()
                .iter()
                .find(|m| m.method().token() == t)
                .cloned()
        })
    };

    for property in contract.properties() {
        let getter = find(property.getter, meta);
        let setter = find(property.setter, meta);
        if getter.is_some() || setter.is_some() {
            meta.add_property(MetaProperty {
                name: property.name.clone(),
                getter,
                setter,
            });
        }
    }

    for event in contract.events() {
        let add = find(event.add, meta);
        let remove = find(event.remove, meta);
        if add.is_some() || remove.is_some() {
            meta.add_event(MetaEvent {
                name: event.name.clone(),
                add,
                remove,
            });
        }
    }
}
