//! Transient member model built per generation request.
//!
//! Member collectors classify every member of the proxied contract into a [`MetaType`]:
//! a per-request tree of [`MetaMethod`] (plus property/event groupings) recording, for
//! each member, the declaring method, its most-derived counterpart on the target,
//! whether it is proxyable (decided once via the hook, never re-decided) and the
//! three-way dispatch rule. The model is created fresh per generation request and
//! discarded after the type is emitted; unlike the runtime type itself it is never
//! cached or reused.

use std::collections::HashSet;

use crate::model::types::MethodDescRc;

/// How the real implementation of a member is reached, decided once during member
/// collection and carried on the member model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRule {
    /// The target method is publicly accessible; forward to it directly
    Direct,
    /// The target method is not directly accessible (non-public or an explicit
    /// interface implementation); calls go through a generated delegate shape
    Indirect,
    /// No member is emitted for this entry; another contributor owns it
    Skip,
}

/// One member of the contract under generation.
#[derive(Debug, Clone)]
pub struct MetaMethod {
    method: MethodDescRc,
    method_on_target: Option<MethodDescRc>,
    proxyable: bool,
    has_target: bool,
    dispatch: DispatchRule,
}

impl MetaMethod {
    /// Creates a member entry.
    #[must_use]
    pub fn new(
        method: MethodDescRc,
        method_on_target: Option<MethodDescRc>,
        proxyable: bool,
        has_target: bool,
        dispatch: DispatchRule,
    ) -> Self {
        MetaMethod {
            method,
            method_on_target,
            proxyable,
            has_target,
            dispatch,
        }
    }

    /// The method as declared on the proxied contract.
    #[must_use]
    pub fn method(&self) -> &MethodDescRc {
        &self.method
    }

    /// The most-derived implementation visible through the target or base, if any.
    #[must_use]
    pub fn method_on_target(&self) -> Option<&MethodDescRc> {
        self.method_on_target.as_ref()
    }

    /// Whether the hook accepted this member for interception. Decided exactly once
    /// during collection.
    #[must_use]
    pub fn proxyable(&self) -> bool {
        self.proxyable
    }

    /// Whether a live implementation backs this member.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.has_target
    }

    /// How the real implementation is reached.
    #[must_use]
    pub fn dispatch(&self) -> DispatchRule {
        self.dispatch
    }
}

/// Property entry grouping accessor members.
#[derive(Debug, Clone)]
pub struct MetaProperty {
    /// Property name
    pub name: String,
    /// Getter entry, when collected
    pub getter: Option<MetaMethod>,
    /// Setter entry, when collected
    pub setter: Option<MetaMethod>,
}

/// Event entry grouping accessor members.
#[derive(Debug, Clone)]
pub struct MetaEvent {
    /// Event name
    pub name: String,
    /// Subscribe accessor entry, when collected
    pub add: Option<MetaMethod>,
    /// Unsubscribe accessor entry, when collected
    pub remove: Option<MetaMethod>,
}

/// The transient member model of one generation request.
///
/// De-duplicates members by canonical signature: a member appearing in multiple source
/// interfaces with an identical signature is collected exactly once, by the first
/// collector that sees it.
#[derive(Debug, Default)]
pub struct MetaType {
    methods: Vec<MetaMethod>,
    properties: Vec<MetaProperty>,
    events: Vec<MetaEvent>,
    seen_signatures: HashSet<String>,
}

impl MetaType {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        MetaType::default()
    }

    /// Records a member unless an identical signature was already collected.
    ///
    /// Returns `true` when the member was newly added; only then does the adding
    /// collector's contributor own the member.
    pub fn add_method(&mut self, method: MetaMethod) -> bool {
        let key = method.method().signature_key();
        if !self.seen_signatures.insert(key) {
            return false;
        }
        self.methods.push(method);
        true
    }

    /// Records a property grouping.
    pub fn add_property(&mut self, property: MetaProperty) {
        self.properties.push(property);
    }

    /// Records an event grouping.
    pub fn add_event(&mut self, event: MetaEvent) {
        self.events.push(event);
    }

    /// All collected members, in collection order.
    #[must_use]
    pub fn methods(&self) -> &[MetaMethod] {
        &self.methods
    }

    /// All collected property groupings.
    #[must_use]
    pub fn properties(&self) -> &[MetaProperty] {
        &self.properties
    }

    /// All collected event groupings.
    #[must_use]
    pub fn events(&self) -> &[MetaEvent] {
        &self.events
    }
}
