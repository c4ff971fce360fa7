//! Type and member descriptors: the crate's reflection surface.
//!
//! proxyscope generates proxies for *described* contracts. A [`TypeDesc`] plays the role
//! reflection metadata plays in a managed runtime: it names a contract (interface, class
//! or delegate shape), lists its members with exact parameter shapes, records the
//! interface map of a class (which concrete method implements which interface method,
//! including explicit/non-public implementations) and, for classes, carries a
//! constructor function producing live instances.
//!
//! # Key Components
//!
//! - [`TypeDesc`] / [`TypeBuilder`] - Type contracts and their fluent builder
//! - [`MethodDesc`] / [`MethodBuilder`] - Method shapes: parameters, return, generic arity
//! - [`ParamDesc`] - A single parameter, optionally by-ref
//! - [`PropertyDesc`] / [`EventDesc`] - Accessor groupings derived from method associations
//!
//! # Descriptor Lifetime
//!
//! Descriptors are immutable once built and shared as `Arc`s; the generation pipeline
//! never mutates them. Open generic descriptors stay open; closing them produces a new
//! descriptor through [`crate::model::registry::TypeModel::instantiate`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use proxyscope::model::registry::TypeModel;
//! use proxyscope::model::types::{MethodDesc, TypeDesc};
//! use proxyscope::model::value::ValueType;
//!
//! let model = TypeModel::new();
//! let calculator = TypeDesc::interface("Demo", "ICalculator")
//!     .method(
//!         MethodDesc::build("sum")
//!             .param("a", ValueType::Int32)
//!             .param("b", ValueType::Int32)
//!             .returns(ValueType::Int32),
//!     )
//!     .build(&model)?;
//! # Ok::<(), proxyscope::Error>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strum::Display;

use crate::model::dispatch::DynObject;
use crate::model::flags::{MethodAttributes, TypeAttributes};
use crate::model::registry::TypeModel;
use crate::model::token::{Token, TokenKind};
use crate::model::value::{Value, ValueType};
use crate::Result;

/// Reference-counted handle to a [`TypeDesc`].
pub type TypeDescRc = Arc<TypeDesc>;

/// Reference-counted handle to a [`MethodDesc`].
pub type MethodDescRc = Arc<MethodDesc>;

/// Constructor function carried by class descriptors.
///
/// Given boxed constructor arguments, produces a live instance of the described class.
pub type CtorFn = Arc<dyn Fn(&[Value]) -> Result<DynObject> + Send + Sync>;

/// The kind of contract a [`TypeDesc`] describes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// An interface: members only, no implementation, no constructor
    Interface,
    /// A class: overridable members, base link, constructor
    Class,
    /// A delegate shape: a single `invoke` member
    Delegate,
}

/// A single parameter of a method shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDesc {
    /// Parameter name
    pub name: String,
    /// Declared shape of the parameter
    pub ty: ValueType,
    /// By-ref marker; by-ref arguments are written back to the caller's slot
    pub by_ref: bool,
}

/// Accessor-group association carried on a method descriptor.
///
/// Methods that act as property or event accessors carry the owning member's name so
/// collectors can regroup them into [`PropertyDesc`] / [`EventDesc`] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAssociation {
    /// Getter of the named property
    PropertyGet(String),
    /// Setter of the named property
    PropertySet(String),
    /// Subscribe accessor of the named event
    EventAdd(String),
    /// Unsubscribe accessor of the named event
    EventRemove(String),
}

/// A property on a type descriptor, grouping its accessor methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDesc {
    /// Property name
    pub name: String,
    /// Getter method token, when present
    pub getter: Option<Token>,
    /// Setter method token, when present
    pub setter: Option<Token>,
}

/// An event on a type descriptor, grouping its accessor methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDesc {
    /// Event name
    pub name: String,
    /// Subscribe accessor token, when present
    pub add: Option<Token>,
    /// Unsubscribe accessor token, when present
    pub remove: Option<Token>,
}

/// A method shape on a type descriptor.
///
/// Immutable once built; shared between the declaring descriptor, meta-model entries and
/// generated invocation carriers. Identity is the token, never the name.
#[derive(Debug)]
pub struct MethodDesc {
    token: Token,
    declaring_type: Token,
    name: String,
    attributes: MethodAttributes,
    params: Vec<ParamDesc>,
    return_type: ValueType,
    generic_params: Vec<String>,
    association: Option<MemberAssociation>,
}

impl MethodDesc {
    /// Starts building a method shape with the given name.
    #[must_use]
    pub fn build(name: &str) -> MethodBuilder {
        MethodBuilder {
            name: name.to_string(),
            attributes: MethodAttributes::default(),
            params: Vec::new(),
            return_type: ValueType::Unit,
            generic_params: Vec::new(),
            association: None,
        }
    }

    /// Token identifying this method.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Token of the declaring type descriptor.
    #[must_use]
    pub fn declaring_type(&self) -> Token {
        self.declaring_type
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute flags.
    #[must_use]
    pub fn attributes(&self) -> MethodAttributes {
        self.attributes
    }

    /// Parameter list, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamDesc] {
        &self.params
    }

    /// Declared return shape.
    #[must_use]
    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    /// Names of the method's own generic parameters.
    #[must_use]
    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    /// Number of generic parameters the method declares.
    #[must_use]
    pub fn generic_arity(&self) -> usize {
        self.generic_params.len()
    }

    /// Returns true when the method declares generic parameters of its own.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    /// Accessor-group association, when this method is a property or event accessor.
    #[must_use]
    pub fn association(&self) -> Option<&MemberAssociation> {
        self.association.as_ref()
    }

    /// Returns true when any parameter is marked by-ref.
    #[must_use]
    pub fn has_by_ref_params(&self) -> bool {
        self.params.iter().any(|p| p.by_ref)
    }

    /// Canonical signature key used to de-duplicate members that appear in multiple
    /// source interfaces with identical signatures.
    #[must_use]
    pub fn signature_key(&self) -> String {
        let mut key = String::with_capacity(self.name.len() + 16);
        key.push_str(&self.name);
        key.push('`');
        key.push_str(&self.generic_arity().to_string());
        key.push('(');
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            key.push_str(&param.ty.display_name());
            if param.by_ref {
                key.push('&');
            }
        }
        key.push(')');
        key
    }
}

/// Fluent builder for [`MethodDesc`].
///
/// Obtained via [`MethodDesc::build`]; consumed by [`TypeBuilder::method`], which
/// allocates the token and binds the declaring type.
#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    attributes: MethodAttributes,
    params: Vec<ParamDesc>,
    return_type: ValueType,
    generic_params: Vec<String>,
    association: Option<MemberAssociation>,
}

impl MethodBuilder {
    /// Appends a by-value parameter.
    #[must_use]
    pub fn param(mut self, name: &str, ty: ValueType) -> Self {
        self.params.push(ParamDesc {
            name: name.to_string(),
            ty,
            by_ref: false,
        });
        self
    }

    /// Appends a by-ref parameter; its final value is written back to the caller's slot.
    #[must_use]
    pub fn by_ref_param(mut self, name: &str, ty: ValueType) -> Self {
        self.params.push(ParamDesc {
            name: name.to_string(),
            ty,
            by_ref: true,
        });
        self
    }

    /// Sets the return shape (defaults to [`ValueType::Unit`]).
    #[must_use]
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.return_type = ty;
        self
    }

    /// Replaces the attribute flags (defaults to public + virtual).
    #[must_use]
    pub fn attributes(mut self, attributes: MethodAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declares the method's own generic parameters, by name.
    #[must_use]
    pub fn generic_params(mut self, names: &[&str]) -> Self {
        self.generic_params = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    /// Marks this method as the getter of the named property.
    #[must_use]
    pub fn property_get(mut self, property: &str) -> Self {
        self.association = Some(MemberAssociation::PropertyGet(property.to_string()));
        self
    }

    /// Marks this method as the setter of the named property.
    #[must_use]
    pub fn property_set(mut self, property: &str) -> Self {
        self.association = Some(MemberAssociation::PropertySet(property.to_string()));
        self
    }

    /// Marks this method as the subscribe accessor of the named event.
    #[must_use]
    pub fn event_add(mut self, event: &str) -> Self {
        self.association = Some(MemberAssociation::EventAdd(event.to_string()));
        self
    }

    /// Marks this method as the unsubscribe accessor of the named event.
    #[must_use]
    pub fn event_remove(mut self, event: &str) -> Self {
        self.association = Some(MemberAssociation::EventRemove(event.to_string()));
        self
    }

    pub(crate) fn finish(self, declaring_type: Token) -> MethodDesc {
        MethodDesc {
            token: Token::alloc(TokenKind::MethodDesc),
            declaring_type,
            name: self.name,
            attributes: self.attributes,
            params: self.params,
            return_type: self.return_type,
            generic_params: self.generic_params,
            association: self.association,
        }
    }

    /// Builds a closed copy of an existing method, substituting the declaring type's
    /// generic arguments into parameter and return positions.
    pub(crate) fn close(
        method: &MethodDesc,
        declaring_type: Token,
        type_args: &[ValueType],
    ) -> Result<MethodDesc> {
        let mut params = Vec::with_capacity(method.params.len());
        for param in &method.params {
            params.push(ParamDesc {
                name: param.name.clone(),
                ty: close_in_method(&param.ty, type_args)?,
                by_ref: param.by_ref,
            });
        }
        Ok(MethodDesc {
            token: Token::alloc(TokenKind::MethodDesc),
            declaring_type,
            name: method.name.clone(),
            attributes: method.attributes,
            params,
            return_type: close_in_method(&method.return_type, type_args)?,
            generic_params: method.generic_params.clone(),
            association: method.association.clone(),
        })
    }
}

/// Substitutes type-level generic positions, leaving method-level positions open.
fn close_in_method(ty: &ValueType, type_args: &[ValueType]) -> Result<ValueType> {
    match ty {
        ValueType::TypeGeneric(_) => ty.resolve(type_args, &[]),
        other => Ok(other.clone()),
    }
}

/// A described type contract: interface, class or delegate shape.
///
/// The central input of every generation request. Identity is the token; structural
/// details (members, interface map, generic parameters) drive member collection, and
/// the constructor function (classes only) backs class-proxy instantiation.
///
/// # Thread Safety
///
/// Immutable and shared as [`TypeDescRc`]; safe to use from any thread.
pub struct TypeDesc {
    token: Token,
    namespace: String,
    name: String,
    kind: TypeKind,
    attributes: TypeAttributes,
    base: Option<Token>,
    interfaces: Vec<Token>,
    methods: Arc<boxcar::Vec<MethodDescRc>>,
    properties: Vec<PropertyDesc>,
    events: Vec<EventDesc>,
    interface_map: HashMap<Token, Token>,
    generic_params: Vec<String>,
    generic_source: Option<(Token, Vec<ValueType>)>,
    constructor: Option<CtorFn>,
}

impl TypeDesc {
    /// Starts building an interface descriptor.
    #[must_use]
    pub fn interface(namespace: &str, name: &str) -> TypeBuilder {
        TypeBuilder::new(namespace, name, TypeKind::Interface)
    }

    /// Starts building a class descriptor.
    #[must_use]
    pub fn class(namespace: &str, name: &str) -> TypeBuilder {
        TypeBuilder::new(namespace, name, TypeKind::Class)
    }

    /// Starts building a delegate shape descriptor.
    #[must_use]
    pub fn delegate(namespace: &str, name: &str) -> TypeBuilder {
        TypeBuilder::new(namespace, name, TypeKind::Delegate)
    }

    /// Token identifying this descriptor.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Namespace of the descriptor.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Simple name of the descriptor.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace-qualified name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// The kind of contract described.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Attribute flags.
    #[must_use]
    pub fn attributes(&self) -> TypeAttributes {
        self.attributes
    }

    /// Base class token, for class descriptors that declare one.
    #[must_use]
    pub fn base(&self) -> Option<Token> {
        self.base
    }

    /// Directly implemented (or extended) interface tokens.
    #[must_use]
    pub fn interfaces(&self) -> &[Token] {
        &self.interfaces
    }

    /// Members declared on this descriptor.
    #[must_use]
    pub fn methods(&self) -> &boxcar::Vec<MethodDescRc> {
        &self.methods
    }

    /// Properties declared on this descriptor.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDesc] {
        &self.properties
    }

    /// Events declared on this descriptor.
    #[must_use]
    pub fn events(&self) -> &[EventDesc] {
        &self.events
    }

    /// Interface map: interface method token to the class method implementing it.
    ///
    /// Covers explicit and non-public implementations; empty for interfaces.
    #[must_use]
    pub fn interface_map(&self) -> &HashMap<Token, Token> {
        &self.interface_map
    }

    /// Names of the type's generic parameters; empty for non-generic types.
    #[must_use]
    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    /// Returns true when this descriptor is an open generic definition.
    #[must_use]
    pub fn is_open_generic(&self) -> bool {
        !self.generic_params.is_empty() && self.generic_source.is_none()
    }

    /// The open definition and argument list this descriptor was closed from, if any.
    #[must_use]
    pub fn generic_source(&self) -> Option<(Token, &[ValueType])> {
        self.generic_source.as_ref().map(|(t, a)| (*t, a.as_slice()))
    }

    /// Constructor function, for class descriptors that carry one.
    #[must_use]
    pub fn constructor(&self) -> Option<&CtorFn> {
        self.constructor.as_ref()
    }

    /// Finds a declared method by token.
    #[must_use]
    pub fn method_by_token(&self, token: Token) -> Option<MethodDescRc> {
        self.methods
            .iter()
            .map(|(_, m)| m)
            .find(|m| m.token() == token)
            .cloned()
    }

    /// Finds a declared method by name (first declaration wins).
    #[must_use]
    pub fn method_by_name(&self, name: &str) -> Option<MethodDescRc> {
        self.methods
            .iter()
            .map(|(_, m)| m)
            .find(|m| m.name() == name)
            .cloned()
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("token", &self.token)
            .field("full_name", &self.full_name())
            .field("kind", &self.kind)
            .field("methods", &self.methods.count())
            .field("generic_params", &self.generic_params)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`TypeDesc`].
///
/// `build` registers the finished descriptor in the [`TypeModel`] and returns the shared
/// handle; descriptors never exist outside a model.
pub struct TypeBuilder {
    namespace: String,
    name: String,
    kind: TypeKind,
    attributes: TypeAttributes,
    base: Option<Token>,
    interfaces: Vec<Token>,
    methods: Vec<MethodBuilder>,
    interface_map: Vec<(Token, String)>,
    generic_params: Vec<String>,
    constructor: Option<CtorFn>,
}

impl TypeBuilder {
    fn new(namespace: &str, name: &str, kind: TypeKind) -> Self {
        TypeBuilder {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            attributes: TypeAttributes::default(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            interface_map: Vec::new(),
            generic_params: Vec::new(),
            constructor: None,
        }
    }

    /// Replaces the attribute flags (defaults to public).
    #[must_use]
    pub fn attributes(mut self, attributes: TypeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the base class token (class descriptors only).
    #[must_use]
    pub fn base(mut self, base: Token) -> Self {
        self.base = Some(base);
        self
    }

    /// Declares a directly implemented (or extended) interface.
    #[must_use]
    pub fn implements(mut self, interface: Token) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Records that the member named `class_method` on this builder implements
    /// `interface_method`. Used for explicit and non-public implementations; public
    /// same-signature implementations are mapped automatically at build time.
    #[must_use]
    pub fn map_interface_method(mut self, interface_method: Token, class_method: &str) -> Self {
        self.interface_map
            .push((interface_method, class_method.to_string()));
        self
    }

    /// Declares the type's generic parameters, making this an open generic definition.
    #[must_use]
    pub fn generic_params(mut self, names: &[&str]) -> Self {
        self.generic_params = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    /// Attaches the constructor function (class descriptors only).
    #[must_use]
    pub fn constructor(mut self, ctor: CtorFn) -> Self {
        self.constructor = Some(ctor);
        self
    }

    /// Finishes the descriptor and registers it in the model.
    ///
    /// Builds the member list, derives property/event groupings from accessor
    /// associations and resolves the automatic part of the interface map (same-name,
    /// same-signature public members implementing a declared interface's members).
    ///
    /// # Errors
    ///
    /// [`crate::Error::TypeNotFound`] when a declared interface token is not registered
    /// in the model.
    pub fn build(self, model: &TypeModel) -> Result<TypeDescRc> {
        let token = Token::alloc(TokenKind::TypeDesc);

        let methods: Arc<boxcar::Vec<MethodDescRc>> = Arc::new(boxcar::Vec::new());
        for builder in self.methods {
            methods.push(Arc::new(builder.finish(token)));
        }

        let mut interface_map: HashMap<Token, Token> = HashMap::new();
        for (iface_method, class_method) in self.interface_map {
            let mapped = methods
                .iter()
                .map(|(_, m)| m)
                .find(|m| m.name() == class_method)
                .ok_or_else(|| {
                    violation_error!(
                        "explicit interface mapping names unknown member '{}'",
                        class_method
                    )
                })?;
            interface_map.insert(iface_method, mapped.token());
        }
        if self.kind == TypeKind::Class {
            for iface_token in &self.interfaces {
                let iface = model.get(iface_token).ok_or(crate::Error::TypeNotFound(*iface_token))?;
                for (_, iface_method) in iface.methods().iter() {
                    if interface_map.contains_key(&iface_method.token()) {
                        continue;
                    }
                    let implementing = methods
                        .iter()
                        .map(|(_, m)| m)
                        .find(|m| m.signature_key() == iface_method.signature_key());
                    if let Some(class_method) = implementing {
                        interface_map.insert(iface_method.token(), class_method.token());
                    }
                }
            }
        }

        let (properties, events) = group_accessors(&methods);

        let desc = Arc::new(TypeDesc {
            token,
            namespace: self.namespace,
            name: self.name,
            kind: self.kind,
            attributes: self.attributes,
            base: self.base,
            interfaces: self.interfaces,
            methods,
            properties,
            events,
            interface_map,
            generic_params: self.generic_params,
            generic_source: None,
            constructor: self.constructor,
        });
        model.insert(&desc);
        Ok(desc)
    }
}

/// Groups accessor methods into property and event descriptors.
fn group_accessors(methods: &boxcar::Vec<MethodDescRc>) -> (Vec<PropertyDesc>, Vec<EventDesc>) {
    let mut properties: Vec<PropertyDesc> = Vec::new();
    let mut events: Vec<EventDesc> = Vec::new();

    for (_, method) in methods.iter() {
        match method.association() {
            Some(MemberAssociation::PropertyGet(name)) => {
                entry_property(&mut properties, name).getter = Some(method.token());
            }
            Some(MemberAssociation::PropertySet(name)) => {
                entry_property(&mut properties, name).setter = Some(method.token());
            }
            Some(MemberAssociation::EventAdd(name)) => {
                entry_event(&mut events, name).add = Some(method.token());
            }
            Some(MemberAssociation::EventRemove(name)) => {
                entry_event(&mut events, name).remove = Some(method.token());
            }
            None => {}
        }
    }
    (properties, events)
}

fn entry_property<'a>(properties: &'a mut Vec<PropertyDesc>, name: &str) -> &'a mut PropertyDesc {
    if let Some(index) = properties.iter().position(|p| p.name == name) {
        return &mut properties[index];
    }
    properties.push(PropertyDesc {
        name: name.to_string(),
        getter: None,
        setter: None,
    });
    properties.last_mut().unwrap()
}

fn entry_event<'a>(events: &'a mut Vec<EventDesc>, name: &str) -> &'a mut EventDesc {
    if let Some(index) = events.iter().position(|e| e.name == name) {
        return &mut events[index];
    }
    events.push(EventDesc {
        name: name.to_string(),
        add: None,
        remove: None,
    });
    events.last_mut().unwrap()
}

/// Internal constructor used by [`TypeModel::instantiate`] for closed generic copies.
pub(crate) fn close_type(
    open: &TypeDesc,
    type_args: &[ValueType],
) -> Result<TypeDesc> {
    let token = Token::alloc(TokenKind::TypeDesc);
    let methods: Arc<boxcar::Vec<MethodDescRc>> = Arc::new(boxcar::Vec::new());
    for (_, method) in open.methods.iter() {
        methods.push(Arc::new(MethodBuilder::close(method, token, type_args)?));
    }
    let (properties, events) = group_accessors(&methods);

    let args_display: Vec<String> = type_args.iter().map(ValueType::display_name).collect();
    let name = format!("{}<{}>", open.name, args_display.join(","));

    Ok(TypeDesc {
        token,
        namespace: open.namespace.clone(),
        name,
        kind: open.kind,
        attributes: open.attributes,
        base: open.base,
        interfaces: open.interfaces.clone(),
        methods,
        properties,
        events,
        // both sides of the map refer to open members; closed classes re-derive it
        interface_map: open.interface_map.clone(),
        generic_params: open.generic_params.clone(),
        generic_source: Some((open.token, type_args.to_vec())),
        constructor: open.constructor.clone(),
    })
}
