//! Immutable runtime classes produced by the emitter.
//!
//! A [`RuntimeType`] is the finalized output of one generation run: a name, a field
//! layout, and a method table mapping descriptor tokens to compiled bodies. Once
//! finalized it never changes, so handles to it are shared freely across threads and
//! cached indefinitely.
//!
//! Open generic proxy definitions are themselves runtime classes; closing one produces
//! a new class sharing the definition's method bodies, with the closed contract's
//! method tokens aliased onto them and the concrete type arguments recorded so bodies
//! can stamp them onto each invocation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::token::{Token, TokenKind};
use crate::model::types::{CtorFn, TypeDescRc};
use crate::model::value::{Value, ValueType};
use crate::runtime::object::ProxyObject;
use crate::Result;

/// Reference-counted handle to a finalized runtime class.
pub type RuntimeTypeRc = Arc<RuntimeType>;

/// A compiled method body.
///
/// Receives the owning proxy instance, the call's runtime generic arguments and the
/// mutable boxed argument array; yields the boxed return value.
pub type MethodBody =
    Arc<dyn Fn(&ProxyObject, &[ValueType], &mut [Value]) -> Result<Value> + Send + Sync>;

/// What an instance field of a generated class holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// The proxy target slot (absent or replaceable on some proxy shapes)
    Target,
    /// A mixin instance, identified by its position in the construction arguments
    Mixin(usize),
    /// The instance-wide interceptor chain
    Interceptors,
    /// The optional interceptor selector
    Selector,
    /// Per-method memo of the selector's interceptor choice
    MethodInterceptors,
}

/// One declared instance field of a generated class.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name, unique within the class
    pub name: String,
    /// What the field holds
    pub kind: FieldKind,
}

/// A finalized generated class: field layout plus method dispatch table.
pub struct RuntimeType {
    token: Token,
    name: String,
    contract: Option<TypeDescRc>,
    fields: Vec<FieldDef>,
    methods: HashMap<Token, MethodBody>,
    base_constructor: Option<CtorFn>,
    generic_params: Vec<String>,
    generic_source: Option<Token>,
    type_arguments: Vec<ValueType>,
}

impl RuntimeType {
    /// Starts building a runtime class with a fresh generated-type token.
    #[must_use]
    pub fn builder(name: &str) -> RuntimeTypeBuilder {
        RuntimeTypeBuilder {
            token: Token::alloc(TokenKind::GeneratedType),
            name: name.to_string(),
            contract: None,
            fields: Vec::new(),
            methods: HashMap::new(),
            base_constructor: None,
            generic_params: Vec::new(),
        }
    }

    /// Token identifying this generated class.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Synthesized name of the class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primary proxied contract this class was generated for, when one exists.
    #[must_use]
    pub fn contract(&self) -> Option<&TypeDescRc> {
        self.contract.as_ref()
    }

    /// Declared instance fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up the compiled body registered under a method token.
    #[must_use]
    pub fn method_body(&self, token: Token) -> Option<&MethodBody> {
        self.methods.get(&token)
    }

    /// Constructor of the proxied base class, present on subclass-style proxies.
    #[must_use]
    pub fn base_constructor(&self) -> Option<&CtorFn> {
        self.base_constructor.as_ref()
    }

    /// `true` when this class is an open generic proxy definition.
    #[must_use]
    pub fn is_open_generic(&self) -> bool {
        !self.generic_params.is_empty() && self.type_arguments.is_empty()
    }

    /// Generic parameter names of an open definition.
    #[must_use]
    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    /// Token of the open definition this class was closed from, if any.
    #[must_use]
    pub fn generic_source(&self) -> Option<Token> {
        self.generic_source
    }

    /// Concrete type arguments of a closed generic proxy class; empty otherwise.
    #[must_use]
    pub fn type_arguments(&self) -> &[ValueType] {
        &self.type_arguments
    }

    /// Closes an open generic definition with concrete type arguments.
    ///
    /// Shares the definition's method bodies. `method_aliases` pairs each closed
    /// contract method token with the definition method token whose body serves it;
    /// lookups through the definition tokens keep working on the closed class.
    #[must_use]
    pub fn close(
        self: &Arc<Self>,
        name: String,
        contract: Option<TypeDescRc>,
        type_arguments: Vec<ValueType>,
        method_aliases: &[(Token, Token)],
    ) -> RuntimeTypeRc {
        let mut methods = self.methods.clone();
        for (closed, open) in method_aliases {
            if let Some(body) = self.methods.get(open) {
                methods.insert(*closed, body.clone());
            }
        }
        Arc::new(RuntimeType {
            token: Token::alloc(TokenKind::GeneratedType),
            name,
            contract,
            fields: self.fields.clone(),
            methods,
            base_constructor: self.base_constructor.clone(),
            generic_params: self.generic_params.clone(),
            generic_source: Some(self.token),
            type_arguments,
        })
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeType")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

/// Builder accumulating a runtime class; consumed by `finish`.
pub struct RuntimeTypeBuilder {
    token: Token,
    name: String,
    contract: Option<TypeDescRc>,
    fields: Vec<FieldDef>,
    methods: HashMap<Token, MethodBody>,
    base_constructor: Option<CtorFn>,
    generic_params: Vec<String>,
}

impl RuntimeTypeBuilder {
    /// Token the finished class will carry.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Attaches the primary proxied contract.
    #[must_use]
    pub fn contract(mut self, contract: TypeDescRc) -> Self {
        self.contract = Some(contract);
        self
    }

    /// The compiled body registered under a token, if any.
    #[must_use]
    pub fn body_of(&self, token: Token) -> Option<&MethodBody> {
        self.methods.get(&token)
    }

    /// Declares an instance field.
    pub fn field(&mut self, name: String, kind: FieldKind) {
        self.fields.push(FieldDef { name, kind });
    }

    /// `true` when a field with this name is already declared.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Registers a compiled body under a method token.
    ///
    /// `true` when the token was not yet taken.
    pub fn method(&mut self, token: Token, body: MethodBody) -> bool {
        if self.methods.contains_key(&token) {
            return false;
        }
        self.methods.insert(token, body);
        true
    }

    /// Records the base-class constructor for subclass-style proxies.
    pub fn base_constructor(&mut self, ctor: CtorFn) {
        self.base_constructor = Some(ctor);
    }

    /// Copies generic parameter names from the proxied contract, making the finished
    /// class an open definition.
    pub fn generic_params(&mut self, names: &[String]) {
        self.generic_params = names.to_vec();
    }

    /// Finalizes into an immutable shared class.
    #[must_use]
    pub fn finish(self) -> RuntimeTypeRc {
        Arc::new(RuntimeType {
            token: self.token,
            name: self.name,
            contract: self.contract,
            fields: self.fields,
            methods: self.methods,
            base_constructor: self.base_constructor,
            generic_params: self.generic_params,
            generic_source: None,
            type_arguments: Vec::new(),
        })
    }
}
