//! The class-building boundary between contributors and the runtime representation.
//!
//! A [`ClassEmitter`] is the only way generation code produces a runtime class.
//! Contributors and method generators call its define operations without knowing how
//! classes are represented; the emitter accumulates field layout and compiled bodies
//! and hands back the immutable [`RuntimeType`](crate::runtime::class::RuntimeType) on
//! `finalize`. Defining the same field or method twice is an internal violation, which
//! is how duplicate interface claims surface as hard errors instead of silently
//! overwriting each other's members.

use std::sync::Arc;

use crate::generation::naming::NamingScope;
use crate::model::token::Token;
use crate::model::types::{CtorFn, TypeDescRc};
use crate::runtime::class::{FieldKind, MethodBody, RuntimeType, RuntimeTypeBuilder, RuntimeTypeRc};
use crate::Result;

/// Accumulates one generated class.
pub struct ClassEmitter {
    builder: RuntimeTypeBuilder,
    name: String,
    naming: Arc<NamingScope>,
}

impl ClassEmitter {
    /// Opens an emitter for a class with the given suggested name.
    ///
    /// The name is made unique within the naming scope before use.
    #[must_use]
    pub fn new(suggested_name: &str, naming: &Arc<NamingScope>) -> Self {
        let name = naming.get_unique_name(suggested_name);
        ClassEmitter {
            builder: RuntimeType::builder(&name),
            name,
            naming: naming.safe_sub_scope(),
        }
    }

    /// Token the finished class will carry.
    #[must_use]
    pub fn type_token(&self) -> Token {
        self.builder.token()
    }

    /// Final unique name of the class under construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Naming scope for members of this class.
    #[must_use]
    pub fn member_naming(&self) -> &Arc<NamingScope> {
        &self.naming
    }

    /// Declares an instance field.
    ///
    /// # Errors
    ///
    /// Internal violation when the field name is already declared.
    pub fn define_field(&mut self, name: &str, kind: FieldKind) -> Result<()> {
        if self.builder.has_field(name) {
            return Err(violation_error!(
                "field '{}' defined twice on '{}'",
                name,
                self.name
            ));
        }
        self.builder.field(name.to_string(), kind);
        Ok(())
    }

    /// Registers a compiled body under a method token.
    ///
    /// # Errors
    ///
    /// Internal violation when the token already has a body; two contributors claiming
    /// the same member is a bug in contributor ordering, not a recoverable condition.
    pub fn define_method(&mut self, token: Token, body: MethodBody) -> Result<()> {
        if !self.builder.method(token, body) {
            return Err(violation_error!(
                "method {} defined twice on '{}'",
                token,
                self.name
            ));
        }
        Ok(())
    }

    /// Registers `alias` as an additional dispatch token for the body already defined
    /// under `of`. Class proxies use this to serve interface-identity calls with the
    /// implementing class member's body.
    ///
    /// # Errors
    ///
    /// Internal violation when `of` has no body yet, or `alias` is already taken.
    pub fn define_alias(&mut self, alias: Token, of: Token) -> Result<()> {
        let body = self
            .builder
            .body_of(of)
            .cloned()
            .ok_or_else(|| {
                violation_error!("alias {} targets undefined method {}", alias, of)
            })?;
        self.define_method(alias, body)
    }

    /// Records the base-class constructor for subclass-style proxies.
    pub fn define_constructor(&mut self, ctor: CtorFn) {
        self.builder.base_constructor(ctor);
    }

    /// Copies the contract's generic parameter names, making the class an open
    /// definition.
    pub fn copy_generic_parameters_from(&mut self, contract: &TypeDescRc) {
        self.builder.generic_params(contract.generic_params());
    }

    /// Attaches the primary proxied contract and finalizes into an immutable shared
    /// class.
    #[must_use]
    pub fn finalize(self, contract: Option<TypeDescRc>) -> RuntimeTypeRc {
        match contract {
            Some(contract) => self.builder.contract(contract).finish(),
            None => self.builder.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::token::TokenKind;
    use crate::model::value::Value;

    #[test]
    fn test_duplicate_field_rejected() {
        let naming = NamingScope::new();
        let mut emitter = ClassEmitter::new("proxyscope.test.DupField", &naming);
        emitter.define_field("__target", FieldKind::Target).unwrap();
        assert!(emitter.define_field("__target", FieldKind::Target).is_err());
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let naming = NamingScope::new();
        let mut emitter = ClassEmitter::new("proxyscope.test.DupMethod", &naming);
        let token = Token::alloc(TokenKind::MethodDesc);
        let body: MethodBody = Arc::new(|_, _, _| Ok(Value::Unit));
        emitter.define_method(token, body.clone()).unwrap();
        assert!(emitter.define_method(token, body).is_err());
    }

    #[test]
    fn test_name_collisions_get_suffixed() {
        let naming = NamingScope::new();
        let first = ClassEmitter::new("proxyscope.test.Same", &naming);
        let second = ClassEmitter::new("proxyscope.test.Same", &naming);
        assert_eq!(first.name(), "proxyscope.test.Same");
        assert_ne!(first.name(), second.name());
    }
}
