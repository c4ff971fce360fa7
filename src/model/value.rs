//! Dynamic values and value types flowing through proxied calls.
//!
//! Proxied methods are invoked with a boxed argument array of [`Value`]s; parameter and
//! return shapes are described by [`ValueType`]. This is the crate's replacement for a
//! managed runtime's `object[]` argument boxing: every interceptor sees (and may rewrite)
//! the same dynamic representation, and invocation carriers unbox values back to their
//! exact parameter types before invoking the real implementation.
//!
//! # Key Components
//!
//! - [`Value`] - A single boxed argument or return value
//! - [`ValueType`] - The declared shape of a parameter, return or generic argument
//!
//! # Generic Parameters
//!
//! [`ValueType::TypeGeneric`] and [`ValueType::MethodGeneric`] are open positions,
//! referring to the declaring type's or method's generic parameter list by index. They
//! are resolved against concrete type arguments when a generic type is closed or when a
//! generic method invocation carries its runtime type arguments.
//!
//! # Examples
//!
//! ```rust
//! use proxyscope::model::value::{Value, ValueType};
//!
//! let arg = Value::Int32(42);
//! assert!(ValueType::Int32.matches(&arg));
//! assert_eq!(arg.as_i32().unwrap(), 42);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::model::dispatch::DynObject;
use crate::model::token::Token;
use crate::{Error, Result};

/// The declared shape of a parameter, return value or generic argument.
///
/// Closed variants describe concrete shapes; [`ValueType::TypeGeneric`] and
/// [`ValueType::MethodGeneric`] are open positions resolved at instantiation or
/// invocation time. `Object` may carry an optional nominal constraint token; value
/// matching is kind-level, the token is contract documentation used when closing
/// generics and building cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value (a `void` return)
    Unit,
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// Owned string
    Str,
    /// A dynamic object handle, optionally constrained to a declared type
    Object(Option<Token>),
    /// Any opaque value; no unboxing is attempted
    Any,
    /// Open position referring to the declaring type's generic parameter list
    TypeGeneric(usize),
    /// Open position referring to the method's generic parameter list
    MethodGeneric(usize),
}

impl ValueType {
    /// Returns true when this type contains no open generic positions.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !matches!(self, ValueType::TypeGeneric(_) | ValueType::MethodGeneric(_))
    }

    /// Resolves open generic positions against concrete argument lists.
    ///
    /// `type_args` close [`ValueType::TypeGeneric`] positions, `method_args` close
    /// [`ValueType::MethodGeneric`] positions. Closed types resolve to themselves.
    ///
    /// # Errors
    ///
    /// [`Error::GenericArgumentCount`] when an open position refers past the end of
    /// the supplied argument list.
    pub fn resolve(&self, type_args: &[ValueType], method_args: &[ValueType]) -> Result<ValueType> {
        match self {
            ValueType::TypeGeneric(index) => {
                type_args.get(*index).cloned().ok_or(Error::GenericArgumentCount {
                    expected: index + 1,
                    actual: type_args.len(),
                })
            }
            ValueType::MethodGeneric(index) => {
                method_args.get(*index).cloned().ok_or(Error::GenericArgumentCount {
                    expected: index + 1,
                    actual: method_args.len(),
                })
            }
            other => Ok(other.clone()),
        }
    }

    /// Kind-level check that a value fits this (closed) type.
    ///
    /// Open generic positions never match; resolve them first.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Unit, Value::Unit)
            | (ValueType::Bool, Value::Bool(_))
            | (ValueType::Int32, Value::Int32(_))
            | (ValueType::Int64, Value::Int64(_))
            | (ValueType::Float64, Value::Float64(_))
            | (ValueType::Str, Value::Str(_))
            | (ValueType::Object(_), Value::Object(_)) => true,
            (ValueType::Any, _) => true,
            _ => false,
        }
    }

    /// Short display name used in samples and error messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            ValueType::Unit => "Unit".to_string(),
            ValueType::Bool => "Bool".to_string(),
            ValueType::Int32 => "Int32".to_string(),
            ValueType::Int64 => "Int64".to_string(),
            ValueType::Float64 => "Float64".to_string(),
            ValueType::Str => "Str".to_string(),
            ValueType::Object(None) => "Object".to_string(),
            ValueType::Object(Some(token)) => format!("Object({token})"),
            ValueType::Any => "Any".to_string(),
            ValueType::TypeGeneric(index) => format!("T{index}"),
            ValueType::MethodGeneric(index) => format!("M{index}"),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single boxed argument or return value.
///
/// Values travel through the interceptor chain by position in the invocation's argument
/// array; interceptors may read and replace them. Object handles are shared
/// ([`DynObject`] is an `Arc`), so replacing an argument never clones user state.
#[derive(Clone)]
pub enum Value {
    /// No value
    Unit,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit float
    Float64(f64),
    /// Owned string
    Str(String),
    /// A dynamic object handle
    Object(DynObject),
    /// Any opaque shared value
    Any(Arc<dyn std::any::Any + Send + Sync>),
}

impl Value {
    /// Short kind name used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Float64(_) => "Float64",
            Value::Str(_) => "Str",
            Value::Object(_) => "Object",
            Value::Any(_) => "Any",
        }
    }

    /// Unboxes a boolean.
    ///
    /// # Errors
    /// [`Error::ArgumentType`] when the value is not a `Bool`.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(value) => Ok(*value),
            other => Err(other.type_error("Bool")),
        }
    }

    /// Unboxes a 32-bit integer.
    ///
    /// # Errors
    /// [`Error::ArgumentType`] when the value is not an `Int32`.
    pub fn as_i32(&self) -> Result<i32> {
        match self {
            Value::Int32(value) => Ok(*value),
            other => Err(other.type_error("Int32")),
        }
    }

    /// Unboxes a 64-bit integer.
    ///
    /// # Errors
    /// [`Error::ArgumentType`] when the value is not an `Int64`.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int64(value) => Ok(*value),
            other => Err(other.type_error("Int64")),
        }
    }

    /// Unboxes a 64-bit float.
    ///
    /// # Errors
    /// [`Error::ArgumentType`] when the value is not a `Float64`.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Float64(value) => Ok(*value),
            other => Err(other.type_error("Float64")),
        }
    }

    /// Borrows the string content.
    ///
    /// # Errors
    /// [`Error::ArgumentType`] when the value is not a `Str`.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(value) => Ok(value),
            other => Err(other.type_error("Str")),
        }
    }

    /// Borrows the object handle.
    ///
    /// # Errors
    /// [`Error::ArgumentType`] when the value is not an `Object`.
    pub fn as_object(&self) -> Result<&DynObject> {
        match self {
            Value::Object(value) => Ok(value),
            other => Err(other.type_error("Object")),
        }
    }

    fn type_error(&self, expected: &str) -> Error {
        Error::ArgumentType {
            index: 0,
            expected: expected.to_string(),
            actual: self.kind_name().to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Bool(value) => write!(f, "Bool({value})"),
            Value::Int32(value) => write!(f, "Int32({value})"),
            Value::Int64(value) => write!(f, "Int64({value})"),
            Value::Float64(value) => write!(f, "Float64({value})"),
            Value::Str(value) => write!(f, "Str({value:?})"),
            Value::Object(object) => write!(f, "Object({})", object.type_token()),
            Value::Any(_) => write!(f, "Any(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Any(a), Value::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matching() {
        assert!(ValueType::Int32.matches(&Value::Int32(1)));
        assert!(!ValueType::Int32.matches(&Value::Int64(1)));
        assert!(ValueType::Any.matches(&Value::Str("x".into())));
        assert!(!ValueType::MethodGeneric(0).matches(&Value::Int32(1)));
    }

    #[test]
    fn test_generic_resolution() {
        let open = ValueType::MethodGeneric(0);
        let closed = open.resolve(&[], &[ValueType::Str]).unwrap();
        assert_eq!(closed, ValueType::Str);

        let out_of_range = open.resolve(&[], &[]);
        assert!(matches!(out_of_range, Err(Error::GenericArgumentCount { .. })));
    }

    #[test]
    fn test_type_generic_resolution() {
        let open = ValueType::TypeGeneric(1);
        let closed = open.resolve(&[ValueType::Int32, ValueType::Bool], &[]).unwrap();
        assert_eq!(closed, ValueType::Bool);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int32(20).as_i32().unwrap(), 20);
        assert_eq!(Value::Str("abc".into()).as_str().unwrap(), "abc");
        assert!(Value::Int32(20).as_str().is_err());
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Int32(45), Value::Int32(45));
        assert_ne!(Value::Int32(45), Value::Int64(45));
    }
}
