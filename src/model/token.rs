//! Tokens identifying descriptors and generated runtime types.
//!
//! Every descriptor ([`crate::model::types::TypeDesc`], [`crate::model::types::MethodDesc`])
//! and every generated artifact (runtime proxy types, invocation carrier classes, delegate
//! shapes) is identified by a process-unique [`Token`]. Tokens are the currency of the whole
//! generation pipeline: cache keys, interface maps and method slots are all keyed by token,
//! never by name.
//!
//! # Token Layout
//!
//! A token is a 32-bit value where:
//! - The high byte (bits 24-31) is the [`TokenKind`] tag
//! - The low 24 bits (bits 0-23) are a monotonically allocated sequence number
//!
//! The kind tag makes a token self-describing: a generated proxy type can be told apart
//! from a user-declared descriptor by inspecting the token alone, which is how
//! "target is already a generated proxy" detection works without any reflection.
//!
//! # Thread Safety
//!
//! Allocation uses a single process-wide atomic counter; tokens handed out concurrently
//! are always distinct.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Tag stored in the high byte of a [`Token`], describing what the token identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// A user-declared type descriptor (interface, class or delegate shape)
    TypeDesc = 0x01,
    /// A method descriptor owned by a type descriptor
    MethodDesc = 0x06,
    /// A generated proxy runtime type
    GeneratedType = 0x70,
    /// A generated invocation carrier class
    InvocationClass = 0x71,
    /// A generated delegate shape used for indirect dispatch
    DelegateClass = 0x72,
}

impl TokenKind {
    /// Decodes a kind tag from the high byte of a raw token value.
    ///
    /// Returns `None` for byte values that are not a recognized tag.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<TokenKind> {
        match tag {
            0x01 => Some(TokenKind::TypeDesc),
            0x06 => Some(TokenKind::MethodDesc),
            0x70 => Some(TokenKind::GeneratedType),
            0x71 => Some(TokenKind::InvocationClass),
            0x72 => Some(TokenKind::DelegateClass),
            _ => None,
        }
    }
}

/// A token identifying a descriptor or generated artifact.
///
/// Tokens consist of a 32-bit value where the high byte indicates the kind of thing
/// identified and the low 24 bits are a process-unique sequence number. Two tokens are
/// equal exactly when they identify the same descriptor or generated type.
///
/// # Examples
///
/// ```rust
/// use proxyscope::model::token::{Token, TokenKind};
///
/// let token = Token::alloc(TokenKind::TypeDesc);
/// assert_eq!(token.kind(), Some(TokenKind::TypeDesc));
/// assert!(!token.is_null());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

/// Process-wide sequence counter shared by all token kinds. Row 0 is reserved as null.
static NEXT_ROW: AtomicU32 = AtomicU32::new(1);

impl Token {
    /// Creates a token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Allocates a fresh, process-unique token with the given kind tag.
    #[must_use]
    pub fn alloc(kind: TokenKind) -> Self {
        let row = NEXT_ROW.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;
        Token(((kind as u32) << 24) | row)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the kind tag from the token (high byte)
    #[must_use]
    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_tag((self.0 >> 24) as u8)
    }

    /// Extracts the sequence number from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this token identifies a generated artifact rather than a
    /// user-declared descriptor.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        matches!(
            self.kind(),
            Some(TokenKind::GeneratedType)
                | Some(TokenKind::InvocationClass)
                | Some(TokenKind::DelegateClass)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(0x{:08X})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_layout() {
        let token = Token::new(0x0100_0002);
        assert_eq!(token.kind(), Some(TokenKind::TypeDesc));
        assert_eq!(token.row(), 2);
        assert_eq!(token.value(), 0x0100_0002);
    }

    #[test]
    fn test_token_alloc_unique() {
        let a = Token::alloc(TokenKind::MethodDesc);
        let b = Token::alloc(TokenKind::MethodDesc);
        assert_ne!(a, b);
        assert_eq!(a.kind(), Some(TokenKind::MethodDesc));
    }

    #[test]
    fn test_token_generated_detection() {
        assert!(Token::alloc(TokenKind::GeneratedType).is_generated());
        assert!(Token::alloc(TokenKind::InvocationClass).is_generated());
        assert!(!Token::alloc(TokenKind::TypeDesc).is_generated());
    }

    #[test]
    fn test_token_null() {
        assert!(Token::new(0).is_null());
        assert!(!Token::alloc(TokenKind::TypeDesc).is_null());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token::new(0x0100_0001)), "0x01000001");
    }
}
