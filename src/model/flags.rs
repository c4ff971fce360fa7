//! Attribute flags for type and method descriptors.
//!
//! Members of a descriptor carry [`MethodAttributes`] deciding whether they can be
//! intercepted (virtual, non-final) and whether they can be forwarded to directly
//! (public). Types carry [`TypeAttributes`] marking interfaces, abstract classes and
//! generated infrastructure.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Flags describing a method on a type descriptor
    pub struct MethodAttributes: u32 {
        /// Method is publicly accessible and can be forwarded to directly
        const PUBLIC = 0x0001;
        /// Method is virtual and can be overridden by a generated proxy
        const VIRTUAL = 0x0002;
        /// Method is final; it is visible but can no longer be overridden
        const FINAL = 0x0004;
        /// Method is abstract; there is no implementation on the declaring type
        const ABSTRACT = 0x0008;
        /// Method is proxy infrastructure and must never be proxied
        const INFRASTRUCTURE = 0x0010;
    }
}

impl MethodAttributes {
    /// Returns true when a class proxy can override this method.
    ///
    /// Interception through inheritance requires the method to be virtual and not
    /// sealed by a final modifier; infrastructure members are always excluded.
    #[must_use]
    pub fn is_overridable(&self) -> bool {
        self.contains(MethodAttributes::VIRTUAL)
            && !self.contains(MethodAttributes::FINAL)
            && !self.contains(MethodAttributes::INFRASTRUCTURE)
    }

    /// Returns true when the method can be invoked on a target without an
    /// indirection thunk.
    #[must_use]
    pub fn is_directly_accessible(&self) -> bool {
        self.contains(MethodAttributes::PUBLIC)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Flags describing a type descriptor
    pub struct TypeAttributes: u32 {
        /// Type is publicly visible
        const PUBLIC = 0x0001;
        /// Type is abstract and cannot be constructed directly
        const ABSTRACT = 0x0002;
        /// Type is sealed and cannot back a proxy through inheritance
        const SEALED = 0x0004;
    }
}

impl Default for MethodAttributes {
    fn default() -> Self {
        MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL
    }
}

impl Default for TypeAttributes {
    fn default() -> Self {
        TypeAttributes::PUBLIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overridable() {
        let v = MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL;
        assert!(v.is_overridable());
        assert!(!(v | MethodAttributes::FINAL).is_overridable());
        assert!(!(MethodAttributes::PUBLIC).is_overridable());
        assert!(!(v | MethodAttributes::INFRASTRUCTURE).is_overridable());
    }

    #[test]
    fn test_direct_accessibility() {
        assert!(MethodAttributes::default().is_directly_accessible());
        assert!(!MethodAttributes::VIRTUAL.is_directly_accessible());
    }
}
