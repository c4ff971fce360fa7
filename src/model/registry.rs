//! Central descriptor registry for proxy generation.
//!
//! This module provides the [`TypeModel`], a thread-safe registry holding every type
//! descriptor the generation pipeline can see. It is the resolution hub for interface
//! closures (the transitive set of interfaces a contract implies), name lookup and
//! open-generic instantiation.
//!
//! # Registry Architecture
//!
//! The model uses a multi-index approach:
//!
//! - **Token-based lookup**: primary index, lock-free (`SkipMap`)
//! - **Name-based lookup**: secondary index on full names (`DashMap`)
//! - **Instantiation cache**: closed generic descriptors keyed by
//!   (open definition token, argument list) (`DashMap`)
//!
//! # Thread Safety
//!
//! All indices are concurrent structures; registration and lookup never block each
//! other. Instantiating the same open generic with the same arguments from two threads
//! lands on one cached closed descriptor.
//!
//! # Examples
//!
//! ```rust,no_run
//! use proxyscope::model::registry::TypeModel;
//! use proxyscope::model::types::TypeDesc;
//! use proxyscope::model::value::ValueType;
//!
//! let model = TypeModel::new();
//! let open = TypeDesc::interface("Demo", "IEmpty")
//!     .generic_params(&["T"])
//!     .build(&model)?;
//!
//! let of_str = model.instantiate(open.token(), &[ValueType::Str])?;
//! let again = model.instantiate(open.token(), &[ValueType::Str])?;
//! assert_eq!(of_str.token(), again.token());
//! # Ok::<(), proxyscope::Error>(())
//! ```

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::model::token::Token;
use crate::model::types::{close_type, TypeDescRc, TypeKind};
use crate::model::value::ValueType;
use crate::{Error, Result};

/// Central, process-wide registry of type descriptors.
///
/// Every descriptor built through [`crate::model::types::TypeBuilder::build`] registers
/// itself here; the generation pipeline resolves all tokens against one model instance.
pub struct TypeModel {
    /// Primary token index
    types: SkipMap<Token, TypeDescRc>,
    /// Secondary full-name index
    by_name: DashMap<String, Token>,
    /// Closed generic descriptors keyed by (open definition, argument list)
    instantiations: DashMap<(Token, Vec<ValueType>), TypeDescRc>,
}

impl TypeModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Arc<TypeModel> {
        Arc::new(TypeModel {
            types: SkipMap::new(),
            by_name: DashMap::new(),
            instantiations: DashMap::new(),
        })
    }

    /// Registers a descriptor in all indices.
    pub fn insert(&self, desc: &TypeDescRc) {
        self.types.insert(desc.token(), desc.clone());
        self.by_name.insert(desc.full_name(), desc.token());
    }

    /// Looks up a descriptor by token.
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<TypeDescRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Looks up a descriptor by token, failing with [`Error::TypeNotFound`].
    pub fn resolve(&self, token: Token) -> Result<TypeDescRc> {
        self.get(&token).ok_or(Error::TypeNotFound(token))
    }

    /// Looks up a descriptor by namespace-qualified name.
    #[must_use]
    pub fn get_by_fullname(&self, full_name: &str) -> Option<TypeDescRc> {
        let token = *self.by_name.get(full_name)?;
        self.get(&token)
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true when no descriptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Computes the transitive interface closure of a set of interface tokens.
    ///
    /// The result preserves first-seen order and contains each interface exactly once,
    /// which keeps cache keys stable across structurally equal requests.
    ///
    /// # Errors
    ///
    /// [`Error::TypeNotFound`] when a token in the closure is not registered.
    pub fn interface_closure(&self, interfaces: &[Token]) -> Result<Vec<Token>> {
        let mut seen: Vec<Token> = Vec::new();
        let mut pending: Vec<Token> = interfaces.to_vec();
        while let Some(token) = pending.pop() {
            if seen.contains(&token) {
                continue;
            }
            let desc = self.resolve(token)?;
            seen.push(token);
            pending.extend(desc.interfaces().iter().copied());
        }
        Ok(seen)
    }

    /// Computes all interfaces a class implements, transitively, walking the base chain.
    ///
    /// # Errors
    ///
    /// [`Error::TypeNotFound`] when a referenced descriptor is not registered.
    pub fn class_interfaces(&self, class: &Token) -> Result<Vec<Token>> {
        let mut direct: Vec<Token> = Vec::new();
        let mut current = Some(*class);
        while let Some(token) = current {
            let desc = self.resolve(token)?;
            direct.extend(desc.interfaces().iter().copied());
            current = desc.base();
        }
        self.interface_closure(&direct)
    }

    /// Instantiates an open generic definition with a full set of closed arguments.
    ///
    /// The closed descriptor is cached keyed by (definition token, argument list); two
    /// requests with equal arguments return the identical descriptor. This mirrors the
    /// identity guarantee generated proxy types give for closed generic proxies.
    ///
    /// # Errors
    ///
    /// - [`Error::OpenGenericExpected`] when the token is not an open generic definition
    /// - [`Error::PartialGenericArguments`] when the argument count does not match the
    ///   definition's arity or any argument is itself open
    pub fn instantiate(&self, open: Token, type_args: &[ValueType]) -> Result<TypeDescRc> {
        let definition = self.resolve(open)?;
        if !definition.is_open_generic() {
            return Err(Error::OpenGenericExpected {
                type_name: definition.full_name(),
            });
        }
        if type_args.len() != definition.generic_params().len()
            || type_args.iter().any(|a| !a.is_closed())
        {
            return Err(Error::PartialGenericArguments {
                type_name: definition.full_name(),
                expected: definition.generic_params().len(),
                actual: type_args.len(),
            });
        }

        let key = (open, type_args.to_vec());
        if let Some(existing) = self.instantiations.get(&key) {
            return Ok(existing.clone());
        }

        // entry() holds the shard lock while building, serializing same-key races
        let entry = self.instantiations.entry(key);
        match entry {
            dashmap::mapref::entry::Entry::Occupied(occupied) => Ok(occupied.get().clone()),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let closed = Arc::new(close_type(&definition, type_args)?);
                self.types.insert(closed.token(), closed.clone());
                self.by_name.insert(closed.full_name(), closed.token());
                vacant.insert(closed.clone());
                Ok(closed)
            }
        }
    }

    /// Returns true when the token refers to a registered interface descriptor.
    #[must_use]
    pub fn is_interface(&self, token: &Token) -> bool {
        self.get(token).is_some_and(|d| d.kind() == TypeKind::Interface)
    }
}

impl Default for TypeModel {
    fn default() -> Self {
        TypeModel {
            types: SkipMap::new(),
            by_name: DashMap::new(),
            instantiations: DashMap::new(),
        }
    }
}
