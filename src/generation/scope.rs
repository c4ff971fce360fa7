//! Generation-scope cache for generated runtime classes.
//!
//! A [`ModuleScope`] owns every class the engine generates: top-level proxy types,
//! invocation carrier classes and delegate shapes. Each is keyed by a structural
//! [`CacheKey`]; two generation requests with equal keys observe the same generated
//! class, and registering a second distinct class under an existing key is an internal
//! violation rather than a silent overwrite.
//!
//! # Concurrency
//!
//! Top-level proxy generation serializes its check-generate-register sequence under a
//! coarse mutex: generation is rare, lookups are the hot path and go through the
//! lock-free map first. Carrier and delegate generation runs *inside* a top-level
//! generation and therefore must not take that same mutex; those caches rely on the
//! sharded map's entry API for their once-only guarantee instead.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use strum::Display;

use crate::generation::generators::delegates::DelegateClassRc;
use crate::generation::generators::invocation::{InvocationClassRc, InvocationKind};
use crate::generation::naming::NamingScope;
use crate::model::token::Token;
use crate::model::value::ValueType;
use crate::runtime::class::RuntimeTypeRc;
use crate::Result;

/// The five supported proxy shapes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// Subclass-style proxy of a class, no separate target
    Class,
    /// Subclass-style proxy of a class forwarding to a held instance of it
    ClassWithTarget,
    /// Interface proxy forwarding to a fixed target
    InterfaceWithTarget,
    /// Interface proxy whose target may be absent or replaced mid-call
    InterfaceWithTargetInterface,
    /// Interface proxy with no target; interceptors supply all behavior
    InterfaceWithoutTarget,
}

/// What family of generated class a key identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKeyKind {
    /// Top-level proxy type
    Proxy(ProxyKind),
    /// Invocation carrier class
    Invocation(InvocationKind),
    /// Delegate shape for indirect dispatch
    Delegate,
}

/// Structural identity of a generated class.
///
/// Covers everything that influences the generated class's shape: the kind of class,
/// the primary type (proxied class or interface, or the carrier's declaring type), the
/// ordered secondary types (additional interfaces, or the carrier's method) and the
/// digest of the generation options. Options that differ only in interceptor
/// *instances* hash identically, so behaviorally-identical requests share one class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: CacheKeyKind,
    primary: Token,
    target: Option<Token>,
    secondary: Vec<Token>,
    digest: [u8; 20],
}

impl CacheKey {
    /// Key for a top-level proxy type.
    ///
    /// `target` is the described class of the target instance on proxy shapes whose
    /// generated members depend on it (its interface map shapes the dispatch).
    #[must_use]
    pub fn proxy(
        kind: ProxyKind,
        primary: Token,
        target: Option<Token>,
        additional: &[Token],
        options_digest: [u8; 20],
    ) -> Self {
        let mut secondary = additional.to_vec();
        secondary.sort_unstable_by_key(|t| t.value());
        secondary.dedup();
        CacheKey {
            kind: CacheKeyKind::Proxy(kind),
            primary,
            target,
            secondary,
            digest: options_digest,
        }
    }

    /// Key for an invocation carrier class.
    #[must_use]
    pub fn invocation(kind: InvocationKind, declaring_type: Token, method: Token) -> Self {
        CacheKey {
            kind: CacheKeyKind::Invocation(kind),
            primary: declaring_type,
            target: None,
            secondary: vec![method],
            digest: [0; 20],
        }
    }

    /// Key for a delegate shape.
    #[must_use]
    pub fn delegate(declaring_type: Token, method: Token) -> Self {
        CacheKey {
            kind: CacheKeyKind::Delegate,
            primary: declaring_type,
            target: None,
            secondary: vec![method],
            digest: [0; 20],
        }
    }

    /// The family of generated class this key identifies.
    #[must_use]
    pub fn kind(&self) -> CacheKeyKind {
        self.kind
    }

    /// The primary type token.
    #[must_use]
    pub fn primary(&self) -> Token {
        self.primary
    }
}

/// Owner of all generated classes and their naming scope.
pub struct ModuleScope {
    types: DashMap<CacheKey, RuntimeTypeRc>,
    invocations: DashMap<CacheKey, InvocationClassRc>,
    delegates: DashMap<CacheKey, DelegateClassRc>,
    closed: DashMap<(Token, Vec<ValueType>), RuntimeTypeRc>,
    lock: Mutex<()>,
    naming: Arc<NamingScope>,
}

impl ModuleScope {
    /// Creates an empty scope with a fresh root naming scope.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(ModuleScope {
            types: DashMap::new(),
            invocations: DashMap::new(),
            delegates: DashMap::new(),
            closed: DashMap::new(),
            lock: Mutex::new(()),
            naming: NamingScope::new(),
        })
    }

    /// The root naming scope all generated names are drawn from.
    #[must_use]
    pub fn naming(&self) -> &Arc<NamingScope> {
        &self.naming
    }

    /// Lock-free cache probe for a top-level proxy type.
    #[must_use]
    pub fn get_from_cache(&self, key: &CacheKey) -> Option<RuntimeTypeRc> {
        self.types.get(key).map(|entry| entry.value().clone())
    }

    /// Registers a generated proxy type under its key.
    ///
    /// # Errors
    ///
    /// Internal violation when a *different* class is already registered under the
    /// key. Re-registering the identical class is a no-op.
    pub fn register_in_cache(&self, key: CacheKey, class: RuntimeTypeRc) -> Result<()> {
        if let Some(existing) = self.types.get(&key) {
            if Arc::ptr_eq(existing.value(), &class) {
                return Ok(());
            }
            return Err(violation_error!(
                "conflicting proxy class registration for key {:?}",
                key
            ));
        }
        self.types.insert(key, class);
        Ok(())
    }

    /// Returns the cached proxy type for `key`, generating it under the scope lock on
    /// a miss.
    ///
    /// The full check-generate-register sequence holds one mutex, so concurrent
    /// first requests for the same key produce exactly one class. `generate` must not
    /// re-enter top-level generation.
    ///
    /// # Errors
    ///
    /// Propagates generation failures; nothing is registered on failure.
    pub fn obtain<F>(&self, key: CacheKey, generate: F) -> Result<RuntimeTypeRc>
    where
        F: FnOnce() -> Result<RuntimeTypeRc>,
    {
        if let Some(found) = self.get_from_cache(&key) {
            return Ok(found);
        }

        let _guard = lock!(self.lock);
        if let Some(found) = self.get_from_cache(&key) {
            return Ok(found);
        }
        let class = generate()?;
        self.register_in_cache(key, class.clone())?;
        Ok(class)
    }

    /// Returns the cached invocation carrier for `key`, generating it on a miss.
    ///
    /// Runs inside top-level generation, so the once-only guarantee comes from the
    /// map's entry API instead of the scope lock.
    ///
    /// # Errors
    ///
    /// Propagates generation failures.
    pub fn obtain_invocation<F>(&self, key: CacheKey, generate: F) -> Result<InvocationClassRc>
    where
        F: FnOnce() -> Result<InvocationClassRc>,
    {
        if let Some(found) = self.invocations.get(&key) {
            return Ok(found.value().clone());
        }
        let entry = self.invocations.entry(key);
        match entry {
            dashmap::Entry::Occupied(occupied) => Ok(occupied.get().clone()),
            dashmap::Entry::Vacant(vacant) => {
                let class = generate()?;
                vacant.insert(class.clone());
                Ok(class)
            }
        }
    }

    /// Returns the cached delegate shape for `key`, generating it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates generation failures.
    pub fn obtain_delegate<F>(&self, key: CacheKey, generate: F) -> Result<DelegateClassRc>
    where
        F: FnOnce() -> Result<DelegateClassRc>,
    {
        if let Some(found) = self.delegates.get(&key) {
            return Ok(found.value().clone());
        }
        match self.delegates.entry(key) {
            dashmap::Entry::Occupied(occupied) => Ok(occupied.get().clone()),
            dashmap::Entry::Vacant(vacant) => {
                let class = generate()?;
                vacant.insert(class.clone());
                Ok(class)
            }
        }
    }

    /// Returns the closed instantiation of an open-generic proxy definition,
    /// producing and caching it on first request.
    ///
    /// # Errors
    ///
    /// Propagates instantiation failures.
    pub fn obtain_closed<F>(
        &self,
        definition: Token,
        type_args: Vec<ValueType>,
        close: F,
    ) -> Result<RuntimeTypeRc>
    where
        F: FnOnce() -> Result<RuntimeTypeRc>,
    {
        let key = (definition, type_args);
        if let Some(found) = self.closed.get(&key) {
            return Ok(found.value().clone());
        }
        match self.closed.entry(key) {
            dashmap::Entry::Occupied(occupied) => Ok(occupied.get().clone()),
            dashmap::Entry::Vacant(vacant) => {
                let class = close()?;
                vacant.insert(class.clone());
                Ok(class)
            }
        }
    }

    /// Number of cached top-level proxy types.
    #[must_use]
    pub fn generated_type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of cached invocation carrier classes.
    #[must_use]
    pub fn invocation_class_count(&self) -> usize {
        self.invocations.len()
    }

    /// Number of cached delegate shapes.
    #[must_use]
    pub fn delegate_class_count(&self) -> usize {
        self.delegates.len()
    }
}

impl std::fmt::Debug for ModuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleScope")
            .field("types", &self.types.len())
            .field("invocations", &self.invocations.len())
            .field("delegates", &self.delegates.len())
            .finish_non_exhaustive()
    }
}
