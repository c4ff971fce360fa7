//! Hierarchical generation of collision-free synthetic identifiers.
//!
//! Every generation request names its synthetic artifacts (generated types, fields,
//! per-method interceptor caches) through a [`NamingScope`]. A scope guarantees that no
//! name it returns was previously returned by itself or any ancestor scope; nested
//! generations (a proxy generation spawning carrier generations) take a sub-scope so
//! their names stay unique relative to the whole request.
//!
//! # Failure Mode
//!
//! None. When a suggested name collides, a monotonic counter suffix is appended until a
//! free name is found; `get_unique_name` always succeeds.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Scoped generator of collision-free synthetic identifiers.
///
/// # Thread Safety
///
/// Internally synchronized; scopes are shared as `Arc`s between the generation
/// pipeline's stages.
///
/// # Examples
///
/// ```rust
/// use proxyscope::generation::naming::NamingScope;
///
/// let scope = NamingScope::new();
/// let first = scope.get_unique_name("Proxy");
/// let second = scope.get_unique_name("Proxy");
/// assert_eq!(first, "Proxy");
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Default)]
pub struct NamingScope {
    parent: Option<Arc<NamingScope>>,
    names: Mutex<HashSet<String>>,
}

impl NamingScope {
    /// Creates a root scope.
    #[must_use]
    pub fn new() -> Arc<NamingScope> {
        Arc::new(NamingScope {
            parent: None,
            names: Mutex::new(HashSet::new()),
        })
    }

    /// Creates a child scope inheriting this scope's uniqueness guarantee.
    ///
    /// Names taken by any ancestor are off-limits in the child; names taken in the
    /// child do not leak back into the parent.
    #[must_use]
    pub fn safe_sub_scope(self: &Arc<Self>) -> Arc<NamingScope> {
        Arc::new(NamingScope {
            parent: Some(self.clone()),
            names: Mutex::new(HashSet::new()),
        })
    }

    /// Returns a name based on `suggested` that no ancestor or this scope handed out.
    ///
    /// The suggestion itself is returned when free; otherwise a counter suffix is
    /// appended (`name_1`, `name_2`, ...).
    #[must_use]
    pub fn get_unique_name(&self, suggested: &str) -> String {
        let mut names = self.names.lock().expect("Failed to acquire lock");
        if !self.is_taken_anywhere(&names, suggested) {
            names.insert(suggested.to_string());
            return suggested.to_string();
        }

        let mut counter = 1u32;
        loop {
            let candidate = format!("{suggested}_{counter}");
            if !self.is_taken_anywhere(&names, &candidate) {
                names.insert(candidate.clone());
                return candidate;
            }
            counter += 1;
        }
    }

    fn is_taken_anywhere(&self, own: &HashSet<String>, name: &str) -> bool {
        if own.contains(name) {
            return true;
        }
        let mut ancestor = self.parent.as_ref();
        while let Some(scope) = ancestor {
            if scope
                .names
                .lock()
                .expect("Failed to acquire lock")
                .contains(name)
            {
                return true;
            }
            ancestor = scope.parent.as_ref();
        }
        false
    }
}
