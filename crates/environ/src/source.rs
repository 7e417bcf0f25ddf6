// crates/environ/src/source.rs
// ============================================================================
// Module: Environment Sources
// Description: Read-only key/value sources backing the reader.
// Purpose: Decouple lookups from process-global state for hosts and tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! An [`EnvSource`] answers a single question: is this key bound, and to what?
//! [`ProcessEnv`] reads the live process environment, [`MapEnv`] serves an
//! explicit mapping, and [`LayeredEnv`] consults a primary source before a
//! fallback (used for `.env` files, where real variables always win).
//! Sources are never written through.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;

// ============================================================================
// SECTION: Source Trait
// ============================================================================

/// Read-only lookup of environment bindings.
pub trait EnvSource {
    /// Returns the raw value bound to `key`, or `None` when unbound.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<S: EnvSource + ?Sized> EnvSource for &S {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

// ============================================================================
// SECTION: Process Environment
// ============================================================================

/// Source backed by the live process environment.
///
/// # Invariants
/// - Keys the platform cannot represent (empty, `=` or NUL) are unbound.
/// - Non-UTF-8 values are converted lossily.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        if key.is_empty() || key.contains(['=', '\0']) {
            return None;
        }
        env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

// ============================================================================
// SECTION: Explicit Mapping
// ============================================================================

/// Source backed by an explicit key/value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    /// Bound variables.
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
        }
    }

    /// Binds `key` to `value`, returning the updated mapping.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Binds `key` to `value`, replacing any previous binding.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true when no variables are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl From<BTreeMap<String, String>> for MapEnv {
    fn from(vars: BTreeMap<String, String>) -> Self {
        Self {
            vars,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

// ============================================================================
// SECTION: Layered Source
// ============================================================================

/// Source that consults `primary` first and `fallback` second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeredEnv<P, F> {
    /// Authoritative source.
    primary: P,
    /// Source consulted only for keys the primary does not bind.
    fallback: F,
}

impl<P, F> LayeredEnv<P, F> {
    /// Layers `fallback` beneath `primary`.
    #[must_use]
    pub const fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
        }
    }
}

impl<P: EnvSource, F: EnvSource> EnvSource for LayeredEnv<P, F> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.primary.lookup(key).or_else(|| self.fallback.lookup(key))
    }
}
