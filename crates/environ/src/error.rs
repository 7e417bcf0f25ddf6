// crates/environ/src/error.rs
// ============================================================================
// Module: Environ Errors
// Description: Error types for environment lookups and casts.
// Purpose: Surface missing, malformed, and out-of-bounds values to callers.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`EnvError`] is the error returned by every reader operation. Casts work on
//! raw strings without knowing the variable name, so they report a key-less
//! [`ValueError`] that the reader binds to the key via [`ValueError::for_key`].
//! Error messages carry key names and type names only; raw values are never
//! echoed because they frequently hold credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Reader Errors
// ============================================================================

/// Errors raised while resolving an environment variable.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never contain the raw variable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Required variable is absent and no default was supplied.
    #[error("missing configuration: environment variable `{key}` is not set")]
    MissingConfiguration {
        /// Name of the absent variable.
        key: String,
    },
    /// Value is present but could not be coerced into the target type.
    #[error("cast error: `{key}` is not a valid {target}: {reason}")]
    Cast {
        /// Name of the variable.
        key: String,
        /// Human-readable target type.
        target: &'static str,
        /// Why the coercion failed.
        reason: String,
    },
    /// Structured value (URL, connection string, JSON) is malformed.
    #[error("parse error: `{key}` is not a valid {target}: {reason}")]
    Parse {
        /// Name of the variable.
        key: String,
        /// Human-readable target type.
        target: &'static str,
        /// Why parsing failed.
        reason: String,
    },
    /// Key or value exceeds configured size limits.
    #[error("limit exceeded for `{key}`: {reason}")]
    LimitExceeded {
        /// Name of the variable.
        key: String,
        /// Which limit was exceeded.
        reason: String,
    },
    /// Proxied value chain is too deep or cyclic.
    #[error("proxy chain starting at `{key}` exceeds the maximum depth")]
    ProxyDepth {
        /// Variable where resolution started.
        key: String,
    },
    /// Env file could not be read.
    #[error("env file error: {0}")]
    EnvFile(String),
    /// Reader configuration failed validation.
    #[error("invalid reader config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// SECTION: Cast Errors
// ============================================================================

/// Classification of a cast failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// Scalar coercion failure.
    Cast,
    /// Structured parse failure.
    Parse,
}

/// Key-less failure reported by a cast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target}: {reason}")]
pub struct ValueError {
    /// Failure classification.
    pub kind: ValueErrorKind,
    /// Human-readable target type.
    pub target: &'static str,
    /// Why the cast failed.
    pub reason: String,
}

impl ValueError {
    /// Builds a scalar coercion failure.
    #[must_use]
    pub fn cast(target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind: ValueErrorKind::Cast,
            target,
            reason: reason.into(),
        }
    }

    /// Builds a structured parse failure.
    #[must_use]
    pub fn parse(target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind: ValueErrorKind::Parse,
            target,
            reason: reason.into(),
        }
    }

    /// Binds this failure to the variable it was read from.
    #[must_use]
    pub fn for_key(self, key: &str) -> EnvError {
        match self.kind {
            ValueErrorKind::Cast => EnvError::Cast {
                key: key.to_string(),
                target: self.target,
                reason: self.reason,
            },
            ValueErrorKind::Parse => EnvError::Parse {
                key: key.to_string(),
                target: self.target,
                reason: self.reason,
            },
        }
    }
}
