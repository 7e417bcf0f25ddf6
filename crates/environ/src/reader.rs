// crates/environ/src/reader.rs
// ============================================================================
// Module: Environment Reader
// Description: Typed lookups over an environment source.
// Purpose: Resolve variables, apply defaults, and cast raw values.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! [`Env`] resolves a key against its [`EnvSource`], follows proxied values,
//! enforces size limits, and then either casts the raw value or falls back to
//! a caller-supplied default. Defaults are returned exactly as given and are
//! never cast.
//!
//! A value of the form `$OTHER` (where `OTHER` is an identifier-like name) is a
//! proxy: the reader resolves `OTHER` in its place. A leading `\$` escapes the
//! dollar sign. Proxy chains longer than `max_proxy_depth` fail, which also
//! catches cycles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::cast::Cast;
use crate::cast::CastOptions;
use crate::cast::EnvValue;
use crate::cast::FromEnvValue;
use crate::config::EnvReaderConfig;
use crate::env_file::EnvFile;
use crate::error::EnvError;
use crate::services::CacheConfig;
use crate::services::DatabaseConfig;
use crate::services::EmailConfig;
use crate::services::SearchConfig;
use crate::source::EnvSource;
use crate::source::LayeredEnv;
use crate::source::MapEnv;
use crate::source::ProcessEnv;
use crate::url_parts::UrlParts;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Environment reader.
///
/// # Invariants
/// - `config` has passed [`EnvReaderConfig::validate`].
/// - The source is only ever read.
#[derive(Debug, Clone)]
pub struct Env<S = ProcessEnv> {
    /// Source of raw bindings.
    source: S,
    /// Validated reader options.
    config: EnvReaderConfig,
}

impl Env<ProcessEnv> {
    /// Reader over the live process environment with default options.
    #[must_use]
    pub fn process() -> Self {
        Self::with_source(ProcessEnv)
    }
}

impl Default for Env<ProcessEnv> {
    fn default() -> Self {
        Self::process()
    }
}

impl Env<MapEnv> {
    /// Reader over an explicit mapping with default options.
    #[must_use]
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self::with_source(MapEnv::from(vars))
    }
}

impl<S: EnvSource> Env<S> {
    /// Creates a reader with validated options.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfig`] when `config` fails validation.
    pub fn new(source: S, config: EnvReaderConfig) -> Result<Self, EnvError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
        })
    }

    /// Creates a reader with default options.
    #[must_use]
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            config: EnvReaderConfig::default(),
        }
    }

    /// Reader options.
    #[must_use]
    pub const fn config(&self) -> &EnvReaderConfig {
        &self.config
    }

    /// Layers `file` beneath the current source; existing bindings win.
    #[must_use]
    pub fn with_env_file(self, file: EnvFile) -> Env<LayeredEnv<S, MapEnv>> {
        Env {
            source: LayeredEnv::new(self.source, file.into_source()),
            config: self.config,
        }
    }

    /// Reads the env file at `path` and layers it beneath the current source.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::EnvFile`] when the file cannot be read.
    pub fn read_env_file(self, path: impl AsRef<Path>) -> Result<Env<LayeredEnv<S, MapEnv>>, EnvError> {
        let file = EnvFile::read(path)?;
        Ok(self.with_env_file(file))
    }

    // ------------------------------------------------------------------------
    // Raw resolution
    // ------------------------------------------------------------------------

    /// Resolves the raw value for `key`, following proxies.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::LimitExceeded`] or [`EnvError::ProxyDepth`].
    pub fn raw(&self, key: &str) -> Result<Option<String>, EnvError> {
        let mut name = key.to_string();
        let mut hops = 0;
        loop {
            self.check_key(&name)?;
            let Some(value) = self.source.lookup(&name) else {
                return Ok(None);
            };
            if value.len() > self.config.max_value_bytes {
                return Err(EnvError::LimitExceeded {
                    key: name,
                    reason: format!("value exceeds {} bytes", self.config.max_value_bytes),
                });
            }
            if !self.config.interpolate {
                return Ok(Some(value));
            }
            if let Some(rest) = value.strip_prefix("\\$") {
                return Ok(Some(format!("${rest}")));
            }
            let Some(target) = proxy_target(&value) else {
                return Ok(Some(value));
            };
            hops += 1;
            if hops > self.config.max_proxy_depth {
                return Err(EnvError::ProxyDepth {
                    key: key.to_string(),
                });
            }
            tracing::trace!(from = %name, to = target, "following proxied value");
            name = target.to_string();
        }
    }

    /// Returns true when `key` resolves to a value.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Env::raw`].
    pub fn contains(&self, key: &str) -> Result<bool, EnvError> {
        Ok(self.raw(key)?.is_some())
    }

    // ------------------------------------------------------------------------
    // Dynamic lookup
    // ------------------------------------------------------------------------

    /// Resolves `key` and applies `cast`; absent keys yield `default`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when the key is absent and
    /// `default` is `None`, or the cast error when the value does not fit.
    pub fn get(&self, key: &str, cast: Cast, default: Option<EnvValue>) -> Result<EnvValue, EnvError> {
        match self.raw(key)? {
            Some(raw) => cast.apply(&raw, &self.config.cast_options()).map_err(|err| err.for_key(key)),
            None => fallback(key, default),
        }
    }

    // ------------------------------------------------------------------------
    // Typed lookup
    // ------------------------------------------------------------------------

    /// Resolves and casts a required variable.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when absent, or the cast
    /// error when the value does not fit `T`.
    pub fn var<T: FromEnvValue>(&self, key: &str) -> Result<T, EnvError> {
        self.cast_with(key, &self.config.cast_options(), None)
    }

    /// Resolves and casts a variable, returning `default` unchanged when absent.
    ///
    /// # Errors
    ///
    /// Returns the cast error when a present value does not fit `T`.
    pub fn var_or<T: FromEnvValue>(&self, key: &str, default: T) -> Result<T, EnvError> {
        self.cast_with(key, &self.config.cast_options(), Some(default))
    }

    /// Resolves and casts an optional variable.
    ///
    /// # Errors
    ///
    /// Returns the cast error when a present value does not fit `T`.
    pub fn var_opt<T: FromEnvValue>(&self, key: &str) -> Result<Option<T>, EnvError> {
        self.raw(key)?
            .map(|raw| T::from_env_value(&raw, &self.config.cast_options()).map_err(|err| err.for_key(key)))
            .transpose()
    }

    /// Resolves a required variable and applies a caller-supplied cast.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when absent, or
    /// [`EnvError::Cast`] carrying the message of `cast`'s error.
    pub fn var_with<T, E, F>(&self, key: &str, cast: F) -> Result<T, EnvError>
    where
        E: fmt::Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        let raw = self.raw(key)?.ok_or_else(|| missing(key))?;
        cast(&raw).map_err(|err| EnvError::Cast {
            key: key.to_string(),
            target: "custom value",
            reason: err.to_string(),
        })
    }

    // ------------------------------------------------------------------------
    // Convenience casts
    // ------------------------------------------------------------------------

    /// Required string.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when absent.
    pub fn str(&self, key: &str) -> Result<String, EnvError> {
        self.var(key)
    }

    /// String with default.
    ///
    /// # Errors
    ///
    /// Returns resolution errors only.
    pub fn str_or(&self, key: &str, default: &str) -> Result<String, EnvError> {
        self.var_or(key, default.to_string())
    }

    /// Required boolean.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when absent.
    pub fn bool(&self, key: &str) -> Result<bool, EnvError> {
        self.var(key)
    }

    /// Boolean with default.
    ///
    /// # Errors
    ///
    /// Returns resolution errors only.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, EnvError> {
        self.var_or(key, default)
    }

    /// Required integer.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Cast`].
    pub fn int(&self, key: &str) -> Result<i64, EnvError> {
        self.var(key)
    }

    /// Integer with default.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Cast`] when a present value is not an integer.
    pub fn int_or(&self, key: &str, default: i64) -> Result<i64, EnvError> {
        self.var_or(key, default)
    }

    /// Required float.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Cast`].
    pub fn float(&self, key: &str) -> Result<f64, EnvError> {
        self.var(key)
    }

    /// Float with default.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Cast`] when a present value is not a float.
    pub fn float_or(&self, key: &str, default: f64) -> Result<f64, EnvError> {
        self.var_or(key, default)
    }

    /// Required list split on the configured delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when absent.
    pub fn list(&self, key: &str) -> Result<Vec<String>, EnvError> {
        self.var(key)
    }

    /// List with default.
    ///
    /// # Errors
    ///
    /// Returns resolution errors only.
    pub fn list_or(&self, key: &str, default: Vec<String>) -> Result<Vec<String>, EnvError> {
        self.var_or(key, default)
    }

    /// Required list split on `delimiter` instead of the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] when absent.
    pub fn list_with(&self, key: &str, delimiter: char) -> Result<Vec<String>, EnvError> {
        let options = CastOptions {
            list_delimiter: delimiter,
        };
        self.cast_with(key, &options, None)
    }

    /// Required `key=value` mapping.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Cast`].
    pub fn dict(&self, key: &str) -> Result<BTreeMap<String, String>, EnvError> {
        self.var(key)
    }

    /// Required JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Parse`].
    pub fn json(&self, key: &str) -> Result<Value, EnvError> {
        self.var(key)
    }

    /// Required URL components.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Parse`].
    pub fn url(&self, key: &str) -> Result<UrlParts, EnvError> {
        self.var(key)
    }

    /// Required filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Cast`].
    pub fn path(&self, key: &str) -> Result<PathBuf, EnvError> {
        self.var(key)
    }

    /// Required database descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Parse`].
    pub fn db_url(&self, key: &str) -> Result<DatabaseConfig, EnvError> {
        self.var(key)
    }

    /// Required cache descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Parse`].
    pub fn cache_url(&self, key: &str) -> Result<CacheConfig, EnvError> {
        self.var(key)
    }

    /// Required email descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Parse`].
    pub fn email_url(&self, key: &str) -> Result<EmailConfig, EnvError> {
        self.var(key)
    }

    /// Required search descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingConfiguration`] or [`EnvError::Parse`].
    pub fn search_url(&self, key: &str) -> Result<SearchConfig, EnvError> {
        self.var(key)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Resolves `key`, casting with `options` or falling back to `default`.
    fn cast_with<T: FromEnvValue>(
        &self,
        key: &str,
        options: &CastOptions,
        default: Option<T>,
    ) -> Result<T, EnvError> {
        match self.raw(key)? {
            Some(raw) => T::from_env_value(&raw, options).map_err(|err| err.for_key(key)),
            None => fallback(key, default),
        }
    }

    /// Enforces key limits.
    fn check_key(&self, key: &str) -> Result<(), EnvError> {
        if key.is_empty() {
            return Err(EnvError::LimitExceeded {
                key: String::new(),
                reason: "key is empty".to_string(),
            });
        }
        if key.len() > self.config.max_key_bytes {
            return Err(EnvError::LimitExceeded {
                key: key.to_string(),
                reason: format!("key exceeds {} bytes", self.config.max_key_bytes),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the proxied variable name when `value` is `$NAME`.
fn proxy_target(value: &str) -> Option<&str> {
    let target = value.strip_prefix('$')?;
    let mut bytes = target.bytes();
    let starts_name = bytes.next().is_some_and(|b| b.is_ascii_alphabetic() || b == b'_');
    let is_name = starts_name && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_');
    is_name.then_some(target)
}

/// Returns `default` for an absent key, or a missing-configuration error.
fn fallback<T>(key: &str, default: Option<T>) -> Result<T, EnvError> {
    if let Some(default) = default {
        tracing::debug!(key, "environment variable not set; using default");
        return Ok(default);
    }
    Err(missing(key))
}

/// Builds a missing-configuration error.
fn missing(key: &str) -> EnvError {
    tracing::debug!(key, "required environment variable not set");
    EnvError::MissingConfiguration {
        key: key.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Unit tests for module-private helpers.
#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that only identifier-like names are proxied.
    #[test]
    fn proxy_target_requires_plain_names() {
        assert_eq!(proxy_target("$DATABASE_URL"), Some("DATABASE_URL"));
        assert_eq!(proxy_target("$"), None);
        assert_eq!(proxy_target("$5.00"), None);
        assert_eq!(proxy_target("$5"), None);
        assert_eq!(proxy_target("plain"), None);
    }
}
