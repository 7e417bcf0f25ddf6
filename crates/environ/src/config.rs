// crates/environ/src/config.rs
// ============================================================================
// Module: Reader Configuration
// Description: Options controlling how the reader resolves and casts values.
// Purpose: Provide validated, serde-loadable reader settings with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! [`EnvReaderConfig`] can be built in code, or deserialized from a TOML table
//! embedded in a host configuration file. Validation fails closed: a config
//! that would make list parsing ambiguous or disable size limits is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;

use crate::cast::CastOptions;
use crate::cast::DEFAULT_LIST_DELIMITER;
use crate::error::EnvError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum key length in bytes.
pub const DEFAULT_MAX_KEY_BYTES: usize = 255;
/// Default maximum raw value length in bytes.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 64 * 1024;
/// Default maximum number of proxy hops.
pub const DEFAULT_MAX_PROXY_DEPTH: usize = 8;
/// Upper bound accepted for `max_proxy_depth`.
pub const MAX_PROXY_DEPTH_LIMIT: usize = 64;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Reader configuration.
///
/// # Invariants
/// - `list_delimiter` is neither `=` nor whitespace.
/// - `max_key_bytes` and `max_value_bytes` are non-zero hard upper bounds.
/// - `max_proxy_depth` lies in `1..=MAX_PROXY_DEPTH_LIMIT`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvReaderConfig {
    /// Separator for list and dict casts.
    pub list_delimiter: char,
    /// Resolve `$NAME` proxied values.
    pub interpolate: bool,
    /// Maximum number of proxy hops before failing.
    pub max_proxy_depth: usize,
    /// Maximum bytes allowed for a key.
    pub max_key_bytes: usize,
    /// Maximum bytes allowed for a raw value.
    pub max_value_bytes: usize,
}

impl Default for EnvReaderConfig {
    fn default() -> Self {
        Self {
            list_delimiter: DEFAULT_LIST_DELIMITER,
            interpolate: true,
            max_proxy_depth: DEFAULT_MAX_PROXY_DEPTH,
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl EnvReaderConfig {
    /// Parses and validates a TOML table.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfig`] when the TOML is malformed, has
    /// unknown keys, or fails [`EnvReaderConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self, EnvError> {
        let config: Self =
            toml::from_str(content).map_err(|err| EnvError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.list_delimiter == '=' || self.list_delimiter.is_whitespace() {
            return Err(EnvError::InvalidConfig(
                "list_delimiter must not be `=` or whitespace".to_string(),
            ));
        }
        if self.max_key_bytes == 0 {
            return Err(EnvError::InvalidConfig("max_key_bytes must be greater than zero".to_string()));
        }
        if self.max_value_bytes == 0 {
            return Err(EnvError::InvalidConfig(
                "max_value_bytes must be greater than zero".to_string(),
            ));
        }
        if !(1 ..= MAX_PROXY_DEPTH_LIMIT).contains(&self.max_proxy_depth) {
            return Err(EnvError::InvalidConfig(format!(
                "max_proxy_depth must be between 1 and {MAX_PROXY_DEPTH_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Cast options derived from this configuration.
    #[must_use]
    pub const fn cast_options(&self) -> CastOptions {
        CastOptions {
            list_delimiter: self.list_delimiter,
        }
    }
}
