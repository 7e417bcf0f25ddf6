// crates/environ/src/cast.rs
// ============================================================================
// Module: Value Casts
// Description: Coercion of raw environment strings into typed values.
// Purpose: Provide static (trait) and dynamic (enum) cast surfaces.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`FromEnvValue`] is the static cast surface used by [`crate::Env::var`]
//! and friends. [`Cast`] and [`EnvValue`] are the dynamic equivalent for
//! callers that choose the target type at runtime.
//! Invariants:
//! - Boolean casts never fail; unrecognised tokens are `false`.
//! - Numeric casts trim surrounding whitespace before parsing.
//! - List casts trim items and drop empty ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::error::ValueError;
use crate::services::CacheConfig;
use crate::services::DatabaseConfig;
use crate::services::EmailConfig;
use crate::services::SearchConfig;
use crate::url_parts::UrlParts;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tokens recognised as `true` by the boolean cast (compared case-insensitively).
pub const TRUTHY_TOKENS: [&str; 4] = ["true", "1", "yes", "on"];

/// Default separator for list and dict casts.
pub const DEFAULT_LIST_DELIMITER: char = ',';

// ============================================================================
// SECTION: Cast Options
// ============================================================================

/// Options shared by every cast invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOptions {
    /// Separator between list items and dict entries.
    pub list_delimiter: char,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self {
            list_delimiter: DEFAULT_LIST_DELIMITER,
        }
    }
}

// ============================================================================
// SECTION: Static Casts
// ============================================================================

/// Types that can be built from a raw environment string.
pub trait FromEnvValue: Sized {
    /// Human-readable target type used in error messages.
    const TARGET: &'static str;

    /// Coerces `raw` into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when `raw` cannot be represented as `Self`.
    fn from_env_value(raw: &str, options: &CastOptions) -> Result<Self, ValueError>;
}

impl FromEnvValue for String {
    const TARGET: &'static str = "string";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }
}

impl FromEnvValue for bool {
    const TARGET: &'static str = "boolean";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        Ok(parse_bool(raw))
    }
}

impl FromEnvValue for PathBuf {
    const TARGET: &'static str = "path";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        if raw.trim().is_empty() {
            return Err(ValueError::cast(Self::TARGET, "path is empty"));
        }
        Ok(Self::from(raw))
    }
}

/// Implements [`FromEnvValue`] for numeric types via [`str::parse`].
macro_rules! numeric_cast {
    ($target:literal => $($ty:ty),+ $(,)?) => {
        $(
            impl FromEnvValue for $ty {
                const TARGET: &'static str = $target;

                fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
                    raw.trim()
                        .parse::<$ty>()
                        .map_err(|err| ValueError::cast(Self::TARGET, err.to_string()))
                }
            }
        )+
    };
}

numeric_cast!("integer" => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
numeric_cast!("float" => f32, f64);

impl<T: FromEnvValue> FromEnvValue for Vec<T> {
    const TARGET: &'static str = "list";

    fn from_env_value(raw: &str, options: &CastOptions) -> Result<Self, ValueError> {
        split_list(raw, options.list_delimiter)
            .into_iter()
            .map(|item| {
                T::from_env_value(item, options).map_err(|err| ValueError {
                    kind: err.kind,
                    target: Self::TARGET,
                    reason: format!("list item is not a valid {err}"),
                })
            })
            .collect()
    }
}

impl FromEnvValue for BTreeMap<String, String> {
    const TARGET: &'static str = "dict";

    fn from_env_value(raw: &str, options: &CastOptions) -> Result<Self, ValueError> {
        parse_dict(raw, options.list_delimiter)
    }
}

impl FromEnvValue for Value {
    const TARGET: &'static str = "json";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        serde_json::from_str(raw).map_err(|err| ValueError::parse(Self::TARGET, err.to_string()))
    }
}

// ============================================================================
// SECTION: Dynamic Casts
// ============================================================================

/// Runtime-selected cast target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cast {
    /// Raw string (identity).
    #[default]
    Str,
    /// Boolean via [`TRUTHY_TOKENS`].
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Sequence of strings.
    List,
    /// String-to-string mapping.
    Dict,
    /// Arbitrary JSON document.
    Json,
    /// Generic URL components.
    Url,
    /// Database connection descriptor.
    Database,
    /// Cache backend descriptor.
    Cache,
    /// Email backend descriptor.
    Email,
    /// Search backend descriptor.
    Search,
}

impl Cast {
    /// Applies this cast to `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when `raw` does not fit the target.
    pub fn apply(self, raw: &str, options: &CastOptions) -> Result<EnvValue, ValueError> {
        Ok(match self {
            Self::Str => EnvValue::Str(String::from_env_value(raw, options)?),
            Self::Bool => EnvValue::Bool(bool::from_env_value(raw, options)?),
            Self::Int => EnvValue::Int(i64::from_env_value(raw, options)?),
            Self::Float => EnvValue::Float(f64::from_env_value(raw, options)?),
            Self::List => EnvValue::List(Vec::<String>::from_env_value(raw, options)?),
            Self::Dict => EnvValue::Dict(BTreeMap::from_env_value(raw, options)?),
            Self::Json => EnvValue::Json(Value::from_env_value(raw, options)?),
            Self::Url => EnvValue::Url(UrlParts::from_env_value(raw, options)?),
            Self::Database => connection(&DatabaseConfig::from_env_value(raw, options)?)?,
            Self::Cache => connection(&CacheConfig::from_env_value(raw, options)?)?,
            Self::Email => connection(&EmailConfig::from_env_value(raw, options)?)?,
            Self::Search => connection(&SearchConfig::from_env_value(raw, options)?)?,
        })
    }
}

/// Typed value produced by a dynamic cast.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    /// Raw string.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Sequence of strings.
    List(Vec<String>),
    /// String-to-string mapping.
    Dict(BTreeMap<String, String>),
    /// JSON document.
    Json(Value),
    /// URL components.
    Url(UrlParts),
    /// Connection parameters keyed by settings name (`ENGINE`, `NAME`, ...).
    Connection(BTreeMap<String, Value>),
}

impl EnvValue {
    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float payload, if any.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the connection parameters, if any.
    #[must_use]
    pub const fn as_connection(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Connection(params) => Some(params),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies the truthy-token rule.
#[must_use]
pub fn parse_bool(raw: &str) -> bool {
    let token = raw.trim();
    TRUTHY_TOKENS.iter().any(|truthy| token.eq_ignore_ascii_case(truthy))
}

/// Splits on `delimiter`, trimming items and dropping empty ones.
#[must_use]
pub fn split_list(raw: &str, delimiter: char) -> Vec<&str> {
    raw.split(delimiter).map(str::trim).filter(|item| !item.is_empty()).collect()
}

/// Parses `key=value` entries separated by `delimiter`.
fn parse_dict(raw: &str, delimiter: char) -> Result<BTreeMap<String, String>, ValueError> {
    let mut map = BTreeMap::new();
    for entry in split_list(raw, delimiter) {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(ValueError::cast("dict", "entry is missing `=`"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ValueError::cast("dict", "entry has an empty key"));
        }
        map.insert(key.to_string(), value.trim().to_string());
    }
    Ok(map)
}

/// Serializes a service descriptor into a settings-keyed parameter map.
fn connection<T: Serialize>(descriptor: &T) -> Result<EnvValue, ValueError> {
    match serde_json::to_value(descriptor) {
        Ok(Value::Object(map)) => Ok(EnvValue::Connection(map.into_iter().collect())),
        Ok(_) => Err(ValueError::parse("connection", "descriptor is not a mapping")),
        Err(err) => Err(ValueError::parse("connection", err.to_string())),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
