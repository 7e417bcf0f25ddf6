// crates/environ/src/services/cache.rs
// ============================================================================
// Module: Cache Descriptor
// Description: Parses `CACHE_URL` values into cache settings.
// Purpose: Map cache URL schemes onto framework cache backends.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! Cache URLs may name several servers in one authority
//! (`memcache://10.0.0.1:11211,10.0.0.2:11211`), which a strict URL parser
//! rejects, so the authority is split by hand before any decoding.
//! Invariants:
//! - Comma-separated authorities produce a list location.
//! - Option keys are upper-cased.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use url::form_urlencoded;

use super::backend_for;
use crate::cast::CastOptions;
use crate::cast::FromEnvValue;
use crate::error::ValueError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Backend used for every redis scheme.
const REDIS_BACKEND: &str = "django_redis.cache.RedisCache";

/// Supported cache schemes and their backends.
const CACHE_SCHEMES: &[(&str, &str)] = &[
    ("dbcache", "django.core.cache.backends.db.DatabaseCache"),
    ("dummycache", "django.core.cache.backends.dummy.DummyCache"),
    ("filecache", "django.core.cache.backends.filebased.FileBasedCache"),
    ("locmemcache", "django.core.cache.backends.locmem.LocMemCache"),
    ("memcache", "django.core.cache.backends.memcached.MemcachedCache"),
    ("pymemcache", "django.core.cache.backends.memcached.PyLibMCCache"),
    ("rediscache", REDIS_BACKEND),
    ("redis", REDIS_BACKEND),
    ("rediss", REDIS_BACKEND),
];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Cache location: one server/path, or several servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheLocation {
    /// Single location.
    Single(String),
    /// Multiple server locations.
    Multiple(Vec<String>),
}

impl Default for CacheLocation {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl CacheLocation {
    /// Collapses a one-element list into [`CacheLocation::Single`].
    fn from_list(mut locations: Vec<String>) -> Self {
        if locations.len() == 1 {
            Self::Single(locations.remove(0))
        } else {
            Self::Multiple(locations)
        }
    }
}

/// Cache settings block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct CacheConfig {
    /// Backend class path.
    pub backend: String,
    /// Server address(es), socket, directory, or table name.
    #[serde(default)]
    pub location: CacheLocation,
    /// Backend options taken from the query string (upper-cased keys).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl CacheConfig {
    /// Parses a cache URL.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] (parse kind) for malformed URLs or unsupported
    /// schemes.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let split = SplitUrl::new(raw.trim())?;
        let scheme = split.scheme.to_ascii_lowercase();
        let backend = backend_for(CACHE_SCHEMES, &scheme).ok_or_else(|| {
            ValueError::parse(Self::TARGET, format!("unsupported scheme `{scheme}`"))
        })?;
        let servers: Vec<String> = split.netloc.split(',').map(str::to_string).collect();

        let location = match scheme.as_str() {
            "filecache" => CacheLocation::Single(format!("{}{}", split.netloc, split.path)),
            "memcache" | "pymemcache" if split.netloc.is_empty() && !split.path.is_empty() => {
                CacheLocation::Single(format!("unix:{}", split.path))
            }
            "redis" | "rediss" | "rediscache" => {
                let target = if split.netloc.is_empty() {
                    "unix"
                } else if scheme == "rediss" {
                    "rediss"
                } else {
                    "redis"
                };
                CacheLocation::from_list(
                    servers
                        .iter()
                        .map(|server| format!("{target}://{server}{}", split.path))
                        .collect(),
                )
            }
            _ => CacheLocation::from_list(servers),
        };

        let options = form_urlencoded::parse(split.query.as_bytes())
            .map(|(key, value)| (key.to_uppercase(), value.into_owned()))
            .collect();

        Ok(Self {
            backend: backend.to_string(),
            location,
            options,
        })
    }
}

impl FromEnvValue for CacheConfig {
    const TARGET: &'static str = "cache url";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        Self::parse(raw)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Cache URL split into raw components.
struct SplitUrl<'a> {
    /// Scheme, as written.
    scheme: &'a str,
    /// Authority, possibly a comma-separated server list.
    netloc: &'a str,
    /// Path including its leading `/`, or empty.
    path: &'a str,
    /// Query string without `?`, or empty.
    query: &'a str,
}

impl<'a> SplitUrl<'a> {
    /// Splits `raw` at `://`, the first `/` and the first `?`.
    fn new(raw: &'a str) -> Result<Self, ValueError> {
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| ValueError::parse(CacheConfig::TARGET, "url is missing `scheme://`"))?;
        if scheme.is_empty() {
            return Err(ValueError::parse(CacheConfig::TARGET, "url scheme is empty"));
        }
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (netloc, path) = rest.find('/').map_or((rest, ""), |index| rest.split_at(index));
        Ok(Self {
            scheme,
            netloc,
            path,
            query,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Unit tests for module-private helpers.
#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    /// Tests that cache URLs split into scheme, netloc, path and query.
    #[test]
    fn split_url_separates_components() {
        let split = SplitUrl::new("redis://a:1,b:2/0?timeout=5").unwrap();
        assert_eq!(split.scheme, "redis");
        assert_eq!(split.netloc, "a:1,b:2");
        assert_eq!(split.path, "/0");
        assert_eq!(split.query, "timeout=5");
    }

    /// Tests that cache URLs without `://` or a scheme are rejected.
    #[test]
    fn split_url_requires_scheme_separator() {
        assert!(SplitUrl::new("memcache:11211").is_err());
        assert!(SplitUrl::new("://host").is_err());
    }
}
