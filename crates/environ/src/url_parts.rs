// crates/environ/src/url_parts.rs
// ============================================================================
// Module: URL Components
// Description: Decomposition of connection-style URLs.
// Purpose: Expose scheme, credentials, host, port, path, and query fields.
// Dependencies: url, percent-encoding, serde
// ============================================================================

//! ## Overview
//! [`UrlParts`] is the result of the URL cast and the common input of every
//! service descriptor. Parsing is delegated to the `url` crate; credentials,
//! host, and path are percent-decoded so `p%40ss` becomes `p@ss` and a host of
//! `%2Fvar%2Frun` becomes a socket directory.
//! Invariants:
//! - Input must carry an authority component (`scheme://...`).
//! - Query parameters keep the last value for repeated keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde::Serialize;
use url::Host;
use url::Url;

use crate::cast::CastOptions;
use crate::cast::FromEnvValue;
use crate::error::ValueError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Decoded components of a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParts {
    /// Lower-cased scheme.
    pub scheme: String,
    /// Decoded user name, if present.
    pub username: Option<String>,
    /// Decoded password, if present.
    pub password: Option<String>,
    /// Decoded host, if present.
    pub host: Option<String>,
    /// Explicit port, if present.
    pub port: Option<u16>,
    /// Decoded path including its leading `/` (may be empty).
    pub path: String,
    /// Decoded query parameters.
    pub query: BTreeMap<String, String>,
    /// Fragment, if present.
    pub fragment: Option<String>,
}

impl UrlParts {
    /// Parses `raw` into its components.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] (parse kind) when `raw` is empty, lacks a
    /// `scheme://` prefix, or is rejected by the URL parser.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValueError::parse(Self::TARGET, "url is empty"));
        }
        if !raw.contains("://") {
            return Err(ValueError::parse(Self::TARGET, "url is missing `scheme://`"));
        }
        let url = Url::parse(raw).map_err(|err| ValueError::parse(Self::TARGET, err.to_string()))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            username: non_empty(decode(url.username())),
            password: url.password().map(decode),
            host: host_name(&url),
            port: url.port(),
            path: decode(url.path()),
            query: url.query_pairs().into_owned().collect(),
            fragment: url.fragment().map(str::to_string),
        })
    }

    /// Path with its leading `/` removed.
    #[must_use]
    pub fn path_name(&self) -> &str {
        self.path.strip_prefix('/').unwrap_or(&self.path)
    }

    /// `host[:port]`, or an empty string when no host is present.
    #[must_use]
    pub fn host_port(&self) -> String {
        match (&self.host, self.port) {
            (Some(host), Some(port)) if host.contains(':') => format!("[{host}]:{port}"),
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) if host.contains(':') => format!("[{host}]"),
            (Some(host), None) => host.clone(),
            (None, _) => String::new(),
        }
    }
}

impl FromEnvValue for UrlParts {
    const TARGET: &'static str = "url";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        Self::parse(raw)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Percent-decodes `raw`, replacing invalid UTF-8 sequences.
pub(crate) fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Decoded host, with IPv6 literals stripped of their brackets.
fn host_name(url: &Url) -> Option<String> {
    match url.host() {
        Some(Host::Ipv6(addr)) => Some(addr.to_string()),
        _ => url.host_str().map(decode).and_then(non_empty),
    }
}

/// Maps an empty string to `None`.
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Unit tests for module-private helpers.
#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    /// Tests that credentials and socket hosts are percent-decoded.
    #[test]
    fn decodes_credentials_and_socket_hosts() {
        let parts = UrlParts::parse("postgres://us%3Aer:p%40ss@%2Fvar%2Frun%2Fpg/app").unwrap();
        assert_eq!(parts.username.as_deref(), Some("us:er"));
        assert_eq!(parts.password.as_deref(), Some("p@ss"));
        assert_eq!(parts.host.as_deref(), Some("/var/run/pg"));
        assert_eq!(parts.path_name(), "app");
    }

    /// Tests that input without `scheme://` is rejected.
    #[test]
    fn rejects_scheme_less_input() {
        assert!(UrlParts::parse("localhost:5432").is_err());
        assert!(UrlParts::parse("   ").is_err());
    }

    /// Tests that IPv6 hosts lose their brackets and regain them in `host_port`.
    #[test]
    fn ipv6_hosts_are_unbracketed() {
        let parts = UrlParts::parse("postgres://[::1]:5432/app").unwrap();
        assert_eq!(parts.host.as_deref(), Some("::1"));
        assert_eq!(parts.host_port(), "[::1]:5432");
    }

    /// Tests that `host_port` omits an absent port.
    #[test]
    fn host_port_formats_optional_port() {
        let parts = UrlParts::parse("redis://cache:6380/1").unwrap();
        assert_eq!(parts.host_port(), "cache:6380");
        let parts = UrlParts::parse("redis://cache/1").unwrap();
        assert_eq!(parts.host_port(), "cache");
    }
}
