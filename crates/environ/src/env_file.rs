// crates/environ/src/env_file.rs
// ============================================================================
// Module: Env Files
// Description: Parser for `.env` files of `KEY=VALUE` lines.
// Purpose: Supply development defaults without touching the process environment.
// Dependencies: std
// ============================================================================

//! ## Overview
//! An env file is a list of `KEY=VALUE` lines, optionally prefixed with
//! `export `. Keys are `[A-Za-z0-9_]+`; lines that do not match are ignored,
//! which covers comments and blank lines. Single-quoted values are literal;
//! double-quoted values honour backslash escapes (`\n` is a newline, `\x`
//! is `x`). Later duplicates overwrite earlier ones.
//!
//! Parsed files are exposed as a [`MapEnv`] so the reader can layer them
//! beneath the real environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::EnvError;
use crate::source::MapEnv;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum env file size in bytes.
pub const MAX_ENV_FILE_SIZE: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Env File
// ============================================================================

/// Parsed env file entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    /// Parsed bindings.
    entries: BTreeMap<String, String>,
}

impl EnvFile {
    /// Parses env file content. Malformed lines are skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let entries = content.lines().filter_map(parse_line).collect();
        Self {
            entries,
        }
    }

    /// Reads and parses the env file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::EnvFile`] when the file is missing, unreadable,
    /// not UTF-8, or larger than [`MAX_ENV_FILE_SIZE`].
    pub fn read(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .map_err(|err| EnvError::EnvFile(format!("{}: {err}", path.display())))?;
        if metadata.len() > MAX_ENV_FILE_SIZE {
            return Err(EnvError::EnvFile(format!(
                "{}: file exceeds {MAX_ENV_FILE_SIZE} bytes",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)
            .map_err(|err| EnvError::EnvFile(format!("{}: {err}", path.display())))?;
        let file = Self::parse(&content);
        tracing::debug!(path = %path.display(), entries = file.len(), "env file loaded");
        Ok(file)
    }

    /// Returns the value bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of parsed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the file bound nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the entries into a lookup source.
    #[must_use]
    pub fn into_source(self) -> MapEnv {
        MapEnv::from(self.entries)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses one line into a binding, or `None` when it is not an entry.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    Some((key.to_string(), unquote(value.trim())))
}

/// Strips matching quotes, applying escapes inside double quotes.
fn unquote(value: &str) -> String {
    if value.len() >= 2 {
        if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
            return inner.to_string();
        }
        if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            return unescape(inner);
        }
    }
    value.to_string()
}

/// Resolves backslash escapes.
fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Unit tests for module-private helpers.
#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that non-entry lines are skipped.
    #[test]
    fn parse_line_rejects_invalid_keys() {
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("BAD-KEY=1"), None);
        assert_eq!(parse_line("=value"), None);
        assert_eq!(parse_line("no separator"), None);
    }

    /// Tests that escapes resolve and a trailing backslash survives.
    #[test]
    fn unescape_handles_trailing_backslash() {
        assert_eq!(unescape(r"a\"), "a\\");
        assert_eq!(unescape(r#"say \"hi\"\n"#), "say \"hi\"\n");
    }
}
