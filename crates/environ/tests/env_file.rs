// crates/environ/tests/env_file.rs
// ============================================================================
// Module: Env File Tests
// Description: Parsing and layering of `.env` files.
// Purpose: Ensure env files only supply defaults beneath real bindings.
// Dependencies: environ, tempfile, tracing-subscriber
// ============================================================================

//! ## Overview
//! Tests env file parsing rules, file size limits, and the set-default
//! layering of file entries beneath the reader's source.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::fs;

use environ::EnvError;
use environ::EnvFile;
use environ::env_file::MAX_ENV_FILE_SIZE;
use tempfile::tempdir;

use crate::common::env_one;
use crate::common::env_with;

/// Sample env file exercising every line form.
const SAMPLE: &str = r#"
# comment line
DEBUG=on
export DATABASE_URL=postgres://u:p@db/app
SINGLE='literal \n $HOME'
DOUBLE="line1\nline2 \"quoted\""
  INDENTED = padded
not an entry
BAD-KEY=ignored
DEBUG=off
"#;

// ============================================================================
// SECTION: Parsing Tests
// ============================================================================

/// Tests that every supported line form is parsed.
#[test]
fn parses_supported_line_forms() {
    let file = EnvFile::parse(SAMPLE);
    assert_eq!(file.get("DATABASE_URL"), Some("postgres://u:p@db/app"));
    assert_eq!(file.get("SINGLE"), Some("literal \\n $HOME"));
    assert_eq!(file.get("DOUBLE"), Some("line1\nline2 \"quoted\""));
    assert_eq!(file.get("BAD-KEY"), None);
    assert_eq!(file.len(), 4);
}

/// Tests that whitespace around `=` is not part of the key.
#[test]
fn indented_key_with_spaces_is_skipped() {
    let file = EnvFile::parse(SAMPLE);
    assert_eq!(file.get("INDENTED"), None);
    assert_eq!(file.get("INDENTED "), None);
}

/// Tests that later duplicates win.
#[test]
fn later_duplicates_overwrite() {
    assert_eq!(EnvFile::parse(SAMPLE).get("DEBUG"), Some("off"));
}

/// Tests that empty content produces an empty file.
#[test]
fn empty_content_is_empty() {
    assert!(EnvFile::parse("").is_empty());
}

// ============================================================================
// SECTION: Layering Tests
// ============================================================================

/// Tests that file entries fill in absent keys only.
#[test]
fn file_entries_never_override_source() {
    let env = env_one("DEBUG", "true").with_env_file(EnvFile::parse(SAMPLE));
    assert!(env.bool("DEBUG").unwrap());
    assert_eq!(env.db_url("DATABASE_URL").unwrap().name, "app");
}

/// Tests that proxies can cross from the source into the file.
#[test]
fn proxies_resolve_across_layers() {
    let env = env_with(&[("PRIMARY", "$DATABASE_URL")]).with_env_file(EnvFile::parse(SAMPLE));
    assert_eq!(env.db_url("PRIMARY").unwrap().host, "db");
}

// ============================================================================
// SECTION: File IO Tests
// ============================================================================

/// Tests that files are read from disk and layered.
#[test]
fn reads_file_from_disk() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "SECRET_KEY=from-file\n").unwrap();
    let env = env_with(&[]).read_env_file(&path).unwrap();
    assert_eq!(env.str("SECRET_KEY").unwrap(), "from-file");
}

/// Tests that a missing file is an env file error.
#[test]
fn missing_file_fails() {
    let dir = tempdir().unwrap();
    let err = EnvFile::read(dir.path().join("absent.env")).unwrap_err();
    assert!(matches!(err, EnvError::EnvFile(_)));
}

/// Tests that oversized files are rejected before parsing.
#[test]
fn oversized_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.env");
    let len = usize::try_from(MAX_ENV_FILE_SIZE).unwrap() + 1;
    fs::write(&path, "x".repeat(len)).unwrap();
    assert!(matches!(EnvFile::read(&path), Err(EnvError::EnvFile(_))));
}
