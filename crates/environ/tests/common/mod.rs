// crates/environ/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Helpers
// Description: Reader fixtures shared by the integration tests.
// Purpose: Build readers over explicit mappings without touching the process env.
// Dependencies: environ
// ============================================================================

//! ## Overview
//! Helpers that build readers over explicit mappings so tests never depend on
//! (or mutate) the process environment.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use environ::Env;
use environ::MapEnv;

/// Builds a reader over the given `(key, value)` pairs.
pub fn env_with(vars: &[(&str, &str)]) -> Env<MapEnv> {
    Env::with_source(vars.iter().copied().collect::<MapEnv>())
}

/// Builds a reader with a single binding.
pub fn env_one(key: &str, value: &str) -> Env<MapEnv> {
    env_with(&[(key, value)])
}

/// Returns a string of `len` bytes.
pub fn oversized_string(len: usize) -> String {
    "x".repeat(len)
}
