// crates/environ/src/tests.rs
// ============================================================================
// Module: Environ Unit Tests
// Description: Crate-level unit tests and test-only lint relaxations.
// Purpose: Check thread-safety bounds and process-environment edge cases.
// Dependencies: environ
// ============================================================================

//! ## Overview
//! Provides test-only lint relaxations and crate-level unit tests.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

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

use crate::Env;
use crate::EnvSource;
use crate::MapEnv;
use crate::ProcessEnv;

// ============================================================================
// SECTION: Thread Safety
// ============================================================================

/// Compile-time check that a type can be shared across threads.
const fn assert_send_sync<T: Send + Sync>() {}

/// Tests that readers are `Send + Sync`.
#[test]
fn readers_are_send_and_sync() {
    assert_send_sync::<Env<ProcessEnv>>();
    assert_send_sync::<Env<MapEnv>>();
}

/// Tests that one reader can serve several threads.
#[test]
fn reader_is_shareable_across_threads() {
    let env = Env::with_source(MapEnv::new().with("WORKERS", "4"));
    std::thread::scope(|scope| {
        for _ in 0 .. 4 {
            scope.spawn(|| assert_eq!(env.int("WORKERS").unwrap(), 4));
        }
    });
}

// ============================================================================
// SECTION: Process Environment
// ============================================================================

/// Tests that process env treats unrepresentable keys as unbound.
#[test]
fn process_env_treats_unrepresentable_keys_as_unbound() {
    assert_eq!(ProcessEnv.lookup(""), None);
    assert_eq!(ProcessEnv.lookup("A=B"), None);
    assert_eq!(ProcessEnv.lookup("A\0B"), None);
}

/// Tests that process env reads inherited variables.
#[test]
fn process_env_reads_inherited_variables() {
    let path = std::env::var("PATH").ok();
    assert_eq!(ProcessEnv.lookup("PATH"), path);
}
