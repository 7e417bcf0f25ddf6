// crates/environ/src/services/mod.rs
// ============================================================================
// Module: Service Descriptors
// Description: Connection descriptors parsed from service URLs.
// Purpose: Turn `DATABASE_URL`-style values into framework settings blocks.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! Each descriptor maps a URL scheme to a backend identifier and lifts the
//! URL components into the settings keys the framework expects (`ENGINE`,
//! `NAME`, `LOCATION`, `EMAIL_HOST`, ...). Descriptors serialize with those
//! keys, which is what [`crate::Cast`] emits as connection parameters.
//! Invariants:
//! - Unknown schemes are parse errors, never silently defaulted.
//! - Query parameters become `OPTIONS` entries unless a descriptor consumes them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod database;
pub mod email;
pub mod search;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CacheConfig;
pub use cache::CacheLocation;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use search::SearchConfig;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps `scheme` to its backend identifier using `table`.
fn backend_for(table: &[(&str, &'static str)], scheme: &str) -> Option<&'static str> {
    table.iter().find(|(name, _)| *name == scheme).map(|(_, backend)| *backend)
}
