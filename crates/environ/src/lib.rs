// crates/environ/src/lib.rs
// ============================================================================
// Module: Environ
// Description: Typed 12-factor configuration from environment variables.
// Purpose: Read environment variables and cast them into settings values.
// Dependencies: serde, serde_json, thiserror, toml, tracing, url
// ============================================================================

//! ## Overview
//! `environ` reads environment variables and casts them into typed settings:
//! strings, booleans, numbers, lists, mappings, JSON, URLs, and connection
//! descriptors for databases, caches, email, and search backends.
//! Invariants:
//! - An absent variable with no default fails with
//!   [`EnvError::MissingConfiguration`]; with a default, the default is
//!   returned unchanged.
//! - Readers never mutate their source; `.env` files are layered beneath it.
//! - Error messages name keys, never values.
//!
//! ```no_run
//! use environ::Env;
//!
//! # fn main() -> Result<(), environ::EnvError> {
//! let env = Env::process();
//! let debug = env.bool_or("DEBUG", false)?;
//! let hosts = env.list_or("ALLOWED_HOSTS", Vec::new())?;
//! let database = env.db_url("DATABASE_URL")?;
//! # let _ = (debug, hosts, database);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cast;
pub mod config;
pub mod env_file;
pub mod error;
pub mod reader;
pub mod services;
pub mod source;
pub mod url_parts;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cast::Cast;
pub use cast::CastOptions;
pub use cast::EnvValue;
pub use cast::FromEnvValue;
pub use config::EnvReaderConfig;
pub use env_file::EnvFile;
pub use error::EnvError;
pub use error::ValueError;
pub use error::ValueErrorKind;
pub use reader::Env;
pub use services::CacheConfig;
pub use services::CacheLocation;
pub use services::DatabaseConfig;
pub use services::EmailConfig;
pub use services::SearchConfig;
pub use source::EnvSource;
pub use source::LayeredEnv;
pub use source::MapEnv;
pub use source::ProcessEnv;
pub use url_parts::UrlParts;

#[cfg(test)]
mod tests;
