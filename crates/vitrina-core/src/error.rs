//! Shared error type
//!
//! Covers the concerns the core types and their consumers share: session
//! persistence, configuration and the IO underneath both. Crates with a
//! richer failure vocabulary (cache, catalog) define their own enums.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A session record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The session store could not complete a load, save or clear.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// A configuration source could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A parsed configuration failed a cross-field check.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
