//! Catalog error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Invalid client or sheet configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Transport-level failure talking to the sheet endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sheet endpoint answered with a non-success status
    #[error("Sheet fetch returned status {status}: {message}")]
    Fetch { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Invalid sheet response: {0}")]
    InvalidResponse(String),
}
