//! Cache error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// No caching agent is registered with the coordinator
    #[error("No caching agent is available")]
    NoAgent,

    /// The agent channel is closed (agent task ended)
    #[error("Caching agent stopped responding")]
    AgentGone,

    /// The agent replied `{success: false}`
    #[error("Cache operation failed: {0}")]
    Operation(String),

    /// Transport-level fetch failure on the serve path
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The origin answered with a non-success status on the serve path
    #[error("Image fetch returned status {0}")]
    UpstreamStatus(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
