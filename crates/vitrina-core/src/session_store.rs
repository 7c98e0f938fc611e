//! Session store seam
//!
//! Abstraction over the host's persistent key-value storage, holding at most
//! one `SessionRecord` under a fixed key.
//!
//! Implementations:
//! - `FileSessionStore` (vitrina-gate): JSON file on disk
//! - in-memory fakes in tests

use async_trait::async_trait;

use crate::{Result, session::SessionRecord};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored record, if any.
    ///
    /// Implementations treat unreadable or malformed data as absent rather
    /// than failing the activation.
    async fn load(&self) -> Result<Option<SessionRecord>>;

    /// Persist `record`, replacing any previous one.
    ///
    /// # Errors
    /// - `Error::SessionStore` for write errors
    async fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Delete the stored record. Deleting an absent record is not an error.
    ///
    /// # Errors
    /// - `Error::SessionStore` for delete errors
    async fn clear(&self) -> Result<()>;
}
