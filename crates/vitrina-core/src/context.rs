//! Browsing-context seam
//!
//! The tab/window lifecycle boundary. Script-initiated close is refused by
//! most embedding contexts, so callers must handle a `false` return from
//! `try_close` and fall back to containment.

use async_trait::async_trait;

#[async_trait]
pub trait BrowsingContext: Send + Sync {
    /// Ask the embedding context to close this tab.
    ///
    /// Returns whether the context accepted the request.
    async fn try_close(&self) -> bool;

    /// Navigate to a neutral blank page as a containment fallback.
    async fn navigate_blank(&self);

    /// Reload the page from scratch.
    async fn reload(&self);
}
