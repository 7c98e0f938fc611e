//! Agent wire protocol
//!
//! Messages exchanged between the page-side coordinator and the background
//! caching agent. The JSON shapes are part of the external interface and
//! must not drift: `{"type": "CACHE_IMAGES", "imageUrls": [...]}`,
//! `{"type": "CLEAR_IMAGE_CACHE"}` and `{"success": bool, "error"?: str}`.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Request message to the caching agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentMessage {
    /// Fetch and store every listed image, best-effort
    #[serde(rename = "CACHE_IMAGES")]
    CacheImages {
        #[serde(rename = "imageUrls")]
        image_urls: Vec<String>,
    },

    /// Drop the entire image store
    #[serde(rename = "CLEAR_IMAGE_CACHE")]
    ClearImageCache,
}

/// Reply from the caching agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// One in-flight request: the message plus its reply port
#[derive(Debug)]
pub struct AgentRequest {
    pub message: AgentMessage,
    pub reply: oneshot::Sender<AgentReply>,
}

/// Deduplicated set of image URLs to pre-cache
///
/// Construction normalizes raw cell values: entries are trimmed, empties are
/// dropped and duplicates collapse onto their first occurrence, so iteration
/// order still follows the source table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageCacheRequest {
    urls: Vec<String>,
}

impl ImageCacheRequest {
    pub fn new(urls: impl IntoIterator<Item = String>) -> Self {
        let mut seen = Vec::new();
        for url in urls {
            let url = url.trim();
            if url.is_empty() {
                continue;
            }
            if !seen.iter().any(|existing| existing == url) {
                seen.push(url.to_string());
            }
        }
        Self { urls: seen }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}
