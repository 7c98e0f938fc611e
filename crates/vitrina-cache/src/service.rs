//! Cache-first image serving
//!
//! The serve path the UI goes through for every product image: cached
//! entries come straight off disk with no network round-trip, anything else
//! is fetched, stored and returned in one pass.

use reqwest::Client;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{ImageMeta, ImageStore};

pub struct ImageService {
    client: Client,
    store: ImageStore,
}

impl ImageService {
    pub fn new(client: Client, store: ImageStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Serve the image at `url`, cache-first with network fetch-through
    ///
    /// # Errors
    /// - `CacheError::Http` if an uncached URL cannot be fetched
    /// - `CacheError::UpstreamStatus` if the origin answers non-2xx
    /// - `CacheError::Io` / `CacheError::Serialization` on store failures
    pub async fn serve(&self, url: &str) -> Result<(ImageMeta, Vec<u8>)> {
        if let Some(entry) = self.store.get(url)? {
            debug!(url, "Image served from cache");
            return Ok(entry);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        self.store.put(url, content_type.as_deref(), &body)?;
        debug!(url, bytes = body.len(), "Image fetched through to cache");

        Ok((
            ImageMeta {
                url: url.to_string(),
                content_type,
                content_length: body.len() as u64,
            },
            body.to_vec(),
        ))
    }
}
