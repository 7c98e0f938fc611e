//! On-disk image store
//!
//! A directory dedicated to product images, one entry per URL. Entries are
//! keyed by the SHA-256 of the URL so arbitrary URLs map onto flat, safe
//! file names: `{key}.bin` holds the body, `{key}.json` the metadata. An
//! entry exists once its metadata file does.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CacheError, Result};

/// Metadata sidecar for one cached image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    /// Source URL the body was fetched from
    pub url: String,
    /// Content type reported by the origin, if any
    pub content_type: Option<String>,
    /// Body length in bytes
    pub content_length: u64,
}

/// Disk-backed image store
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

impl ImageStore {
    /// Create a store rooted at `root` (tilde expanded). The directory is
    /// created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        // Expand tilde if present
        let root = match root.to_str().and_then(|s| s.strip_prefix("~/")) {
            Some(stripped) => dirs::home_dir()
                .ok_or_else(|| {
                    CacheError::Io(std::io::Error::other(
                        "could not determine home directory",
                    ))
                })?
                .join(stripped),
            None => root,
        };

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.bin", key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Store the body for `url`, replacing any previous entry
    pub fn put(&self, url: &str, content_type: Option<&str>, body: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let key = cache_key(url);
        std::fs::write(self.body_path(&key), body)?;

        let meta = ImageMeta {
            url: url.to_string(),
            content_type: content_type.map(str::to_string),
            content_length: body.len() as u64,
        };
        std::fs::write(self.meta_path(&key), serde_json::to_vec(&meta)?)?;

        debug!(url, bytes = body.len(), "Stored image");
        Ok(())
    }

    /// Fetch the cached body and metadata for `url`, if present
    pub fn get(&self, url: &str) -> Result<Option<(ImageMeta, Vec<u8>)>> {
        let key = cache_key(url);
        let meta_path = self.meta_path(&key);

        if !meta_path.exists() {
            return Ok(None);
        }

        let meta: ImageMeta = serde_json::from_slice(&std::fs::read(&meta_path)?)?;
        let body = match std::fs::read(self.body_path(&key)) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        Ok(Some((meta, body)))
    }

    /// Whether an entry for `url` exists
    pub fn contains(&self, url: &str) -> bool {
        self.meta_path(&cache_key(url)).exists()
    }

    /// URLs of every stored entry, in no particular order
    pub fn urls(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut urls = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let meta: ImageMeta = serde_json::from_slice(&std::fs::read(&path)?)?;
            urls.push(meta.url);
        }

        Ok(urls)
    }

    /// Delete the whole store directory
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => {
                info!(root = %self.root.display(), "Cleared image store");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }
}
