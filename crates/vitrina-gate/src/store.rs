//! File-backed SessionStore implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use vitrina_core::{Error, Result, session::SessionRecord, session_store::SessionStore};

/// File-backed session store
///
/// Persists the granted session as a single JSON document on disk. Reads are
/// forgiving: a missing, unreadable or malformed file is treated as "no
/// stored session", so a corrupt record can never lock the kiosk out of a
/// fresh probe.
#[derive(Debug)]
pub struct FileSessionStore {
    /// Path to the session file
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file-backed session store
    ///
    /// # Arguments
    /// * `path` - Path to the session JSON file (tilde expanded)
    ///
    /// # Errors
    /// - `Error::Config` if the path starts with `~` and no home directory
    ///   can be determined
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        // Expand tilde if present
        let path = match path.to_str().and_then(|s| s.strip_prefix("~/")) {
            Some(stripped) => dirs::home_dir()
                .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?
                .join(stripped),
            None => path,
        };

        Ok(Self { path })
    }

    /// The resolved path of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read session file {:?}: {}", self.path, e);
                return Ok(None);
            }
        };

        match serde_json::from_str::<SessionRecord>(&contents) {
            Ok(record) => {
                debug!("Loaded stored session from {:?}", self.path);
                Ok(Some(record))
            }
            Err(e) => {
                warn!("Discarding malformed session file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string(record)?;
        std::fs::write(&self.path, contents)?;

        debug!("Persisted session to {:?}", self.path);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared stored session at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
