//! Image Cache Coordinator
//!
//! Offline image caching for the kiosk, split across a channel boundary:
//!
//! - `protocol` defines the wire messages exchanged with the caching agent
//! - `CachingAgent` is the background half: it fetches and stores image
//!   bodies on request, best-effort
//! - `ImageStore` is the dedicated on-disk store, keyed by URL hash
//! - `ImageService` serves images cache-first with network fetch-through
//! - `ImageCacheCoordinator` is the page-side half that asks the agent to
//!   pre-populate or clear the store

pub mod agent;
pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod service;
pub mod store;

pub use agent::CachingAgent;
pub use coordinator::ImageCacheCoordinator;
pub use error::{CacheError, Result};
pub use protocol::{AgentMessage, AgentReply, AgentRequest, ImageCacheRequest};
pub use service::ImageService;
pub use store::{ImageMeta, ImageStore};
