//! Background caching agent
//!
//! The agent owns the image store and a shared HTTP client, and serves the
//! wire protocol from `protocol`. Every incoming request runs as its own
//! task, so two overlapping CACHE_IMAGES runs race per URL and the last
//! write wins. Individual fetch failures never fail the run: the reply says
//! the run settled, not that every image landed.

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::protocol::{AgentMessage, AgentReply, AgentRequest};
use crate::store::ImageStore;

/// Handle to the spawned caching agent
pub struct CachingAgent {
    tx: mpsc::Sender<AgentRequest>,
    worker_handle: Option<JoinHandle<()>>,
}

impl CachingAgent {
    /// Spawn the agent worker over `store`, fetching with `client`
    pub fn spawn(client: Client, store: ImageStore) -> Self {
        let (tx, rx) = mpsc::channel(16);

        let worker_handle = tokio::spawn(async move {
            Self::worker_loop(rx, client, store).await;
        });

        Self {
            tx,
            worker_handle: Some(worker_handle),
        }
    }

    /// Sender half, for registering this agent with a coordinator
    pub fn sender(&self) -> mpsc::Sender<AgentRequest> {
        self.tx.clone()
    }

    /// Gracefully shut down once every sender clone is gone
    ///
    /// Consumes the handle, dropping its own sender; the worker exits when
    /// the last coordinator-held clone is dropped as well.
    pub async fn shutdown(mut self) {
        let worker_handle = self.worker_handle.take();
        drop(self);

        if let Some(handle) = worker_handle
            && handle.await.is_err()
        {
            warn!("Caching agent worker panicked");
        }

        info!("Caching agent shutdown complete");
    }

    async fn worker_loop(mut rx: mpsc::Receiver<AgentRequest>, client: Client, store: ImageStore) {
        while let Some(request) = rx.recv().await {
            let client = client.clone();
            let store = store.clone();

            tokio::spawn(async move {
                let reply = handle_message(&client, &store, request.message).await;

                // The requester may have given up waiting; that is its call.
                let _ = request.reply.send(reply);
            });
        }

        debug!("Caching agent worker loop exited");
    }
}

async fn handle_message(client: &Client, store: &ImageStore, message: AgentMessage) -> AgentReply {
    match message {
        AgentMessage::CacheImages { image_urls } => {
            cache_images(client, store, &image_urls).await
        }
        AgentMessage::ClearImageCache => match store.clear() {
            Ok(()) => AgentReply::ok(),
            Err(e) => {
                warn!("Image store clear failed: {}", e);
                AgentReply::failed(e.to_string())
            }
        },
    }
}

async fn cache_images(client: &Client, store: &ImageStore, urls: &[String]) -> AgentReply {
    let fetches = urls.iter().map(|url| fetch_and_store(client, store, url));
    let results = futures::future::join_all(fetches).await;

    let stored = results.into_iter().filter(|stored| *stored).count();
    info!(requested = urls.len(), stored, "Image pre-cache settled");

    AgentReply::ok()
}

/// Fetch one URL into the store. Best-effort: failures are logged, never
/// propagated, and never clobber an existing entry.
async fn fetch_and_store(client: &Client, store: &ImageStore, url: &str) -> bool {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url, "Image fetch failed: {}", e);
            return false;
        }
    };

    if !response.status().is_success() {
        warn!(url, status = %response.status(), "Image fetch returned non-success status");
        return false;
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(url, "Image body read failed: {}", e);
            return false;
        }
    };

    if let Err(e) = store.put(url, content_type.as_deref(), &body) {
        warn!(url, "Image store write failed: {}", e);
        return false;
    }

    true
}
