//! Page-side cache coordinator
//!
//! The coordinator is the half the kiosk controller talks to. It may run
//! without an agent at all (nothing registered yet, or caching disabled), in
//! which case background pre-caching silently degrades while the explicit
//! operator-invoked refresh fails loudly.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::protocol::{AgentMessage, AgentReply, AgentRequest, ImageCacheRequest};

/// Client handle for the caching agent
#[derive(Debug, Clone)]
pub struct ImageCacheCoordinator {
    agent_tx: Option<mpsc::Sender<AgentRequest>>,
}

impl ImageCacheCoordinator {
    /// Coordinator wired to a running agent
    pub fn new(agent_tx: mpsc::Sender<AgentRequest>) -> Self {
        Self {
            agent_tx: Some(agent_tx),
        }
    }

    /// Coordinator with no agent registered
    pub fn detached() -> Self {
        Self { agent_tx: None }
    }

    pub fn has_agent(&self) -> bool {
        self.agent_tx.is_some()
    }

    /// Ask the agent to pre-cache `request`
    ///
    /// An empty set resolves immediately without sending anything, and a
    /// missing agent downgrades the call to a no-op. Both are normal for
    /// opportunistic background population.
    pub async fn cache_images(&self, request: &ImageCacheRequest) -> Result<()> {
        if request.is_empty() {
            debug!("No image URLs to cache");
            return Ok(());
        }

        if self.agent_tx.is_none() {
            debug!("No caching agent registered, skipping image pre-cache");
            return Ok(());
        }

        let reply = self
            .request(AgentMessage::CacheImages {
                image_urls: request.urls().to_vec(),
            })
            .await?;
        into_result(reply)
    }

    /// Ask the agent to drop the entire image store
    pub async fn clear(&self) -> Result<()> {
        let reply = self.request(AgentMessage::ClearImageCache).await?;
        into_result(reply)
    }

    /// Operator-invoked rebuild: clear, then re-cache `request`
    ///
    /// Unlike background population this surfaces every failure, including
    /// the absence of an agent, and aborts on the first failed step.
    pub async fn refresh(&self, request: &ImageCacheRequest) -> Result<()> {
        if self.agent_tx.is_none() {
            return Err(CacheError::NoAgent);
        }

        info!(count = request.len(), "Refreshing image cache");
        self.clear().await?;
        self.cache_images(request).await?;

        info!("Image cache refresh complete");
        Ok(())
    }

    async fn request(&self, message: AgentMessage) -> Result<AgentReply> {
        let Some(tx) = &self.agent_tx else {
            return Err(CacheError::NoAgent);
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(AgentRequest {
            message,
            reply: reply_tx,
        })
        .await
        .map_err(|_| CacheError::AgentGone)?;

        reply_rx.await.map_err(|_| CacheError::AgentGone)
    }
}

fn into_result(reply: AgentReply) -> Result<()> {
    if reply.success {
        Ok(())
    } else {
        Err(CacheError::Operation(
            reply
                .error
                .unwrap_or_else(|| "agent reported failure".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted agent stand-in recording every message it receives
    fn scripted_agent(
        replies: Vec<AgentReply>,
    ) -> (mpsc::Sender<AgentRequest>, Arc<Mutex<Vec<AgentMessage>>>) {
        let (tx, mut rx) = mpsc::channel::<AgentRequest>(8);
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_in = received.clone();

        tokio::spawn(async move {
            let mut replies = replies.into_iter();
            while let Some(request) = rx.recv().await {
                received_in.lock().unwrap().push(request.message);
                let reply = replies.next().unwrap_or_else(AgentReply::ok);
                let _ = request.reply.send(reply);
            }
        });

        (tx, received)
    }

    fn urls(list: &[&str]) -> ImageCacheRequest {
        ImageCacheRequest::new(list.iter().map(|s| s.to_string()))
    }

    #[tokio::test]
    async fn test_empty_set_sends_nothing() {
        let (tx, received) = scripted_agent(vec![]);
        let coordinator = ImageCacheCoordinator::new(tx);

        coordinator
            .cache_images(&ImageCacheRequest::default())
            .await
            .unwrap();

        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_images_without_agent_is_silent() {
        let coordinator = ImageCacheCoordinator::detached();
        assert!(!coordinator.has_agent());

        coordinator.cache_images(&urls(&["a.jpg"])).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_without_agent_is_an_error() {
        let coordinator = ImageCacheCoordinator::detached();

        let err = coordinator.refresh(&urls(&["a.jpg"])).await.unwrap_err();
        assert!(matches!(err, CacheError::NoAgent));
    }

    #[tokio::test]
    async fn test_cache_images_sends_expected_message() {
        let (tx, received) = scripted_agent(vec![AgentReply::ok()]);
        let coordinator = ImageCacheCoordinator::new(tx);

        coordinator
            .cache_images(&urls(&["a.jpg", "b.jpg"]))
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(
            *received,
            vec![AgentMessage::CacheImages {
                image_urls: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_reply_maps_to_operation_error() {
        let (tx, _received) = scripted_agent(vec![AgentReply::failed("disk full")]);
        let coordinator = ImageCacheCoordinator::new(tx);

        let err = coordinator.cache_images(&urls(&["a.jpg"])).await.unwrap_err();
        let CacheError::Operation(message) = err else {
            panic!("expected operation error, got {:?}", err);
        };
        assert_eq!(message, "disk full");
    }

    #[tokio::test]
    async fn test_refresh_runs_clear_then_cache() {
        let (tx, received) = scripted_agent(vec![AgentReply::ok(), AgentReply::ok()]);
        let coordinator = ImageCacheCoordinator::new(tx);

        coordinator.refresh(&urls(&["a.jpg"])).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], AgentMessage::ClearImageCache);
        assert_eq!(
            received[1],
            AgentMessage::CacheImages {
                image_urls: vec!["a.jpg".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_aborts_after_failed_clear() {
        let (tx, received) = scripted_agent(vec![AgentReply::failed("store busy")]);
        let coordinator = ImageCacheCoordinator::new(tx);

        let err = coordinator.refresh(&urls(&["a.jpg"])).await.unwrap_err();
        assert!(matches!(err, CacheError::Operation(_)));

        // The failed clear stopped the sequence
        let received = received.lock().unwrap();
        assert_eq!(*received, vec![AgentMessage::ClearImageCache]);
    }

    #[tokio::test]
    async fn test_dead_agent_maps_to_agent_gone() {
        let (tx, rx) = mpsc::channel::<AgentRequest>(1);
        drop(rx);

        let coordinator = ImageCacheCoordinator::new(tx);
        let err = coordinator.cache_images(&urls(&["a.jpg"])).await.unwrap_err();
        assert!(matches!(err, CacheError::AgentGone));
    }
}
