//! Outbound HTTP client construction
//!
//! One pooled client serves both the sheet fetches and the image caching
//! agent, so the pool settings cover both workloads.

use crate::{CatalogError, Result};
use reqwest::Client;
use std::time::Duration;

/// Connection settings for the kiosk's outbound HTTP client.
///
/// Sheet payloads and product images are small; the defaults assume a
/// showroom connection where anything slower is a network worth giving
/// up on rather than waiting out.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request deadline, headers through body.
    pub timeout: Duration,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Idle connections kept warm per host. The kiosk talks to two
    /// hosts at most: the sheet endpoint and the image origin.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header sent on every request.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 8,
            user_agent: format!("Vitrina/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build the shared pooled client from `config`.
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        // Expire pooled connections before the origin closes them on us
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
        .map_err(|e| CatalogError::Config(format!("could not build HTTP client: {}", e)))
}
