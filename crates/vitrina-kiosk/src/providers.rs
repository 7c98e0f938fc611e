//! Location providers for the kiosk host
//!
//! The gate only knows the `LocationProvider` seam; these are the concrete
//! sources the binary can wire behind it:
//!
//! - `CommandLocationProvider` shells out to a helper (e.g. `termux-location`
//!   on an Android tablet) and parses its JSON
//! - `FixedLocationProvider` answers with a configured position, for bench
//!   setups
//! - an unconfigured kiosk denies every probe as unsupported

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::{FixedPosition, LocationConfig};
use vitrina_core::geo::{GeoFix, GeoPoint};
use vitrina_core::location::{LocationProvider, ProbeError, ProbeOptions};

/// Pick the provider the config asks for
pub fn build_provider(config: &LocationConfig) -> Arc<dyn LocationProvider> {
    if let Some(fixed) = &config.fixed_position {
        info!(
            latitude = fixed.latitude,
            longitude = fixed.longitude,
            "Using fixed position"
        );
        Arc::new(FixedLocationProvider::from_position(fixed))
    } else if let Some(command) = &config.probe_command {
        Arc::new(CommandLocationProvider::new(command.clone()))
    } else {
        warn!("No probe source configured, every location check will be denied");
        Arc::new(UnsupportedLocationProvider)
    }
}

/// Probes by running a shell command that prints one JSON object:
/// `{"latitude": .., "longitude": .., "accuracy_m": ..}` (the
/// `termux-location` spelling `"accuracy"` is accepted too).
///
/// Exit code 127 means the helper is missing and maps to `Unsupported`;
/// a failure mentioning "permission" on stderr maps to `PermissionDenied`.
/// `high_accuracy` and `maximum_age` are the helper's own concern.
pub struct CommandLocationProvider {
    command: String,
}

#[derive(Debug, Deserialize)]
struct CommandFix {
    latitude: f64,
    longitude: f64,
    #[serde(default, alias = "accuracy")]
    accuracy_m: f64,
}

impl CommandLocationProvider {
    pub fn new(command: String) -> Self {
        Self { command }
    }

    async fn run(&self, timeout: Duration) -> Result<GeoFix, ProbeError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Probe command failed to spawn: {}", e);
                return Err(ProbeError::Unsupported);
            }
            Err(_) => return Err(ProbeError::Timeout),
        };

        if !output.status.success() {
            if output.status.code() == Some(127) {
                warn!("Probe command not found: {}", self.command);
                return Err(ProbeError::Unsupported);
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = ?output.status.code(), "Probe command failed: {}", stderr.trim());
            if stderr.to_ascii_lowercase().contains("permission") {
                return Err(ProbeError::PermissionDenied);
            }
            return Err(ProbeError::PositionUnavailable);
        }

        let fix: CommandFix = serde_json::from_slice(&output.stdout).map_err(|e| {
            warn!("Probe command printed unparseable output: {}", e);
            ProbeError::PositionUnavailable
        })?;

        Ok(GeoFix {
            point: GeoPoint::new(fix.latitude, fix.longitude),
            accuracy_m: fix.accuracy_m,
        })
    }
}

#[async_trait]
impl LocationProvider for CommandLocationProvider {
    async fn probe(&self, options: &ProbeOptions) -> Result<GeoFix, ProbeError> {
        self.run(options.timeout).await
    }
}

/// Always answers with the same position
pub struct FixedLocationProvider {
    fix: GeoFix,
}

impl FixedLocationProvider {
    pub fn new(fix: GeoFix) -> Self {
        Self { fix }
    }

    pub fn from_position(position: &FixedPosition) -> Self {
        Self::new(GeoFix {
            point: GeoPoint::new(position.latitude, position.longitude),
            accuracy_m: position.accuracy_m,
        })
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn probe(&self, _options: &ProbeOptions) -> Result<GeoFix, ProbeError> {
        Ok(self.fix)
    }
}

struct UnsupportedLocationProvider;

#[async_trait]
impl LocationProvider for UnsupportedLocationProvider {
    async fn probe(&self, _options: &ProbeOptions) -> Result<GeoFix, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}
