//! Location provider seam
//!
//! One `probe` maps to a single invocation of the device's location
//! capability. Probes are issued on activation and on explicit operator
//! retry; never automatically.

use std::time::Duration;

use thiserror::Error;

use crate::geo::GeoFix;

/// Why a proximity probe produced no usable fix.
///
/// Every variant carries a distinct operator-facing message; `Unsupported`
/// is fatal for the session, the rest are recoverable through explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The device has no location capability at all.
    #[error("location capability is not available on this device")]
    Unsupported,

    /// The operator (or platform policy) refused the location permission.
    #[error("location permission was denied")]
    PermissionDenied,

    /// The capability exists but no position could be determined.
    #[error("current position is unavailable")]
    PositionUnavailable,

    /// No fix arrived within the probe timeout.
    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Options for a single probe, mirroring the host position API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Request the most accurate fix the device can produce.
    pub high_accuracy: bool,
    /// Give up after this long without a fix.
    pub timeout: Duration,
    /// Accept a cached fix no older than this. Zero forces a fresh fix.
    pub maximum_age: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

impl ProbeOptions {
    /// Default options with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// The device's location capability.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// Issue one proximity probe.
    async fn probe(&self, options: &ProbeOptions) -> Result<GeoFix, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_force_fresh_high_accuracy_fix() {
        let options = ProbeOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn test_probe_errors_have_distinct_messages() {
        let messages = [
            ProbeError::Unsupported.to_string(),
            ProbeError::PermissionDenied.to_string(),
            ProbeError::PositionUnavailable.to_string(),
            ProbeError::Timeout.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
