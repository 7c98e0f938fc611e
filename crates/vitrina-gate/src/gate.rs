//! Access gate state machine
//!
//! Activation flow for the kiosk tab: restore a stored session when it is
//! still inside the validity window, otherwise probe the device position and
//! compare the fix against the showroom radius. Denials are classified so the
//! UI can offer the right recovery affordance.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use vitrina_core::{
    geo::{GeoCheckResult, GeoPoint},
    location::{LocationProvider, ProbeError, ProbeOptions},
    session::SessionRecord,
    session_store::SessionStore,
};

/// Why access was denied
///
/// Each reason renders a distinct user-facing message. `Unsupported` is fatal
/// for the tab; every other reason can be retried by the operator.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DenialReason {
    /// The device has no location capability at all
    #[error("Location services are not supported on this device")]
    Unsupported,

    /// The operator (or platform policy) refused the location permission
    #[error("Location permission was denied. Enable it in your device settings to continue")]
    PermissionDenied,

    /// The provider could not produce a fix
    #[error("Your location could not be determined")]
    PositionUnavailable,

    /// No fix arrived within the probe timeout
    #[error("Timed out while checking your location")]
    Timeout,

    /// A fix arrived but it is farther from the showroom than the radius
    #[error("You are outside the showroom area ({} m away)", .distance_m.round())]
    OutOfRange { distance_m: f64 },
}

impl DenialReason {
    /// Whether the UI should offer a retry affordance
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DenialReason::Unsupported)
    }

    /// Whether the UI should offer settings-navigation guidance
    pub fn offers_settings_help(&self) -> bool {
        matches!(self, DenialReason::PermissionDenied)
    }
}

impl From<ProbeError> for DenialReason {
    fn from(e: ProbeError) -> Self {
        match e {
            ProbeError::Unsupported => DenialReason::Unsupported,
            ProbeError::PermissionDenied => DenialReason::PermissionDenied,
            ProbeError::PositionUnavailable => DenialReason::PositionUnavailable,
            ProbeError::Timeout => DenialReason::Timeout,
        }
    }
}

/// Gate state for one tab activation
#[derive(Debug, Clone, PartialEq)]
pub enum AccessState {
    /// Probe or session restore in progress
    Checking,
    /// Access granted, catalog usable
    Granted { session: SessionRecord },
    /// Access denied with a classified reason
    Denied { reason: DenialReason },
    /// The per-grant time cap fired; terminal for this tab
    Expired,
}

/// Gate configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Showroom reference point
    pub target: GeoPoint,
    /// Acceptance radius around the target, in meters
    pub radius_m: f64,
    /// How long a stored grant stays reusable without a fresh probe
    pub session_duration: Duration,
    /// Hard cap on a single granted session
    pub max_session_time: Duration,
    /// Options passed to the location provider
    pub probe_options: ProbeOptions,
}

impl GateConfig {
    /// Gate config for a showroom at `target` with default windows:
    /// 200 m radius, 8 h session validity, 60 min per-grant cap.
    pub fn new(target: GeoPoint) -> Self {
        Self {
            target,
            radius_m: 200.0,
            session_duration: Duration::from_secs(8 * 60 * 60),
            max_session_time: Duration::from_secs(60 * 60),
            probe_options: ProbeOptions::default(),
        }
    }
}

/// Location-gated access control
///
/// Owns the decision of whether this tab may show the catalog. Activation
/// first consults the session store, then falls back to a fresh probe. A
/// fresh grant is persisted so reloads inside the validity window skip the
/// probe entirely.
pub struct AccessGate {
    provider: Arc<dyn LocationProvider>,
    store: Arc<dyn SessionStore>,
    config: GateConfig,
}

impl AccessGate {
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        store: Arc<dyn SessionStore>,
        config: GateConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the activation flow: stored session, else probe.
    ///
    /// Also the retry path: an operator retry from a denied screen reissues
    /// exactly this flow. Never transitions out of `Expired`; callers tear
    /// the tab down instead of re-activating.
    pub async fn activate(&self) -> AccessState {
        if let Some(session) = self.stored_session().await
            && session.is_valid(self.config.session_duration)
        {
            info!(granted_at = session.timestamp, "Reusing stored session");
            return AccessState::Granted { session };
        }

        self.probe_and_grant().await
    }

    /// Force-expire the current grant: clear persisted state and report
    /// the terminal state.
    pub async fn expire(&self) -> AccessState {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear stored session: {}", e);
        }

        info!("Session expired");
        AccessState::Expired
    }

    async fn stored_session(&self) -> Option<SessionRecord> {
        match self.store.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to load stored session: {}", e);
                None
            }
        }
    }

    async fn probe_and_grant(&self) -> AccessState {
        let fix = match self.provider.probe(&self.config.probe_options).await {
            Ok(fix) => fix,
            Err(e) => {
                warn!("Location probe failed: {}", e);
                return AccessState::Denied { reason: e.into() };
            }
        };

        let check = GeoCheckResult::evaluate(fix, self.config.target, self.config.radius_m);

        if !check.within_range() {
            info!(
                distance_m = check.distance_m,
                radius_m = check.radius_m,
                "Device is outside the showroom radius"
            );
            return AccessState::Denied {
                reason: DenialReason::OutOfRange {
                    distance_m: check.distance_m,
                },
            };
        }

        let session = SessionRecord::granted_now(fix.point);

        // A broken store must not block a verified operator; the grant just
        // won't survive a reload.
        if let Err(e) = self.store.save(&session).await {
            warn!("Failed to persist session: {}", e);
        }

        info!(
            distance_m = check.distance_m,
            accuracy_m = fix.accuracy_m,
            "Access granted"
        );
        AccessState::Granted { session }
    }
}
