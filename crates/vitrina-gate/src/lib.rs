//! Session Gate
//!
//! Location-gated access control for the kiosk:
//!
//! - `AccessGate` drives the activation state machine: restore a stored
//!   session or probe the device position and compare it against the
//!   showroom radius
//! - `FileSessionStore` persists the granted session on disk
//! - `ExpiryTask` force-expires a granted session after the configured
//!   maximum and runs the tab teardown sequence
//! - `platform` maps coarse user-agent signatures to settings guidance for
//!   permission-denied recovery

pub mod expiry;
pub mod gate;
pub mod platform;
pub mod store;

pub use expiry::{
    ExpiryPhase, ExpiryTask, TeardownDelays, TeardownOutcome, run_expiry_teardown,
    spawn_expiry_task,
};
pub use gate::{AccessGate, AccessState, DenialReason, GateConfig};
pub use platform::{Browser, Os, PlatformSignature, SettingsGuidance};
pub use store::FileSessionStore;
