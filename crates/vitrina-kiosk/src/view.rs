//! View states and the render boundary
//!
//! The controller never draws anything. It folds every input into a
//! `ViewState` and hands it to a `ViewSink`; the sink decides what a state
//! looks like. The stock sink renders to the structured log, which is what
//! a headless kiosk box wants.

use std::sync::Arc;
use tracing::{info, warn};

use vitrina_catalog::ProductCard;
use vitrina_gate::{DenialReason, ExpiryPhase, PlatformSignature};

/// Everything the kiosk screen can show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Probe or session restore in progress
    CheckingLocation,
    /// Access denied; the message is the classified denial text
    Blocked {
        message: String,
        retry_offered: bool,
        settings_help: bool,
    },
    /// Session cap fired; the teardown sequence is running
    SessionExpired { phase: ExpiryPhase },
    /// Granted, no query yet
    Prompt,
    /// A query is pending or a load is running
    Searching,
    Results(Vec<ProductCard>),
    NoResults,
    /// No connectivity and nothing cached to show
    Offline,
    /// The price list could not be fetched
    LoadFailed,
    /// Operator-requested cache rebuild in progress
    RefreshingImages,
}

impl ViewState {
    /// Fold a denial into its screen, message included
    pub fn blocked_for(reason: &DenialReason) -> Self {
        ViewState::Blocked {
            message: reason.to_string(),
            retry_offered: reason.is_retryable(),
            settings_help: reason.offers_settings_help(),
        }
    }
}

/// Render boundary between the controller and whatever draws the screen
pub trait ViewSink: Send + Sync {
    fn render(&self, state: &ViewState);

    /// Transient operator notice outside the main view, alert-style
    fn notify(&self, message: &str);
}

impl<T: ViewSink + ?Sized> ViewSink for Arc<T> {
    fn render(&self, state: &ViewState) {
        (**self).render(state);
    }

    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

/// Sink that renders into the structured log
#[derive(Debug, Default, Clone)]
pub struct LogViewSink;

impl ViewSink for LogViewSink {
    fn render(&self, state: &ViewState) {
        match state {
            ViewState::CheckingLocation => info!("Checking location..."),
            ViewState::Blocked {
                message,
                retry_offered,
                settings_help,
            } => {
                warn!(retry_offered, "Access blocked: {}", message);
                if *settings_help {
                    // No user agent on a native kiosk; the OS name is
                    // signature enough to pick the right settings walk
                    let guidance = PlatformSignature::detect(std::env::consts::OS).guidance();
                    for step in guidance.steps {
                        info!("  {}", step);
                    }
                    info!("  ({})", guidance.hint);
                }
            }
            ViewState::SessionExpired { phase } => warn!(?phase, "Session expired"),
            ViewState::Prompt => info!("Ready for search"),
            ViewState::Searching => info!("Searching..."),
            ViewState::Results(cards) => {
                info!(count = cards.len(), "Search results");
                for card in cards {
                    info!("  {} | {} | {}", card.code, card.name, card.price);
                }
            }
            ViewState::NoResults => info!("No products matched"),
            ViewState::Offline => warn!("Offline, price list unavailable"),
            ViewState::LoadFailed => warn!("Price list load failed"),
            ViewState::RefreshingImages => info!("Refreshing image cache..."),
        }
    }

    fn notify(&self, message: &str) {
        info!("{}", message);
    }
}
