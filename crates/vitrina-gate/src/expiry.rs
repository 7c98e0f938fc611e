//! Session expiry countdown and tab teardown
//!
//! A granted session is hard-capped: `spawn_expiry_task` arms a one-shot
//! countdown that clears the persisted session and notifies the controller
//! when the cap is reached. `run_expiry_teardown` then walks the tab through
//! the expiry screens and finally out of the catalog.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use vitrina_core::{context::BrowsingContext, session_store::SessionStore};

/// Phase of the expiry teardown currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPhase {
    /// The "session expired" notice
    Notice,
    /// Close was refused; the operator must close the tab by hand
    ManualClose,
}

/// How the teardown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// The embedding context accepted the close request
    Closed,
    /// Close was refused; the tab was parked on a blank page
    Blanked,
}

/// Delays between the steps of the expiry teardown sequence
#[derive(Debug, Clone, Copy)]
pub struct TeardownDelays {
    /// How long the expired notice stays up before the close attempt
    pub expired_display: Duration,
    /// Pause between a refused close and the manual-close instruction
    pub close_check: Duration,
    /// How long the manual-close instruction stays up before blanking
    pub blank_redirect: Duration,
}

impl Default for TeardownDelays {
    fn default() -> Self {
        Self {
            expired_display: Duration::from_millis(2000),
            close_check: Duration::from_millis(500),
            blank_redirect: Duration::from_millis(3000),
        }
    }
}

/// Handle for the background expiry countdown
pub struct ExpiryTask {
    shutdown_tx: mpsc::Sender<()>,
    expired_rx: watch::Receiver<bool>,
}

impl ExpiryTask {
    /// Disarm the countdown without firing (tab closed normally)
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    /// Receiver that flips to `true` when the cap fires
    pub fn expired(&self) -> watch::Receiver<bool> {
        self.expired_rx.clone()
    }
}

/// Arm the per-grant session cap
///
/// After `max_session_time` the task clears the persisted session, so a
/// reload cannot resurrect the grant, and flips the returned watch channel.
/// Returns an ExpiryTask handle that can disarm the countdown.
pub fn spawn_expiry_task(
    store: Arc<dyn SessionStore>,
    max_session_time: Duration,
) -> ExpiryTask {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    let (expired_tx, expired_rx) = watch::channel(false);

    tokio::spawn(async move {
        info!("Session cap armed for {:?}", max_session_time);

        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Expiry countdown disarmed");
            }
            _ = sleep(max_session_time) => {
                warn!("Session time cap reached, expiring");

                if let Err(e) = store.clear().await {
                    warn!("Failed to clear stored session on expiry: {}", e);
                }

                let _ = expired_tx.send(true);
            }
        }
    });

    ExpiryTask {
        shutdown_tx,
        expired_rx,
    }
}

/// Walk the tab through the expiry teardown
///
/// Shows the expired notice, waits, then asks the embedding context to close
/// the tab. Most contexts refuse a script-initiated close, in which case the
/// operator gets a manual-close instruction and the tab is finally parked on
/// a blank page as containment.
pub async fn run_expiry_teardown<F>(
    context: &dyn BrowsingContext,
    delays: &TeardownDelays,
    mut show: F,
) -> TeardownOutcome
where
    F: FnMut(ExpiryPhase),
{
    show(ExpiryPhase::Notice);
    sleep(delays.expired_display).await;

    if context.try_close().await {
        info!("Tab closed after session expiry");
        return TeardownOutcome::Closed;
    }

    debug!("Close request refused by the embedding context");
    sleep(delays.close_check).await;

    show(ExpiryPhase::ManualClose);
    sleep(delays.blank_redirect).await;

    context.navigate_blank().await;
    info!("Tab parked on blank page after refused close");
    TeardownOutcome::Blanked
}
