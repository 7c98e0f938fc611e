//! Kiosk controller
//!
//! Single-threaded event loop tying the gate, the catalog and the image
//! cache together. All input funnels into one `KioskEvent` channel; the
//! controller folds each event into the next `ViewState` and hands it to
//! the sink. Two resettable timers run alongside: the search debounce and
//! the inactivity reload. The per-grant session cap is observed through the
//! expiry watch channel and ends the loop for good.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::UiConfig;
use crate::timer::TaskSlot;
use crate::view::{ViewSink, ViewState};
use vitrina_cache::{ImageCacheCoordinator, ImageCacheRequest};
use vitrina_catalog::{ProductCard, ProductTable, SheetClient};
use vitrina_core::context::BrowsingContext;
use vitrina_core::session_store::SessionStore;
use vitrina_gate::{AccessGate, AccessState, ExpiryTask, run_expiry_teardown, spawn_expiry_task};

/// One on-screen keyboard keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
}

/// Everything the outside world can do to a running kiosk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskEvent {
    Key(Key),
    /// Clear the query and drop back to the prompt
    Clear,
    /// Operator retry from a denied screen
    Retry,
    /// Operator-menu image cache rebuild
    RefreshImages,
    /// Connectivity changed
    Connectivity(bool),
    /// Any other interaction; only feeds the inactivity countdown
    Touch,
}

/// Timer fires routed back into the loop
enum InternalEvent {
    SearchDue { query: String },
    InactivityElapsed,
}

enum Phase {
    Blocked,
    Active,
}

enum LoopInput {
    External(Option<KioskEvent>),
    Internal(InternalEvent),
    Expired,
}

pub struct KioskController {
    gate: AccessGate,
    store: Arc<dyn SessionStore>,
    sheet: SheetClient,
    coordinator: ImageCacheCoordinator,
    context: Arc<dyn BrowsingContext>,
    sink: Arc<dyn ViewSink>,
    ui: UiConfig,

    phase: Phase,
    table: ProductTable,
    query: String,
    online: bool,
    is_loading: bool,

    internal_tx: mpsc::Sender<InternalEvent>,
    internal_rx: mpsc::Receiver<InternalEvent>,
    search_slot: TaskSlot,
    inactivity_slot: TaskSlot,
    expiry: Option<ExpiryTask>,
}

impl KioskController {
    pub fn new(
        gate: AccessGate,
        store: Arc<dyn SessionStore>,
        sheet: SheetClient,
        coordinator: ImageCacheCoordinator,
        context: Arc<dyn BrowsingContext>,
        sink: Arc<dyn ViewSink>,
        ui: UiConfig,
    ) -> Self {
        let (internal_tx, internal_rx) = mpsc::channel(16);

        Self {
            gate,
            store,
            sheet,
            coordinator,
            context,
            sink,
            ui,
            phase: Phase::Blocked,
            table: ProductTable::new(),
            query: String::new(),
            online: true,
            is_loading: false,
            internal_tx,
            internal_rx,
            search_slot: TaskSlot::new(),
            inactivity_slot: TaskSlot::new(),
            expiry: None,
        }
    }

    /// Drive the kiosk until the session cap fires or the event source
    /// closes. The expiry teardown is terminal; a new controller means a
    /// new tab.
    pub async fn run(mut self, mut events: mpsc::Receiver<KioskEvent>) {
        self.begin_session().await;

        loop {
            let mut expired_rx = self.expiry.as_ref().map(|task| task.expired());

            let input = tokio::select! {
                maybe = events.recv() => LoopInput::External(maybe),
                Some(internal) = self.internal_rx.recv() => LoopInput::Internal(internal),
                _ = wait_expired(&mut expired_rx) => LoopInput::Expired,
            };

            match input {
                LoopInput::External(Some(event)) => self.handle_event(event).await,
                LoopInput::External(None) => {
                    info!("Event source closed, stopping kiosk");
                    if let Some(task) = self.expiry.take() {
                        task.shutdown().await;
                    }
                    return;
                }
                LoopInput::Internal(internal) => self.handle_internal(internal).await,
                LoopInput::Expired => {
                    self.finish_expired().await;
                    return;
                }
            }
        }
    }

    /// Fresh page state plus the activation flow
    async fn begin_session(&mut self) {
        self.query.clear();
        self.table = ProductTable::new();
        self.is_loading = false;
        self.search_slot.clear();

        self.activate().await;
    }

    async fn activate(&mut self) {
        self.sink.render(&ViewState::CheckingLocation);

        match self.gate.activate().await {
            AccessState::Granted { .. } => {
                self.phase = Phase::Active;
                self.rearm_expiry().await;
                self.reset_inactivity();
                self.sink.render(&ViewState::Prompt);
                self.load_data().await;
            }
            AccessState::Denied { reason } => {
                self.phase = Phase::Blocked;
                self.inactivity_slot.clear();
                self.sink.render(&ViewState::blocked_for(&reason));
            }
            state => debug!(?state, "Unexpected activation result"),
        }
    }

    /// Every grant restarts the session cap, a restored one included
    async fn rearm_expiry(&mut self) {
        if let Some(previous) = self.expiry.take() {
            previous.shutdown().await;
        }
        self.expiry = Some(spawn_expiry_task(
            self.store.clone(),
            self.gate.config().max_session_time,
        ));
    }

    async fn handle_event(&mut self, event: KioskEvent) {
        match event {
            KioskEvent::Key(key) => {
                self.reset_inactivity();
                if matches!(self.phase, Phase::Blocked) {
                    return;
                }
                match key {
                    Key::Char(c) => self.query.push(c),
                    Key::Backspace => {
                        self.query.pop();
                    }
                }
                self.schedule_search();
            }
            KioskEvent::Clear => {
                self.reset_inactivity();
                if matches!(self.phase, Phase::Blocked) {
                    return;
                }
                self.query.clear();
                self.search_slot.clear();
                self.sink.render(&ViewState::Prompt);
            }
            KioskEvent::Retry => {
                self.reset_inactivity();
                if matches!(self.phase, Phase::Blocked) {
                    self.activate().await;
                } else {
                    debug!("Retry ignored outside a blocked screen");
                }
            }
            KioskEvent::RefreshImages => {
                self.reset_inactivity();
                if matches!(self.phase, Phase::Active) {
                    self.refresh_images().await;
                }
            }
            KioskEvent::Connectivity(online) => self.set_online(online).await,
            KioskEvent::Touch => self.reset_inactivity(),
        }
    }

    async fn handle_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::SearchDue { query } => {
                if query != self.query.trim() {
                    debug!("Stale search fire ignored");
                    return;
                }
                if self.table.is_empty() {
                    // Load first; the live query runs right after
                    self.load_data().await;
                } else {
                    self.render_search();
                }
            }
            InternalEvent::InactivityElapsed => {
                info!("Inactivity timeout, reloading");
                self.context.reload().await;
                self.begin_session().await;
            }
        }
    }

    /// Arm the debounce for the current query, superseding any pending fire
    fn schedule_search(&mut self) {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            self.search_slot.clear();
            self.sink.render(&ViewState::Prompt);
            return;
        }

        self.sink.render(&ViewState::Searching);

        let tx = self.internal_tx.clone();
        let debounce = self.ui.search_debounce();
        self.search_slot.replace(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let _ = tx.send(InternalEvent::SearchDue { query }).await;
        }));
    }

    fn reset_inactivity(&mut self) {
        if !matches!(self.phase, Phase::Active) {
            return;
        }
        let tx = self.internal_tx.clone();
        let timeout = self.ui.inactivity_timeout();
        self.inactivity_slot.replace(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(InternalEvent::InactivityElapsed).await;
        }));
    }

    async fn load_data(&mut self) {
        if self.is_loading {
            debug!("Load already in progress");
            return;
        }
        if !self.online {
            self.sink.render(&ViewState::Offline);
            return;
        }

        self.is_loading = true;
        info!("Loading price list");

        let result = self.sheet.fetch_rows().await;
        self.is_loading = false;

        match result {
            Ok(rows) => {
                info!(products = rows.len(), "Price list loaded");
                self.table.replace(rows);
                self.render_current();
                self.cache_images_in_background();
            }
            Err(e) => {
                warn!("Price list load failed: {}", e);
                self.sink.render(&ViewState::LoadFailed);
            }
        }
    }

    /// Hand the full image set to the caching agent without holding up the
    /// loop; a cold cache is not an error
    fn cache_images_in_background(&self) {
        let request = ImageCacheRequest::new(self.table.image_urls());
        if request.is_empty() {
            return;
        }

        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            if let Err(e) = coordinator.cache_images(&request).await {
                debug!("Opportunistic image caching failed: {}", e);
            }
        });
    }

    async fn refresh_images(&mut self) {
        if !self.coordinator.has_agent() {
            self.sink.notify("Image caching is disabled");
            return;
        }

        self.sink.render(&ViewState::RefreshingImages);

        let request = ImageCacheRequest::new(self.table.image_urls());
        match self.coordinator.refresh(&request).await {
            Ok(()) => {
                info!(images = request.len(), "Image cache refreshed");
                self.sink.notify("Image cache refreshed");
            }
            Err(e) => {
                warn!("Image cache refresh failed: {}", e);
                self.sink.notify("Image cache refresh failed");
            }
        }

        self.render_current();
    }

    async fn set_online(&mut self, online: bool) {
        if self.online == online {
            return;
        }
        self.online = online;

        if !online {
            info!("Connectivity lost");
            if matches!(self.phase, Phase::Active) && self.table.is_empty() {
                self.sink.render(&ViewState::Offline);
            }
            return;
        }

        info!("Connectivity restored");
        if matches!(self.phase, Phase::Active) {
            if self.table.is_empty() {
                self.load_data().await;
            } else {
                self.render_current();
            }
        }
    }

    /// Re-render whatever the query and table currently imply
    fn render_current(&self) {
        if self.query.trim().is_empty() {
            self.sink.render(&ViewState::Prompt);
        } else {
            self.render_search();
        }
    }

    fn render_search(&self) {
        let hits = self.table.search(self.query.trim());
        if hits.is_empty() {
            self.sink.render(&ViewState::NoResults);
        } else {
            let cards = hits.iter().map(|row| ProductCard::from_row(row)).collect();
            self.sink.render(&ViewState::Results(cards));
        }
    }

    async fn finish_expired(&mut self) {
        self.search_slot.clear();
        self.inactivity_slot.clear();
        self.expiry = None;
        self.phase = Phase::Blocked;

        self.gate.expire().await;

        let delays = self.ui.teardown_delays();
        let sink = self.sink.clone();
        let outcome = run_expiry_teardown(self.context.as_ref(), &delays, |phase| {
            sink.render(&ViewState::SessionExpired { phase });
        })
        .await;

        info!(?outcome, "Session teardown complete");
    }
}

/// Resolve once the expiry watch reports `true`; never resolves without a
/// watch or after a disarm
async fn wait_expired(rx: &mut Option<watch::Receiver<bool>>) {
    match rx {
        Some(rx) => {
            if *rx.borrow() {
                return;
            }
            while rx.changed().await.is_ok() {
                if *rx.borrow() {
                    return;
                }
            }
            std::future::pending::<()>().await;
        }
        None => std::future::pending::<()>().await,
    }
}
