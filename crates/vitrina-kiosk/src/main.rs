//! Vitrina showroom kiosk
//!
//! This binary runs the location-gated price lookup kiosk:
//! - Grants access only inside the configured showroom radius, with the
//!   grant persisted so reloads skip the probe
//! - Fetches the price list from a published spreadsheet and answers
//!   debounced substring searches over it
//! - Pre-populates an offline image cache through a background agent
//! - Force-expires every session after the configured cap
//!
//! Usage:
//! ```bash
//! # Run the kiosk
//! vitrina-kiosk --config kiosk.yaml
//!
//! # Secrets via environment (env vars override the file)
//! VITRINA_SHEET_API_KEY=your_key vitrina-kiosk --config kiosk.yaml
//!
//! # Rebuild the offline image cache and exit
//! vitrina-kiosk --config kiosk.yaml refresh-images
//! ```
//!
//! While serving, the console doubles as the on-screen keyboard: type a
//! line to search, `/clear`, `/retry`, `/refresh`, `/offline` and
//! `/online` drive the buttons.

mod config;
mod controller;
mod providers;
mod timer;
mod view;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::KioskConfig;
use controller::{Key, KioskController, KioskEvent};
use providers::build_provider;
use view::{LogViewSink, ViewSink};

use vitrina_cache::{CachingAgent, ImageCacheCoordinator, ImageCacheRequest, ImageStore};
use vitrina_catalog::{HttpClientConfig, ProductTable, SheetClient, create_client};
use vitrina_core::context::BrowsingContext;
use vitrina_core::session_store::SessionStore;
use vitrina_gate::{AccessGate, FileSessionStore};

const STOREFRONT: &str = r#"
   _________________________________
  |  _____________________________  |
  | |         V I T R I N A       | |
  | |   showroom price terminal   | |
  | |_____________________________| |
  |    []      []      []      []   |
  |_________________________________|
"#;

/// Vitrina - location-gated showroom price kiosk
#[derive(Parser)]
#[command(name = "vitrina-kiosk")]
#[command(about = "Location-gated showroom price lookup kiosk", long_about = None)]
#[command(before_help = STOREFRONT)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "VITRINA_CONFIG",
        global = true
    )]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kiosk (default if no command specified)
    Serve,
    /// Fetch the price list, rebuild the offline image cache and exit
    RefreshImages,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The showroom position and the sheet id have no defaults; a file is
    // mandatory
    let config_path = cli
        .config
        .ok_or("a configuration file is required (pass --config or set VITRINA_CONFIG)")?;

    let mut config = KioskConfig::from_file(&config_path)?;

    // Environment variables override the file
    config.merge_env();
    config.validate()?;

    // Initialize tracing with the configured level
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!("{}", log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("📁 Configuration loaded from: {}", config_path);

    match cli.command {
        Some(Commands::RefreshImages) => {
            refresh_images(&config).await?;
            return Ok(());
        }
        Some(Commands::Serve) | None => {
            // Continue with kiosk startup (default behavior)
        }
    }

    println!("{}", STOREFRONT);
    serve(config).await
}

async fn serve(config: KioskConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("🚀 Starting Vitrina kiosk v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "📍 Showroom at ({}, {}), radius {} m",
        config.location.latitude, config.location.longitude, config.location.radius_m
    );

    let client = create_client(&HttpClientConfig::default())?;

    let store: Arc<dyn SessionStore> =
        Arc::new(FileSessionStore::new(&config.location.session_file)?);
    let provider = build_provider(&config.location);
    let gate = AccessGate::new(provider, store.clone(), config.location.gate_config());

    let sheet = SheetClient::new(client.clone(), config.sheet.clone());

    let (coordinator, agent) = if config.cache.enabled {
        let image_store = ImageStore::new(&config.cache.image_dir)?;
        let agent = CachingAgent::spawn(client, image_store);
        info!("🖼  Image caching enabled: {}", config.cache.image_dir);
        (ImageCacheCoordinator::new(agent.sender()), Some(agent))
    } else {
        info!("🖼  Image caching disabled");
        (ImageCacheCoordinator::detached(), None)
    };

    let context: Arc<dyn BrowsingContext> = Arc::new(HeadlessContext);
    let sink: Arc<dyn ViewSink> = Arc::new(LogViewSink);

    let controller = KioskController::new(
        gate,
        store,
        sheet,
        coordinator,
        context,
        sink,
        config.ui.clone(),
    );

    let (events_tx, events_rx) = mpsc::channel(32);
    spawn_input_adapter(events_tx);

    let mut kiosk = tokio::spawn(controller.run(events_rx));

    tokio::select! {
        _ = shutdown_signal() => {}
        _ = &mut kiosk => {
            info!("Kiosk session ended");
        }
    }

    if let Some(agent) = agent {
        agent.shutdown().await;
    }

    Ok(())
}

/// Fetch the current price list and rebuild the image cache from it
async fn refresh_images(config: &KioskConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !config.cache.enabled {
        return Err("image caching is disabled in the configuration".into());
    }

    let client = create_client(&HttpClientConfig::default())?;
    let sheet = SheetClient::new(client.clone(), config.sheet.clone());

    info!("📄 Fetching price list");
    let rows = sheet.fetch_rows().await?;
    let mut table = ProductTable::new();
    table.replace(rows);

    let image_store = ImageStore::new(&config.cache.image_dir)?;
    let agent = CachingAgent::spawn(client, image_store.clone());
    let coordinator = ImageCacheCoordinator::new(agent.sender());

    let request = ImageCacheRequest::new(table.image_urls());
    info!("🖼  Rebuilding image cache ({} images)", request.len());
    coordinator.refresh(&request).await?;
    agent.shutdown().await;

    let cached = image_store.urls()?.len();
    info!(
        "✅ Image cache rebuilt: {} of {} images stored",
        cached,
        request.len()
    );
    Ok(())
}

/// Feed console lines into the kiosk event channel.
///
/// Slash commands map to the operator buttons; any other line is typed
/// into the search box as a fresh query. A blank line counts as a touch.
fn spawn_input_adapter(tx: mpsc::Sender<KioskEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    for event in parse_input_line(&line) {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                Ok(None) => {
                    // Headless host with no console; the kiosk keeps running
                    info!("Console input closed");
                    std::future::pending::<()>().await;
                }
                Err(e) => {
                    warn!("Console input error: {}", e);
                    return;
                }
            }
        }
    });
}

fn parse_input_line(line: &str) -> Vec<KioskEvent> {
    match line.trim() {
        "/clear" => vec![KioskEvent::Clear],
        "/retry" => vec![KioskEvent::Retry],
        "/refresh" => vec![KioskEvent::RefreshImages],
        "/offline" => vec![KioskEvent::Connectivity(false)],
        "/online" => vec![KioskEvent::Connectivity(true)],
        "" => vec![KioskEvent::Touch],
        text => {
            let mut events = vec![KioskEvent::Clear];
            events.extend(text.chars().map(|c| KioskEvent::Key(Key::Char(c))));
            events
        }
    }
}

/// Browsing context of a headless host: close is always refused, blanking
/// and reloading only reach the log
struct HeadlessContext;

#[async_trait::async_trait]
impl BrowsingContext for HeadlessContext {
    async fn try_close(&self) -> bool {
        false
    }

    async fn navigate_blank(&self) {
        info!("Screen blanked");
    }

    async fn reload(&self) {
        info!("Reloading kiosk page");
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
