//! Kiosk configuration
//!
//! Loaded from a YAML or TOML file (chosen by extension), then overridden by
//! `VITRINA_*` environment variables. Every tunable the kiosk honors lives
//! here; nothing is hard-coded at the call sites.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use vitrina_catalog::SheetConfig;
use vitrina_core::geo::GeoPoint;
use vitrina_core::location::ProbeOptions;
use vitrina_core::session::SESSION_STORAGE_KEY;
use vitrina_core::{Error, Result};
use vitrina_gate::{GateConfig, TeardownDelays};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    pub location: LocationConfig,

    pub sheet: SheetConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Showroom geometry and session windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Showroom latitude in degrees
    pub latitude: f64,

    /// Showroom longitude in degrees
    pub longitude: f64,

    /// Acceptance radius around the showroom, in meters
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,

    /// How long a stored grant stays reusable without a fresh probe
    #[serde(default = "default_session_duration_secs")]
    pub session_duration_secs: u64,

    /// Hard cap on a single granted session
    #[serde(default = "default_max_session_time_secs")]
    pub max_session_time_secs: u64,

    /// How long one probe may take before it times out
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Where the granted session is persisted
    #[serde(default = "default_session_file")]
    pub session_file: String,

    /// Shell command that prints the current position as JSON
    /// (`{"latitude": .., "longitude": .., "accuracy_m": ..}`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_command: Option<String>,

    /// Fixed position for bench setups, bypassing any probe command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_position: Option<FixedPosition>,
}

/// A hard-wired probe result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_fixed_accuracy_m")]
    pub accuracy_m: f64,
}

/// Offline image cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the caching agent runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory dedicated to cached product images
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
}

/// Interaction timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Idle time before the kiosk reloads itself
    #[serde(default = "default_inactivity_timeout_secs")]
    pub inactivity_timeout_secs: u64,

    /// Quiet period after the last keystroke before a search runs
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// How long the expired notice stays up before the close attempt
    #[serde(default = "default_expired_display_delay_ms")]
    pub expired_display_delay_ms: u64,

    /// Pause between a refused close and the manual-close instruction
    #[serde(default = "default_close_check_delay_ms")]
    pub close_check_delay_ms: u64,

    /// How long the manual-close instruction stays up before blanking
    #[serde(default = "default_blank_redirect_delay_ms")]
    pub blank_redirect_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image_dir: default_image_dir(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: default_inactivity_timeout_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            expired_display_delay_ms: default_expired_display_delay_ms(),
            close_check_delay_ms: default_close_check_delay_ms(),
            blank_redirect_delay_ms: default_blank_redirect_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl KioskConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Invalid YAML: {}", e)))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("VITRINA_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("VITRINA_SHEET_API_KEY") {
            self.sheet.api_key = val;
        }

        if let Ok(val) = std::env::var("VITRINA_SPREADSHEET_ID") {
            self.sheet.spreadsheet_id = val;
        }

        if let Ok(val) = std::env::var("VITRINA_SHEET_RANGE") {
            self.sheet.range = val;
        }

        if let Ok(val) = std::env::var("VITRINA_IMAGE_DIR") {
            self.cache.image_dir = val;
        }

        if let Ok(val) = std::env::var("VITRINA_SESSION_FILE") {
            self.location.session_file = val;
        }

        if let Ok(val) = std::env::var("VITRINA_RADIUS_M")
            && let Ok(radius) = val.parse::<f64>()
        {
            self.location.radius_m = radius;
        }

        if let Ok(val) = std::env::var("VITRINA_LATITUDE")
            && let Ok(latitude) = val.parse::<f64>()
        {
            self.location.latitude = latitude;
        }

        if let Ok(val) = std::env::var("VITRINA_LONGITUDE")
            && let Ok(longitude) = val.parse::<f64>()
        {
            self.location.longitude = longitude;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(Error::ConfigValidation(
                "location.latitude must be within [-90, 90]".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(Error::ConfigValidation(
                "location.longitude must be within [-180, 180]".to_string(),
            ));
        }
        if self.location.radius_m <= 0.0 {
            return Err(Error::ConfigValidation(
                "location.radius_m must be positive".to_string(),
            ));
        }
        if self.location.max_session_time_secs == 0 {
            return Err(Error::ConfigValidation(
                "location.max_session_time_secs must be positive".to_string(),
            ));
        }
        if self.location.probe_timeout_secs == 0 {
            return Err(Error::ConfigValidation(
                "location.probe_timeout_secs must be positive".to_string(),
            ));
        }
        if self.location.probe_command.is_some() && self.location.fixed_position.is_some() {
            return Err(Error::ConfigValidation(
                "location.probe_command and location.fixed_position are mutually exclusive"
                    .to_string(),
            ));
        }

        self.sheet
            .validate()
            .map_err(|e| Error::ConfigValidation(e.to_string()))?;

        Ok(())
    }
}

impl LocationConfig {
    pub fn target(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            target: self.target(),
            radius_m: self.radius_m,
            session_duration: Duration::from_secs(self.session_duration_secs),
            max_session_time: Duration::from_secs(self.max_session_time_secs),
            probe_options: ProbeOptions::with_timeout(Duration::from_secs(
                self.probe_timeout_secs,
            )),
        }
    }
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    pub fn teardown_delays(&self) -> TeardownDelays {
        TeardownDelays {
            expired_display: Duration::from_millis(self.expired_display_delay_ms),
            close_check: Duration::from_millis(self.close_check_delay_ms),
            blank_redirect: Duration::from_millis(self.blank_redirect_delay_ms),
        }
    }
}

fn default_radius_m() -> f64 {
    200.0
}

fn default_session_duration_secs() -> u64 {
    28_800
}

fn default_max_session_time_secs() -> u64 {
    3_600
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_session_file() -> String {
    format!("~/.vitrina/{}.json", SESSION_STORAGE_KEY)
}

fn default_fixed_accuracy_m() -> f64 {
    5.0
}

fn default_image_dir() -> String {
    "~/.vitrina/images".to_string()
}

fn default_inactivity_timeout_secs() -> u64 {
    120
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_expired_display_delay_ms() -> u64 {
    2000
}

fn default_close_check_delay_ms() -> u64 {
    500
}

fn default_blank_redirect_delay_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
