//! # Kero Configuration
//!
//! Endpoint URLs, timings and the local database path.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KERO_PRICING_URL=https://...                                       │
//! │     KERO_DEBOUNCE_MS=250                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tools/kero.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.kero.tools/kero.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Compiled-in script URLs, 30s requests, 250ms debounce, 15m idle    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # kero.toml
//! [endpoints]
//! pricing_url = "https://script.google.com/macros/s/.../exec"
//! returns_url = "https://script.google.com/macros/s/.../exec"
//!
//! [timing]
//! request_timeout_secs = 30
//! debounce_ms = 250
//! idle_timeout_secs = 900
//!
//! [storage]
//! db_path = "/var/lib/kero/kero.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{RemoteError, RemoteResult};

const CONFIG_FILE_NAME: &str = "kero.toml";
const DB_FILE_NAME: &str = "kero.db";

// =============================================================================
// Endpoints
// =============================================================================

/// Script endpoints, one per tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Catalog (`getItemDatabase`).
    #[serde(default = "default_pricing_url")]
    pub pricing_url: String,

    /// Suppliers, branches and the returns log.
    #[serde(default = "default_returns_url")]
    pub returns_url: String,

    /// Branch categories and label items.
    #[serde(default = "default_labels_url")]
    pub labels_url: String,

    /// User accounts and permissions.
    #[serde(default = "default_users_url")]
    pub users_url: String,
}

fn default_pricing_url() -> String {
    "https://script.google.com/macros/s/AKfycbzdOrEfpbppE59wZ7_fAYOZwAeSStUSg5NdRG99zC4GrCtNSHl4X2G3SuZxBFgxmdd3Ig/exec".to_string()
}

fn default_returns_url() -> String {
    "https://script.google.com/macros/s/AKfycbzsUzL3D00sB9B2B-5-MUcNNVYU9-zxPUsCI4SP_U86LTK4YfOo8_gOnxUBE4Fq4olS/exec".to_string()
}

fn default_labels_url() -> String {
    "https://script.google.com/macros/s/AKfycbxSa_BLTjDcaTbA9-pLGrE7BTAJzuw9uxIeqYLEpANfSFWbsqilvMuNlJS2FkBFALp4/exec".to_string()
}

fn default_users_url() -> String {
    "https://script.google.com/macros/s/AKfycbyWU8DeLSEkOitYHdRQlE9HcfTfJfL0MPhic3r5rM6ZptgucqPWgH5VkeYtbYjAxnfYnA/exec".to_string()
}

impl Default for EndpointSettings {
    fn default() -> Self {
        EndpointSettings {
            pricing_url: default_pricing_url(),
            returns_url: default_returns_url(),
            labels_url: default_labels_url(),
            users_url: default_users_url(),
        }
    }
}

// =============================================================================
// Timing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Quiet period before a search runs (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Inactivity before the session is dropped (seconds).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    kero_core::SEARCH_DEBOUNCE.as_millis() as u64
}

fn default_idle_timeout() -> u64 {
    kero_core::IDLE_TIMEOUT.as_secs()
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            request_timeout_secs: default_request_timeout(),
            debounce_ms: default_debounce_ms(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to `kero.db` in the platform data dir.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeroConfig {
    #[serde(default)]
    pub endpoints: EndpointSettings,

    #[serde(default)]
    pub timing: TimingSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl KeroConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (kero.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> RemoteResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> RemoteResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| RemoteError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RemoteError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| RemoteError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RemoteResult<()> {
        for (name, raw) in [
            ("pricing_url", &self.endpoints.pricing_url),
            ("returns_url", &self.endpoints.returns_url),
            ("labels_url", &self.endpoints.labels_url),
            ("users_url", &self.endpoints.users_url),
        ] {
            let url = url::Url::parse(raw)
                .map_err(|e| RemoteError::InvalidUrl(format!("{name}: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(RemoteError::InvalidUrl(format!(
                    "{name} must start with http:// or https://, got: {raw}"
                )));
            }
        }

        if self.timing.request_timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.timing.debounce_ms == 0 {
            return Err(RemoteError::InvalidConfig(
                "debounce_ms must be greater than 0".into(),
            ));
        }
        if self.timing.idle_timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig(
                "idle_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KERO_PRICING_URL") {
            debug!(url = %url, "Overriding pricing URL from environment");
            self.endpoints.pricing_url = url;
        }
        if let Ok(url) = std::env::var("KERO_RETURNS_URL") {
            debug!(url = %url, "Overriding returns URL from environment");
            self.endpoints.returns_url = url;
        }
        if let Ok(url) = std::env::var("KERO_LABELS_URL") {
            debug!(url = %url, "Overriding labels URL from environment");
            self.endpoints.labels_url = url;
        }
        if let Ok(url) = std::env::var("KERO_USERS_URL") {
            debug!(url = %url, "Overriding users URL from environment");
            self.endpoints.users_url = url;
        }

        if let Some(secs) = env_u64("KERO_REQUEST_TIMEOUT_SECS") {
            self.timing.request_timeout_secs = secs;
        }
        if let Some(ms) = env_u64("KERO_DEBOUNCE_MS") {
            self.timing.debounce_ms = ms;
        }
        if let Some(secs) = env_u64("KERO_IDLE_TIMEOUT_SECS") {
            self.timing.idle_timeout_secs = secs;
        }

        if let Ok(path) = std::env::var("KERO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.db_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kero", "tools")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Configured database path, or `kero.db` in the platform data dir.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("com", "kero", "tools")
                    .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            })
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.timing.debounce_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.idle_timeout_secs)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => {
            debug!(var = name, value, "Overriding from environment");
            Some(value)
        }
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}
