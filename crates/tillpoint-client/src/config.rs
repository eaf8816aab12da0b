//! # Client Configuration
//!
//! Configuration for the API clients and the session manager.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILLPOINT_API_URL=https://pos.example.com/api                      │
//! │     TILLPOINT_REMEMBER_SESSION=false                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tillpoint/client.toml (Linux)                            │
//! │     ~/Library/Application Support/com.tillpoint.pos/client.toml (mac)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost endpoint, 60s refresh margin, 5s minimum delay           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "https://pos.example.com/api"
//! request_timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [session]
//! refresh_margin_secs = 60
//! min_refresh_delay_secs = 5
//! remember = true   # durable credential scope instead of session scope
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Defaults
// =============================================================================

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Lead time before expiry at which proactive renewal triggers.
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 60;

/// Floor for the scheduled delay, guarding against clock skew producing a
/// tight refresh loop.
pub const DEFAULT_MIN_REFRESH_DELAY_SECS: u64 = 5;

// =============================================================================
// File Format
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    session: SessionSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionSection {
    refresh_margin_secs: Option<u64>,
    min_refresh_delay_secs: Option<u64>,
    remember: Option<bool>,
}

// =============================================================================
// Client Config
// =============================================================================

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote POS API.
    pub base_url: Url,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Connect timeout.
    pub connect_timeout: Duration,

    /// Lead time before token expiry at which renewal triggers.
    pub refresh_margin: Duration,

    /// Minimum delay before a scheduled renewal fires.
    pub min_refresh_delay: Duration,

    /// Whether the credential is persisted in the durable scope ("remember
    /// me") or the session scope.
    pub remember_session: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            refresh_margin: Duration::from_secs(DEFAULT_REFRESH_MARGIN_SECS),
            min_refresh_delay: Duration::from_secs(DEFAULT_MIN_REFRESH_DELAY_SECS),
            remember_session: true,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given endpoint with all other values
    /// at their defaults.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("bad base URL: {}", e)))?;
        Ok(ClientConfig {
            base_url,
            ..ClientConfig::default()
        })
    }

    /// Loads configuration from the platform config file (if present) and
    /// applies environment overrides.
    pub fn load() -> ClientResult<Self> {
        let mut file = ConfigFile::default();

        if let Some(path) = Self::config_file_path() {
            match std::fs::read_to_string(&path) {
                Ok(raw) => {
                    file = toml::from_str(&raw).map_err(|e| {
                        ClientError::InvalidConfig(format!(
                            "failed to parse {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    debug!(path = %path.display(), "Loaded client config file");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "No client config file, using defaults");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not read config file");
                }
            }
        }

        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> ClientResult<Self> {
        let defaults = ClientConfig::default();

        let base_url = std::env::var("TILLPOINT_API_URL")
            .ok()
            .or(file.api.base_url)
            .map(|raw| {
                Url::parse(&raw)
                    .map_err(|e| ClientError::InvalidConfig(format!("bad base URL: {}", e)))
            })
            .transpose()?
            .unwrap_or(defaults.base_url);

        let remember_session = std::env::var("TILLPOINT_REMEMBER_SESSION")
            .ok()
            .map(|v| v != "false" && v != "0")
            .or(file.session.remember)
            .unwrap_or(defaults.remember_session);

        Ok(ClientConfig {
            base_url,
            request_timeout: file
                .api
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            connect_timeout: file
                .api
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            refresh_margin: file
                .session
                .refresh_margin_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_margin),
            min_refresh_delay: file
                .session
                .min_refresh_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.min_refresh_delay),
            remember_session,
        })
    }

    /// Path of the platform config file, if a home directory is resolvable.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tillpoint", "tillpoint")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
