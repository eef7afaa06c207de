//! Configuration management
//!
//! Settings live in `settings.json` inside the FinTrack data directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://127.0.0.1:8000/api", "timeoutSecs": 30, "singleFlightRefresh": false }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving. A
//! `timeoutSecs` of 0 turns the request timeout off.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default API base when nothing is configured
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "FINTRACK_API_BASE";

/// Environment variable overriding single-flight refresh
pub const SINGLE_FLIGHT_ENV: &str = "FINTRACK_SINGLE_FLIGHT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(default)]
    single_flight_refresh: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// FinTrack configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Let concurrent 401s share one refresh call
    pub single_flight_refresh: bool,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            single_flight_refresh: false,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment variables win over the file:
    /// 1. `FINTRACK_API_BASE` replaces `api.baseUrl`
    /// 2. `FINTRACK_SINGLE_FLIGHT` replaces `api.singleFlightRefresh`
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let api_base = std::env::var(API_BASE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| raw.api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let single_flight_refresh = match std::env::var(SINGLE_FLIGHT_ENV).ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.api.single_flight_refresh,
        };

        let timeout = match raw.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            api_base: normalize_base_url(&api_base)?,
            timeout,
            single_flight_refresh,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        // Reload to preserve fields changed by other writers
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.api.base_url = Some(self.api_base.clone());
        settings.api.timeout_secs = Some(self.timeout.map_or(0, |t| t.as_secs()));
        settings.api.single_flight_refresh = self.single_flight_refresh;

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Point the client at another API
    pub fn set_api_base(&mut self, url: &str) -> Result<()> {
        self.api_base = normalize_base_url(url)?;
        Ok(())
    }
}

/// Validate an API base URL and drop trailing slashes
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .with_context(|| format!("Invalid API base URL: {}", raw))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => anyhow::bail!("Unsupported URL scheme '{}' in API base URL", other),
    }
}
