//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;
use std::time::Duration;

use promptguard_core::DEFAULT_USER_ID;
use promptguard_pipeline::{SimulationConfig, DEFAULT_LOG_CAPACITY};
use serde::{Deserialize, Serialize};
use url::Url;

/// Largest board the dashboard will render.
pub const MAX_STAGE_COUNT: usize = 12;

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the moderation backend
    pub backend_url: String,
    /// User id sent with every submission
    pub user_id: String,
    /// Number of pipeline stages shown on the board
    pub stage_count: usize,
    /// Log stream capacity
    pub log_capacity: usize,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Simulated progression timing
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// Where "download logs" writes its files (defaults to ~/.promptguard/exports)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            stage_count: 3,
            log_capacity: DEFAULT_LOG_CAPACITY,
            request_timeout_secs: 30,
            simulation: SimulationSettings::default(),
            export_dir: None,
        }
    }
}

/// Simulation timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub start_delay_ms: u64,
    pub step_min_ms: u64,
    pub step_max_ms: u64,
    pub settle_pause_ms: u64,
    pub line_interval_ms: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            start_delay_ms: 500,
            step_min_ms: 1000,
            step_max_ms: 2000,
            settle_pause_ms: 800,
            line_interval_ms: 300,
        }
    }
}

impl SimulationSettings {
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            start_delay: Duration::from_millis(self.start_delay_ms),
            step_min: Duration::from_millis(self.step_min_ms),
            step_max: Duration::from_millis(self.step_max_ms),
            settle_pause: Duration::from_millis(self.settle_pause_ms),
            line_interval: Duration::from_millis(self.line_interval_ms),
            seed: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub backend_url: Option<String>,
    pub user_id: Option<String>,
    pub stage_count: Option<usize>,
    pub log_capacity: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub simulation: Option<SimulationSettings>,
    pub export_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.backend_url {
            self.backend_url = url;
        }
        if let Some(user_id) = update.user_id {
            self.user_id = user_id;
        }
        if let Some(count) = update.stage_count {
            self.stage_count = count;
        }
        if let Some(capacity) = update.log_capacity {
            self.log_capacity = capacity;
        }
        if let Some(timeout) = update.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(simulation) = update.simulation {
            self.simulation = simulation;
        }
        if let Some(dir) = update.export_dir {
            self.export_dir = Some(dir);
        }
    }

    /// Whether the HTTP backend has to be rebuilt to reflect `other`.
    pub fn backend_changed(&self, other: &AppConfig) -> bool {
        self.backend_url != other.backend_url
            || self.request_timeout_secs != other.request_timeout_secs
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| format!("Invalid backend_url: {}: {}", self.backend_url, e))?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(format!(
                "Invalid backend_url: {}. Must be an http:// or https:// URL with a host",
                self.backend_url
            ));
        }

        if self.user_id.trim().is_empty() {
            return Err("user_id cannot be empty".to_string());
        }

        if self.stage_count == 0 || self.stage_count > MAX_STAGE_COUNT {
            return Err(format!(
                "stage_count must be between 1 and {}",
                MAX_STAGE_COUNT
            ));
        }

        if self.log_capacity == 0 {
            return Err("log_capacity must be at least 1".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1 second".to_string());
        }

        self.simulation
            .to_config()
            .validate()
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}
