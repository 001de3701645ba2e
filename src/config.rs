use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// API test configuration
// ============================================================================

/// Target host and network timeouts shared by API test runners and the load driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTestConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl ApiTestConfig {
    /// Resolve from the process environment.
    pub fn resolve() -> Self {
        Self::resolve_from(std::env::var(BASE_URL_ENV).ok())
    }

    /// Resolve from an explicit override. Empty counts as unset.
    pub fn resolve_from(base_url: Option<String>) -> Self {
        let base_url = base_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        info!("baseUrl is: {}", base_url);

        Self {
            base_url,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

// ============================================================================
// Load profile
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of concurrent virtual users
    pub vus: u32,
    /// Total vote iterations shared by all virtual users
    pub iterations: u64,
    /// Pause between two iterations of the same virtual user
    pub think_time_ms: u64,
    /// Value of `agree` sent with every vote
    pub agree: bool,
    /// When set, polls are created with an end date this far in the future
    pub poll_duration_minutes: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            vus: 5,
            iterations: 100,
            think_time_ms: 0,
            agree: true,
            poll_duration_minutes: None,
        }
    }
}

impl LoadConfig {
    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    pub fn poll_duration(&self) -> Option<chrono::Duration> {
        self.poll_duration_minutes
            .map(|minutes| chrono::Duration::minutes(minutes as i64))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum ratio of passed checks; the run fails below it
    pub checks_min_rate: Option<f64>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Built-in defaults, then the TOML file (if present), then `LOADTEST__` variables.
    /// Not validated: callers overlay command line values first, then `validate`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("LOADTEST__").split("__"));
        Ok(figment.extract()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load.vus == 0 {
            return Err(ConfigError::Invalid("vus must be at least 1".to_string()));
        }
        if self.load.iterations == 0 {
            return Err(ConfigError::Invalid(
                "iterations must be at least 1".to_string(),
            ));
        }
        if let Some(rate) = self.thresholds.checks_min_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "checks_min_rate must be between 0 and 1, got {rate}"
                )));
            }
        }
        Ok(())
    }
}
