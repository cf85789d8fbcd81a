use serde::{Deserialize, Serialize};

use crate::application::event_stream::ReconnectPolicy;
use crate::domain::dashboard::RECENT_DETECTION_CAPACITY;
use crate::domain::errors::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://fraud-api-ehjw.onrender.com";
pub const DEFAULT_SNAPSHOT_PATH: &str = "/fraud/dashboard";
pub const DEFAULT_STREAM_URL: &str = "wss://fraud-api-ehjw.onrender.com/dashboard";

/// Endpoints and tuning for one dashboard session. Every field has a default,
/// so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub snapshot_path: String,
    pub stream_url: String,
    pub recent_capacity: usize,
    pub reconnect: ReconnectPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            recent_capacity: RECENT_DETECTION_CAPACITY,
            reconnect: ReconnectPolicy::Never,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_capacity == 0 {
            return Err(ConfigError::OutOfRange("recent_capacity"));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::OutOfRange("api_base_url"));
        }
        if !(self.stream_url.starts_with("ws://") || self.stream_url.starts_with("wss://")) {
            return Err(ConfigError::OutOfRange("stream_url"));
        }
        Ok(())
    }

    pub fn snapshot_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let path = self.snapshot_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
