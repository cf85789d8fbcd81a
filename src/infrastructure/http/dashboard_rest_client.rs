use gloo_net::http::Request;
use web_sys::RequestCredentials;

use crate::application::snapshot_loader::SnapshotSource;
use crate::config::DashboardConfig;
use crate::domain::{
    dashboard::DashboardSnapshot,
    errors::SnapshotError,
    logging::{LogComponent, get_logger},
};
use crate::infrastructure::http::dto::decode_snapshot_body;

/// HTTP client for the dashboard summary endpoint
#[derive(Debug, Clone)]
pub struct DashboardHttpClient {
    snapshot_url: String,
    with_credentials: bool,
}

impl DashboardHttpClient {
    pub fn new(snapshot_url: impl Into<String>) -> Self {
        Self { snapshot_url: snapshot_url.into(), with_credentials: true }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.snapshot_url())
    }

    /// Send cookies along with the request (on by default).
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    pub fn snapshot_url(&self) -> &str {
        &self.snapshot_url
    }
}

impl SnapshotSource for DashboardHttpClient {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, SnapshotError> {
        get_logger().info(
            LogComponent::Infrastructure("DashboardHttpClient"),
            &format!("📡 GET {}", self.snapshot_url),
        );

        let credentials = if self.with_credentials {
            RequestCredentials::Include
        } else {
            RequestCredentials::SameOrigin
        };

        let response = Request::get(&self.snapshot_url)
            .header("Accept", "application/json")
            .credentials(credentials)
            .send()
            .await
            .map_err(|e| SnapshotError::Transport(format!("Failed to send request: {e:?}")))?;

        if !response.ok() {
            return Err(SnapshotError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SnapshotError::Transport(format!("Failed to read response: {e:?}")))?;

        let snapshot = decode_snapshot_body(&body)?;

        get_logger().info(
            LogComponent::Infrastructure("DashboardHttpClient"),
            &format!(
                "✅ Snapshot received: {} transactions, {} recent detections",
                snapshot.total_transactions,
                snapshot.recent_detections.len()
            ),
        );

        Ok(snapshot)
    }
}
