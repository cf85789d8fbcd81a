use crate::application::reconciler::EngineHandle;
use crate::domain::{
    dashboard::DashboardSnapshot,
    errors::SnapshotError,
    logging::{LogComponent, get_logger},
};

/// Trait for the snapshot endpoint
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, SnapshotError>;
}

/// Fetches the baseline once and hands it to the reconciler.
///
/// No retry: a failure leaves the dashboard "not ready" until `load` is
/// called again. Concurrent calls are not deduplicated.
pub struct SnapshotLoader<S> {
    source: S,
    engine: EngineHandle,
}

impl<S: SnapshotSource> SnapshotLoader<S> {
    pub fn new(source: S, engine: EngineHandle) -> Self {
        Self { source, engine }
    }

    pub async fn load(&self) -> Result<(), SnapshotError> {
        get_logger().info(LogComponent::Application("SnapshotLoader"), "📡 Loading dashboard snapshot");

        let result = self.source.fetch_snapshot().await.and_then(|snapshot| {
            snapshot.validate()?;
            Ok(snapshot)
        });

        match result {
            Ok(snapshot) => {
                if self.engine.submit_snapshot(snapshot) {
                    Ok(())
                } else {
                    get_logger().warn(
                        LogComponent::Application("SnapshotLoader"),
                        "⚠️ Snapshot fetched after the session stopped; discarded",
                    );
                    Err(SnapshotError::SessionStopped)
                }
            }
            Err(e) => {
                get_logger().error(
                    LogComponent::Application("SnapshotLoader"),
                    &format!("❌ Failed to load snapshot: {e}"),
                );
                self.engine.report_snapshot_failure(e.clone());
                Err(e)
            }
        }
    }
}
