use std::future::Future;
use std::sync::Arc;

use futures::future::{AbortHandle, Abortable, join3};

use crate::application::{
    event_stream::{Delay, EventStreamClient, StreamReport, StreamTransport},
    publisher::StatePublisher,
    reconciler::{EngineHandle, ReconciliationEngine, engine_channel, run_engine},
    snapshot_loader::{SnapshotLoader, SnapshotSource},
};
use crate::config::DashboardConfig;
use crate::domain::{
    errors::SnapshotError,
    logging::{LogComponent, TimeProvider, get_logger},
};

/// Outcome of a session's driver future
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub snapshot: Result<(), SnapshotError>,
    /// `None` when the stream was aborted by `close`.
    pub stream: Option<StreamReport>,
}

/// One mounted dashboard: reconciler, snapshot loader and stream client,
/// all built from injected collaborators.
pub struct DashboardSession {
    publisher: StatePublisher,
    engine: EngineHandle,
    stream_abort: AbortHandle,
}

impl DashboardSession {
    /// Returns the session and the driver future that runs all three parts.
    /// The caller spawns the driver (`spawn_local` in the browser).
    pub fn new<S, T, D>(
        config: &DashboardConfig,
        source: S,
        transport: T,
        delay: D,
        clock: Arc<dyn TimeProvider>,
    ) -> (Self, impl Future<Output = SessionReport> + use<S, T, D>)
    where
        S: SnapshotSource,
        T: StreamTransport,
        D: Delay,
    {
        let publisher = StatePublisher::new();
        let (engine_handle, commands) = engine_channel();
        let engine =
            ReconciliationEngine::with_capacity(clock, publisher.clone(), config.recent_capacity);

        let loader = SnapshotLoader::new(source, engine_handle.clone());
        let client = EventStreamClient::new(transport, delay, config.reconnect, engine_handle.clone());
        let (stream_abort, registration) = AbortHandle::new_pair();

        let driver = async move {
            let (_, snapshot, stream) = join3(
                run_engine(engine, commands),
                async move { loader.load().await },
                Abortable::new(client.run(), registration),
            )
            .await;
            SessionReport { snapshot, stream: stream.ok() }
        };

        get_logger().info(LogComponent::Application("Session"), "🎯 Dashboard session created");

        (Self { publisher, engine: engine_handle, stream_abort }, driver)
    }

    pub fn publisher(&self) -> StatePublisher {
        self.publisher.clone()
    }

    pub fn engine_handle(&self) -> EngineHandle {
        self.engine.clone()
    }

    /// Explicit reload: fetch a fresh snapshot through `source`.
    pub async fn reload<S: SnapshotSource>(&self, source: S) -> Result<(), SnapshotError> {
        SnapshotLoader::new(source, self.engine.clone()).load().await
    }

    /// Close the stream and stop the reconciler. Idempotent.
    pub fn close(&self) {
        if self.stream_abort.is_aborted() {
            return;
        }
        get_logger().info(LogComponent::Application("Session"), "🛑 Closing dashboard session");
        self.stream_abort.abort();
        self.engine.tear_down();
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.close();
    }
}
