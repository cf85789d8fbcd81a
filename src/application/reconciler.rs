//! Reconciliation engine: the single owner of `DashboardState`.
//!
//! Snapshot application and streamed events are folded strictly serially.
//! Each change produces a fresh immutable state that is published as one
//! atomic replacement.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use crate::application::publisher::StatePublisher;
use crate::domain::{
    ConnectionState, Publication, Readiness,
    dashboard::{
        DashboardSnapshot, DashboardState, DetectionRecord, RECENT_DETECTION_CAPACITY,
        RawDetectionEvent, Timestamp,
    },
    errors::{InvariantViolation, SnapshotError},
    logging::{LogComponent, TimeProvider, get_logger},
};
use crate::time_utils::format_rfc3339_millis;
use crate::{log_debug, log_info};

const COMPONENT: LogComponent = LogComponent::Application("Reconciler");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// No snapshot yet; held for replay in arrival order.
    Queued,
    /// The engine was torn down.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied { replayed: usize },
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    AwaitingSnapshot,
    Ready,
    TornDown,
}

pub struct ReconciliationEngine {
    state: Option<Arc<DashboardState>>,
    pending: VecDeque<RawDetectionEvent>,
    lifecycle: Lifecycle,
    readiness: Readiness,
    connection: ConnectionState,
    version: u64,
    capacity: usize,
    clock: Arc<dyn TimeProvider>,
    publisher: StatePublisher,
}

impl ReconciliationEngine {
    pub fn new(clock: Arc<dyn TimeProvider>, publisher: StatePublisher) -> Self {
        Self::with_capacity(clock, publisher, RECENT_DETECTION_CAPACITY)
    }

    pub fn with_capacity(
        clock: Arc<dyn TimeProvider>,
        publisher: StatePublisher,
        capacity: usize,
    ) -> Self {
        Self {
            state: None,
            pending: VecDeque::new(),
            lifecycle: Lifecycle::AwaitingSnapshot,
            readiness: Readiness::Loading,
            connection: ConnectionState::Disconnected,
            version: 0,
            capacity: capacity.max(1),
            clock,
            publisher,
        }
    }

    pub fn state(&self) -> Option<Arc<DashboardState>> {
        self.state.clone()
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifecycle == Lifecycle::TornDown
    }

    pub fn publisher(&self) -> &StatePublisher {
        &self.publisher
    }

    /// Replace the whole state, then replay queued events in arrival order.
    ///
    /// The only operation allowed to lower the counters.
    pub fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) -> SnapshotOutcome {
        if self.is_torn_down() {
            log_debug!(COMPONENT, "Ignoring snapshot after teardown");
            return SnapshotOutcome::Rejected;
        }

        let observed_at = self.now();
        let mut next = DashboardState::from_snapshot(snapshot, observed_at, self.capacity);
        Self::enforce_invariants(&mut next);

        get_logger().info(
            COMPONENT,
            &format!(
                "📊 Snapshot applied: {} transactions, {} fraud (observed {})",
                next.total_transactions,
                next.fraud_detected,
                format_rfc3339_millis(observed_at)
            ),
        );

        self.state = Some(Arc::new(next));
        self.lifecycle = Lifecycle::Ready;
        self.readiness = Readiness::Ready;
        self.publish();

        let replayed = self.pending.len();
        if replayed > 0 {
            log_info!(COMPONENT, "Replaying {replayed} events received before the snapshot");
        }
        while let Some(event) = self.pending.pop_front() {
            self.fold_event(event);
        }

        SnapshotOutcome::Applied { replayed }
    }

    /// Fold one streamed event into the state.
    pub fn apply_event(&mut self, event: RawDetectionEvent) -> EventOutcome {
        match self.lifecycle {
            Lifecycle::TornDown => {
                log_debug!(COMPONENT, "Ignoring event {} after teardown", event.transaction_id);
                EventOutcome::Rejected
            }
            Lifecycle::AwaitingSnapshot => {
                log_debug!(COMPONENT, "Queueing event {} until the snapshot lands", event.transaction_id);
                self.pending.push_back(event);
                EventOutcome::Queued
            }
            Lifecycle::Ready => {
                self.fold_event(event);
                EventOutcome::Applied
            }
        }
    }

    /// Keep the "not ready" display state; queued events stay queued.
    pub fn record_snapshot_failure(&mut self, error: &SnapshotError) {
        if self.is_torn_down() {
            return;
        }
        get_logger().error(COMPONENT, &format!("❌ Dashboard not ready: {error}"));
        if self.lifecycle == Lifecycle::AwaitingSnapshot {
            self.readiness = Readiness::Unavailable { reason: error.to_string() };
            self.publish();
        }
    }

    pub fn set_connection(&mut self, connection: ConnectionState) {
        if self.is_torn_down() || self.connection == connection {
            return;
        }
        self.connection = connection;
        self.publish();
    }

    /// Stop accepting changes. Publishes one final `Closed` version and ends
    /// every subscription.
    pub fn tear_down(&mut self) {
        if self.is_torn_down() {
            return;
        }
        let dropped = self.pending.len();
        self.pending.clear();
        self.lifecycle = Lifecycle::TornDown;
        self.readiness = Readiness::Closed;
        self.connection = ConnectionState::Disconnected;
        self.publish();
        self.publisher.close();
        get_logger().info(
            COMPONENT,
            &format!("🛑 Reconciler torn down ({dropped} queued events discarded)"),
        );
    }

    fn fold_event(&mut self, event: RawDetectionEvent) {
        let Some(current) = self.state.as_deref() else {
            self.pending.push_back(event);
            return;
        };

        let mut next = current.clone();
        next.total_transactions = next.total_transactions.saturating_add(1);
        if event.model_prediction {
            next.fraud_detected = next.fraud_detected.saturating_add(1);
        }
        next.events_since_snapshot = next.events_since_snapshot.saturating_add(1);

        let record = DetectionRecord::from_event(&event, self.now());
        log_debug!(
            COMPONENT,
            "Applied {} ({:?}, p={:.3}) -> total {}",
            record.id,
            record.risk_tier,
            event.model_probability.value(),
            next.total_transactions
        );
        next.recent_detections.push_newest(record);

        Self::enforce_invariants(&mut next);
        self.state = Some(Arc::new(next));
        self.publish();
    }

    /// Clamp instead of publishing an inconsistent state.
    fn enforce_invariants(state: &mut DashboardState) {
        if state.fraud_detected > state.total_transactions {
            let violation = InvariantViolation::FraudExceedsTotal {
                fraud_detected: state.fraud_detected,
                total_transactions: state.total_transactions,
            };
            get_logger().error(COMPONENT, &format!("⚠️ {violation}; clamping"));
            state.fraud_detected = state.total_transactions;
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.clock.current_timestamp())
    }

    fn publish(&mut self) {
        self.version += 1;
        self.publisher.publish(Publication {
            version: self.version,
            readiness: self.readiness.clone(),
            connection: self.connection,
            state: self.state.clone(),
        });
    }
}

/// Messages accepted by the serial mutation point.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Snapshot(DashboardSnapshot),
    SnapshotFailed(SnapshotError),
    Event(RawDetectionEvent),
    Connection(ConnectionState),
    TearDown,
}

/// Cloneable sender side of the engine's command channel.
#[derive(Clone)]
pub struct EngineHandle {
    tx: UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    /// Returns `false` once the engine loop has stopped.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.tx.unbounded_send(command).is_ok()
    }

    pub fn submit_snapshot(&self, snapshot: DashboardSnapshot) -> bool {
        self.send(EngineCommand::Snapshot(snapshot))
    }

    pub fn report_snapshot_failure(&self, error: SnapshotError) -> bool {
        self.send(EngineCommand::SnapshotFailed(error))
    }

    pub fn submit_event(&self, event: RawDetectionEvent) -> bool {
        self.send(EngineCommand::Event(event))
    }

    pub fn report_connection(&self, connection: ConnectionState) -> bool {
        self.send(EngineCommand::Connection(connection))
    }

    pub fn tear_down(&self) -> bool {
        self.send(EngineCommand::TearDown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub fn engine_channel() -> (EngineHandle, UnboundedReceiver<EngineCommand>) {
    let (tx, rx) = unbounded();
    (EngineHandle { tx }, rx)
}

impl ReconciliationEngine {
    pub fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Snapshot(snapshot) => {
                self.apply_snapshot(snapshot);
            }
            EngineCommand::SnapshotFailed(error) => self.record_snapshot_failure(&error),
            EngineCommand::Event(event) => {
                self.apply_event(event);
            }
            EngineCommand::Connection(connection) => self.set_connection(connection),
            EngineCommand::TearDown => self.tear_down(),
        }
    }
}

/// Drain commands one at a time until teardown or until every handle is dropped.
pub async fn run_engine(mut engine: ReconciliationEngine, mut commands: UnboundedReceiver<EngineCommand>) {
    while let Some(command) = commands.next().await {
        engine.handle(command);
        if engine.is_torn_down() {
            break;
        }
    }
    commands.close();
    if !engine.is_torn_down() {
        engine.tear_down();
    }
}
