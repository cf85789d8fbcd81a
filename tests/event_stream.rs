#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use common::{START_MS, detection_json, snapshot};
use fraud_dashboard_wasm::application::{
    Delay, EventStreamClient, ReconciliationEngine, ReconnectPolicy, StatePublisher, StreamFrame,
    StreamReport, StreamTransport, engine_channel, run_engine,
};
use fraud_dashboard_wasm::domain::{ConnectionState, Publication, errors::TransportError};
use fraud_dashboard_wasm::infrastructure::services::ManualTimeProvider;
use futures::FutureExt;
use futures::StreamExt;
use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use futures::stream::{self, Iter};

type Script = Result<Vec<Result<StreamFrame, TransportError>>, TransportError>;

/// Each `open` consumes the next script entry; an empty script refuses to connect.
struct ScriptedTransport {
    scripts: VecDeque<Script>,
}

impl ScriptedTransport {
    fn new(scripts: Vec<Script>) -> Self {
        Self { scripts: scripts.into() }
    }
}

impl StreamTransport for ScriptedTransport {
    type Connection = Iter<std::vec::IntoIter<Result<StreamFrame, TransportError>>>;

    async fn open(&mut self) -> Result<Self::Connection, TransportError> {
        let script = self
            .scripts
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Open("no more scripted connections".to_string())));
        script.map(stream::iter)
    }
}

#[derive(Clone, Default)]
struct RecordingDelay {
    waits: Rc<RefCell<Vec<Duration>>>,
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.waits.borrow_mut().push(duration);
        futures::future::ready(()).boxed_local()
    }
}

fn text(json: String) -> Result<StreamFrame, TransportError> {
    Ok(StreamFrame::Text(json))
}

struct Outcome {
    report: StreamReport,
    publications: Vec<Publication>,
    waits: Vec<Duration>,
}

/// Runs the client to completion against a reconciler that already has a
/// 100/5 baseline, then tears the reconciler down and collects every version.
fn drive(transport: ScriptedTransport, policy: ReconnectPolicy) -> Outcome {
    let publisher = StatePublisher::new();
    let subscription = publisher.subscribe();
    let engine = ReconciliationEngine::new(Arc::new(ManualTimeProvider::new(START_MS)), publisher);
    let (handle, commands) = engine_channel();
    handle.submit_snapshot(snapshot(100, 5));

    let delay = RecordingDelay::default();
    let client = EventStreamClient::new(transport, delay.clone(), policy, handle.clone());
    let report = block_on(client.run());

    handle.tear_down();
    block_on(run_engine(engine, commands));
    let publications = block_on(subscription.collect());
    let waits = delay.waits.borrow().clone();
    Outcome { report, publications, waits }
}

fn connection_path(publications: &[Publication]) -> Vec<ConnectionState> {
    let mut path: Vec<ConnectionState> = Vec::new();
    for publication in publications {
        if path.last() != Some(&publication.connection) {
            path.push(publication.connection);
        }
    }
    path
}

fn final_ids(publications: &[Publication]) -> Vec<String> {
    publications
        .last()
        .and_then(|p| p.state.as_ref())
        .map(|state| state.recent_detections.iter().map(|r| r.id.value().to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn malformed_frames_are_dropped_without_closing_the_stream() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        text(detection_json("e1", 1, 0.95)),
        text("not json".to_string()),
        Ok(StreamFrame::Binary(vec![0xff, 0x00])),
        text(detection_json("bad-probability", 0, 1.5)),
        Ok(StreamFrame::Binary(detection_json("e2", 0, 0.2).into_bytes())),
    ])]);

    let outcome = drive(transport, ReconnectPolicy::Never);

    assert_eq!(outcome.report, StreamReport { connections: 1, delivered: 2, malformed: 3 });
    let state = outcome.publications.last().unwrap().state.clone().unwrap();
    assert_eq!((state.total_transactions, state.fraud_detected), (102, 6));
    assert_eq!(final_ids(&outcome.publications), vec!["e2", "e1"]);
}

#[test]
fn connection_lifecycle_is_published() {
    let transport = ScriptedTransport::new(vec![Ok(vec![text(detection_json("e1", 0, 0.1))])]);

    let outcome = drive(transport, ReconnectPolicy::Never);

    assert_eq!(
        connection_path(&outcome.publications),
        vec![
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Disconnected,
        ]
    );
    assert!(outcome.waits.is_empty());
}

#[test]
fn never_policy_stays_down_after_a_failed_open() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::Open("refused".to_string()))]);

    let outcome = drive(transport, ReconnectPolicy::Never);

    assert_eq!(outcome.report, StreamReport::default());
    assert!(outcome.waits.is_empty());
    let state = outcome.publications.last().unwrap().state.clone().unwrap();
    assert_eq!(state.total_transactions, 100);
}

#[test]
fn backoff_reconnects_without_backfilling() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Open("refused".to_string())),
        Ok(vec![
            text(detection_json("e1", 1, 0.9)),
            Err(TransportError::Connection("reset".to_string())),
            text(detection_json("lost", 1, 0.9)),
        ]),
        Ok(vec![text(detection_json("e2", 0, 0.4))]),
    ]);
    let policy =
        ReconnectPolicy::ExponentialBackoff { initial_ms: 100, max_ms: 1_000, max_attempts: Some(3) };

    let outcome = drive(transport, policy);

    assert_eq!(outcome.report, StreamReport { connections: 2, delivered: 2, malformed: 0 });
    let waits: Vec<u64> = outcome.waits.iter().map(|d| d.as_millis() as u64).collect();
    assert_eq!(waits, vec![100, 100, 100, 200, 400]);
    assert_eq!(final_ids(&outcome.publications), vec!["e2", "e1"]);
}

#[test]
fn client_stops_when_the_reconciler_is_gone() {
    let (handle, commands) = engine_channel();
    drop(commands);
    let transport = ScriptedTransport::new(vec![Ok(vec![
        text(detection_json("e1", 0, 0.1)),
        text(detection_json("e2", 0, 0.1)),
    ])]);
    let delay = RecordingDelay::default();
    let client =
        EventStreamClient::new(transport, delay.clone(), ReconnectPolicy::standard_backoff(), handle);

    let report = block_on(client.run());

    assert_eq!(report, StreamReport { connections: 1, delivered: 0, malformed: 0 });
    assert!(delay.waits.borrow().is_empty());
}

#[test]
fn connections_that_fail_before_any_frame_keep_backing_off() {
    let refused = || Ok(vec![Err(TransportError::Connection("refused".to_string()))]);
    let transport = ScriptedTransport::new((0..10).map(|_| refused()).collect());
    let policy =
        ReconnectPolicy::ExponentialBackoff { initial_ms: 100, max_ms: 10_000, max_attempts: Some(3) };

    let outcome = drive(transport, policy);

    let waits: Vec<u64> = outcome.waits.iter().map(|d| d.as_millis() as u64).collect();
    assert_eq!(waits, vec![100, 200, 400]);
    assert_eq!(outcome.report, StreamReport { connections: 4, delivered: 0, malformed: 0 });
    assert_eq!(
        outcome.publications.last().unwrap().connection,
        ConnectionState::Disconnected
    );
}

#[test]
fn missing_fields_are_malformed_and_extra_fields_are_ignored() {
    let without_probability =
        r#"{"transaction":{"txn_id":"m1","amount":10},"predictions":{"random_forest":{"prediction":1}}}"#;
    let without_transaction =
        r#"{"predictions":{"random_forest":{"prediction":0,"probability":0.2}}}"#;
    let with_extras = r#"{"transaction":{"txn_id":"x1","amount":"75.00$","merchant":"ACME","country":"DE"},
        "predictions":{"random_forest":{"prediction":1,"probability":0.82},
                       "xgboost":{"prediction":1,"probability":0.9}},
        "received_at":"2024-03-01T12:00:00Z"}"#;
    let transport = ScriptedTransport::new(vec![Ok(vec![
        text(without_probability.to_string()),
        text(without_transaction.to_string()),
        text(with_extras.to_string()),
    ])]);

    let outcome = drive(transport, ReconnectPolicy::Never);

    assert_eq!(outcome.report, StreamReport { connections: 1, delivered: 1, malformed: 2 });
    let state = outcome.publications.last().unwrap().state.clone().unwrap();
    assert_eq!((state.total_transactions, state.fraud_detected), (101, 6));
    assert_eq!(final_ids(&outcome.publications), vec!["x1"]);
}
