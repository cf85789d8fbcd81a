#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::sync::OnceLock;

use common::{engine_with_clock, event, snapshot};
use fraud_dashboard_wasm::domain::logging::{BufferLogger, LogComponent, LogLevel, init_logger};
use fraud_dashboard_wasm::infrastructure::websocket::decode_detection;

/// The global logger can be installed once per process; every test shares it.
fn logger() -> &'static BufferLogger {
    static LOGGER: OnceLock<BufferLogger> = OnceLock::new();
    LOGGER.get_or_init(|| {
        let logger = BufferLogger::with_min_level(LogLevel::Info);
        init_logger(Box::new(logger.clone()));
        logger
    })
}

#[test]
fn clamping_an_inconsistent_baseline_is_reported() {
    let logger = logger();
    let (mut engine, _) = engine_with_clock();
    engine.apply_snapshot(snapshot(3, 9));
    engine.apply_event(event("t1", true, 0.9));

    let errors = logger.messages_at(LogLevel::Error);
    assert!(errors.iter().any(|m| m.contains("fraud_detected 9 exceeds total_transactions 3")));
    assert_eq!(engine.state().unwrap().fraud_detected, 4);
}

#[test]
fn entries_carry_their_layer() {
    let logger = logger();
    let (mut engine, _) = engine_with_clock();
    engine.apply_snapshot(snapshot(5, 1));

    assert!(logger.entries().iter().any(|entry| {
        entry.component == LogComponent::Application("Reconciler")
            && entry.message.contains("Snapshot applied: 5 transactions, 1 fraud")
    }));
}

#[test]
fn malformed_messages_describe_the_offending_field() {
    let error = decode_detection(r#"{"transaction":{"txn_id":"a","amount":"lots"},"predictions":{"random_forest":{"prediction":1,"probability":0.3}}}"#)
        .unwrap_err();
    assert!(error.to_string().contains("transaction.amount"));
}
