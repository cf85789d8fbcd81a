#![allow(dead_code)]

use std::sync::Arc;

use fraud_dashboard_wasm::application::{ReconciliationEngine, StatePublisher};
use fraud_dashboard_wasm::domain::dashboard::{
    Amount, ConfusionCounts, DashboardSnapshot, DetectionRecord, ModelScore, Probability,
    RawDetectionEvent, RiskTier, SnapshotHeadline, Timestamp, TransactionId, TrendPoint,
};
use fraud_dashboard_wasm::infrastructure::services::ManualTimeProvider;

pub const START_MS: u64 = 1_709_294_400_000;

pub fn snapshot(total: u64, fraud: u64) -> DashboardSnapshot {
    DashboardSnapshot {
        total_transactions: total,
        fraud_detected: fraud,
        confusion_counts: ConfusionCounts {
            true_positive: 40,
            true_negative: 50,
            false_positive: 6,
            false_negative: 4,
        },
        model_performance: vec![ModelScore { model_name: "Random Forest".to_string(), accuracy: 0.75 }],
        trend: vec![TrendPoint { period: "Mar".to_string(), legitimate_count: 95, fraud_count: 5 }],
        recent_detections: Vec::new(),
        headline: SnapshotHeadline::default(),
    }
}

pub fn record(id: &str, risk_tier: RiskTier, observed_at_ms: u64) -> DetectionRecord {
    DetectionRecord::new(
        TransactionId::from(id),
        Amount::new(10.0),
        risk_tier,
        Timestamp::from_millis(observed_at_ms),
    )
}

pub fn event(id: &str, fraud: bool, probability: f64) -> RawDetectionEvent {
    RawDetectionEvent {
        transaction_id: TransactionId::from(id),
        amount: Amount::new(125.5),
        model_prediction: fraud,
        model_probability: Probability::new(probability).unwrap(),
    }
}

pub fn detection_json(id: &str, prediction: u8, probability: f64) -> String {
    format!(
        r#"{{"transaction":{{"txn_id":"{id}","amount":125.5}},"predictions":{{"random_forest":{{"prediction":{prediction},"probability":{probability}}}}}}}"#
    )
}

pub fn engine_with_clock() -> (ReconciliationEngine, Arc<ManualTimeProvider>) {
    let clock = Arc::new(ManualTimeProvider::new(START_MS));
    let engine = ReconciliationEngine::new(clock.clone(), StatePublisher::new());
    (engine, clock)
}

pub fn recent_ids(engine: &ReconciliationEngine) -> Vec<String> {
    engine
        .state()
        .map(|state| state.recent_detections.iter().map(|r| r.id.value().to_string()).collect())
        .unwrap_or_default()
}
