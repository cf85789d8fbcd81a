//! Derived-view adapter: pure projections of a `DashboardState` into
//! chart series and table rows. Owns no state; same input, same output.

use serde::Serialize;

use crate::domain::dashboard::{DashboardState, RiskTier, Timestamp};
use crate::time_utils::format_time_ago;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub total_transactions: u64,
    pub fraud_detected: u64,
    pub fraud_rate_percent: f64,
    pub accuracy_percent: Option<f64>,
    pub prevention_saved: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeriesPoint {
    pub label: String,
    pub legitimate: u64,
    pub fraud: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub name: String,
    pub value: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBar {
    pub model: String,
    pub accuracy_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionRow {
    pub id: String,
    pub amount: String,
    pub risk: RiskTier,
    pub age: String,
}

/// Everything the dashboard page renders, in one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub summary: SummaryCards,
    pub trend: Vec<TrendSeriesPoint>,
    pub distribution: Vec<DistributionSlice>,
    pub distribution_is_stale: bool,
    pub models: Vec<ModelBar>,
    pub recent: Vec<DetectionRow>,
}

/// The service reports the headline accuracy either as a fraction or already in percent.
fn as_percent(rate: f64) -> f64 {
    if rate <= 1.0 { rate * 100.0 } else { rate }
}

pub fn summary_cards(state: &DashboardState) -> SummaryCards {
    SummaryCards {
        total_transactions: state.total_transactions,
        fraud_detected: state.fraud_detected,
        fraud_rate_percent: state.fraud_rate() * 100.0,
        accuracy_percent: state.headline.accuracy_rate.map(as_percent),
        prevention_saved: state.headline.prevention_saved,
    }
}

pub fn trend_series(state: &DashboardState) -> Vec<TrendSeriesPoint> {
    state
        .trend
        .iter()
        .map(|point| TrendSeriesPoint {
            label: point.period.clone(),
            legitimate: point.legitimate_count,
            fraud: point.fraud_count,
        })
        .collect()
}

pub fn distribution_slices(state: &DashboardState) -> Vec<DistributionSlice> {
    state
        .distribution
        .buckets
        .iter()
        .map(|bucket| DistributionSlice {
            name: bucket.label.to_string(),
            value: bucket.count,
            percent: bucket.fraction * 100.0,
        })
        .collect()
}

pub fn model_performance_bars(state: &DashboardState) -> Vec<ModelBar> {
    state
        .model_performance
        .iter()
        .map(|score| ModelBar {
            model: score.model_name.clone(),
            accuracy_percent: score.accuracy * 100.0,
        })
        .collect()
}

pub fn recent_detection_rows(state: &DashboardState, now: Timestamp) -> Vec<DetectionRow> {
    state
        .recent_detections
        .iter()
        .map(|record| DetectionRow {
            id: record.id.value().to_string(),
            amount: record.amount.to_display_string(),
            risk: record.risk_tier,
            age: format_time_ago(now, record.observed_at),
        })
        .collect()
}

pub fn dashboard_view(state: &DashboardState, now: Timestamp) -> DashboardView {
    DashboardView {
        summary: summary_cards(state),
        trend: trend_series(state),
        distribution: distribution_slices(state),
        distribution_is_stale: state.distribution_is_stale(),
        models: model_performance_bars(state),
        recent: recent_detection_rows(state, now),
    }
}
