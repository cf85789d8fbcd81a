pub use super::value_objects::{Amount, Probability, RiskTier, Timestamp, TransactionId};
use crate::domain::errors::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter};

/// Default size of the recent-activity feed
pub const RECENT_DETECTION_CAPACITY: usize = 5;

/// One streamed detection outcome, as decoded from the wire. Consumed once
/// by the reconciler and then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetectionEvent {
    pub transaction_id: TransactionId,
    pub amount: Amount,
    pub model_prediction: bool,
    pub model_probability: Probability,
}

/// Domain entity - an entry of the recent detections feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: TransactionId,
    pub amount: Amount,
    pub risk_tier: RiskTier,
    pub observed_at: Timestamp,
}

impl DetectionRecord {
    pub fn new(id: TransactionId, amount: Amount, risk_tier: RiskTier, observed_at: Timestamp) -> Self {
        Self { id, amount, risk_tier, observed_at }
    }

    /// Record for a streamed event, stamped with the local processing time.
    pub fn from_event(event: &RawDetectionEvent, observed_at: Timestamp) -> Self {
        Self {
            id: event.transaction_id.clone(),
            amount: event.amount,
            risk_tier: RiskTier::from_probability(event.model_probability),
            observed_at,
        }
    }
}

/// Domain entity - bounded newest-first feed with oldest-eviction
#[derive(Debug, Clone, PartialEq)]
pub struct RecentDetections {
    records: VecDeque<DetectionRecord>,
    capacity: usize,
}

impl Default for RecentDetections {
    fn default() -> Self {
        Self::new(RECENT_DETECTION_CAPACITY)
    }
}

impl RecentDetections {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { records: VecDeque::with_capacity(capacity + 1), capacity }
    }

    /// Build from records already ordered newest-first; extras past capacity are dropped.
    pub fn from_newest_first(records: impl IntoIterator<Item = DetectionRecord>, capacity: usize) -> Self {
        let mut feed = Self::new(capacity);
        feed.records.extend(records.into_iter().take(feed.capacity));
        feed
    }

    pub fn push_newest(&mut self, record: DetectionRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionRecord> {
        self.records.iter()
    }

    pub fn newest(&self) -> Option<&DetectionRecord> {
        self.records.front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Snapshot-sourced confusion matrix counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: u64,
    pub true_negative: u64,
    pub false_positive: u64,
    pub false_negative: u64,
}

impl ConfusionCounts {
    pub fn total(&self) -> u64 {
        self.true_positive
            .saturating_add(self.true_negative)
            .saturating_add(self.false_positive)
            .saturating_add(self.false_negative)
    }

    pub fn count(&self, label: OutcomeLabel) -> u64 {
        match label {
            OutcomeLabel::TruePositive => self.true_positive,
            OutcomeLabel::TrueNegative => self.true_negative,
            OutcomeLabel::FalsePositive => self.false_positive,
            OutcomeLabel::FalseNegative => self.false_negative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, AsRefStr, Serialize, Deserialize)]
pub enum OutcomeLabel {
    #[strum(serialize = "True Positive")]
    TruePositive,
    #[strum(serialize = "True Negative")]
    TrueNegative,
    #[strum(serialize = "False Positive")]
    FalsePositive,
    #[strum(serialize = "False Negative")]
    FalseNegative,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub label: OutcomeLabel,
    pub count: u64,
    pub fraction: f64,
}

/// Proportion-of-outcomes buckets, computed once per snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionDistribution {
    pub buckets: [DistributionBucket; 4],
}

impl DetectionDistribution {
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let total = counts.total();
        let bucket = |label: OutcomeLabel| {
            let count = counts.count(label);
            let fraction = if total == 0 { 0.0 } else { count as f64 / total as f64 };
            DistributionBucket { label, count, fraction }
        };
        Self {
            buckets: [
                bucket(OutcomeLabel::TruePositive),
                bucket(OutcomeLabel::TrueNegative),
                bucket(OutcomeLabel::FalsePositive),
                bucket(OutcomeLabel::FalseNegative),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model_name: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub legitimate_count: u64,
    pub fraud_count: u64,
}

/// Headline figures the scoring service reports alongside the counters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotHeadline {
    pub accuracy_rate: Option<f64>,
    pub prevention_saved: Option<f64>,
    pub fraudulent: Option<u64>,
    pub legitimate: Option<u64>,
}

/// Decoded snapshot payload, prior to becoming the canonical state
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub total_transactions: u64,
    pub fraud_detected: u64,
    pub confusion_counts: ConfusionCounts,
    pub model_performance: Vec<ModelScore>,
    pub trend: Vec<TrendPoint>,
    /// Newest-first
    pub recent_detections: Vec<DetectionRecord>,
    pub headline: SnapshotHeadline,
}

impl DashboardSnapshot {
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.fraud_detected > self.total_transactions {
            return Err(SnapshotError::Inconsistent(format!(
                "fraud_detected {} exceeds total_transactions {}",
                self.fraud_detected, self.total_transactions
            )));
        }
        if let Some(score) =
            self.model_performance.iter().find(|s| !(0.0..=1.0).contains(&s.accuracy))
        {
            return Err(SnapshotError::Inconsistent(format!(
                "model `{}` accuracy {} is outside [0, 1]",
                score.model_name, score.accuracy
            )));
        }
        Ok(())
    }
}

/// Aggregate root - the canonical on-screen metrics.
///
/// Never mutated once published: the reconciler builds a new value for every
/// change and readers share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub total_transactions: u64,
    pub fraud_detected: u64,
    pub confusion_counts: ConfusionCounts,
    pub distribution: DetectionDistribution,
    pub model_performance: Vec<ModelScore>,
    pub trend: Vec<TrendPoint>,
    pub recent_detections: RecentDetections,
    pub headline: SnapshotHeadline,
    pub snapshot_observed_at: Timestamp,
    /// Streamed events folded in since the last snapshot. The distribution
    /// buckets lag the live counters whenever this is non-zero.
    pub events_since_snapshot: u64,
}

impl DashboardState {
    pub fn from_snapshot(snapshot: DashboardSnapshot, observed_at: Timestamp, capacity: usize) -> Self {
        let distribution = DetectionDistribution::from_counts(&snapshot.confusion_counts);
        Self {
            total_transactions: snapshot.total_transactions,
            fraud_detected: snapshot.fraud_detected,
            confusion_counts: snapshot.confusion_counts,
            distribution,
            model_performance: snapshot.model_performance,
            trend: snapshot.trend,
            recent_detections: RecentDetections::from_newest_first(snapshot.recent_detections, capacity),
            headline: snapshot.headline,
            snapshot_observed_at: observed_at,
            events_since_snapshot: 0,
        }
    }

    pub fn fraud_rate(&self) -> f64 {
        if self.total_transactions == 0 {
            0.0
        } else {
            self.fraud_detected as f64 / self.total_transactions as f64
        }
    }

    pub fn distribution_is_stale(&self) -> bool {
        self.events_since_snapshot > 0
    }
}
