use serde::Deserialize;
use std::str::FromStr;

use crate::domain::dashboard::{
    ConfusionCounts, DashboardSnapshot, DetectionRecord, ModelScore, RiskTier, SnapshotHeadline,
    TrendPoint,
};
use crate::domain::errors::SnapshotError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::websocket::dto::{WireAmount, WireId};
use crate::time_utils::parse_iso8601_millis;

/// DTO for the dashboard summary endpoint
#[derive(Debug, Deserialize)]
pub struct DashboardSnapshotDto {
    pub total_transaction: u64,
    pub fraud_detected: u64,
    /// Row 0 = [true positive, true negative], row 1 = [false positive, false negative]
    #[serde(rename = "detectionAccuracyData")]
    pub detection_accuracy_data: Vec<Vec<u64>>,
    #[serde(default)]
    pub model_performance: Vec<ModelPerformanceDto>,
    #[serde(default)]
    pub chart_trends: Vec<ChartTrendDto>,
    #[serde(default)]
    pub recent_detection: Vec<RecentDetectionDto>,
    #[serde(default)]
    pub accuracy_rate: Option<f64>,
    #[serde(default, alias = "prevention_saved")]
    pub preventation_saved: Option<f64>,
    #[serde(default)]
    pub fraudulent: Option<u64>,
    #[serde(default)]
    pub legitimate: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ModelPerformanceDto {
    pub model: String,
    pub accuracy: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChartTrendDto {
    pub month: String,
    pub legitimate: u64,
    pub fraud: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecentDetectionDto {
    pub id: WireId,
    pub amount: WireAmount,
    pub risk: String,
    pub time: String,
}

fn malformed(reason: impl Into<String>) -> SnapshotError {
    SnapshotError::Malformed(reason.into())
}

impl DashboardSnapshotDto {
    /// Converts the DTO into the domain snapshot and checks its invariants.
    /// Recent-detection rows that cannot be read are skipped.
    pub fn into_snapshot(self) -> Result<DashboardSnapshot, SnapshotError> {
        let confusion_counts = Self::confusion_counts(&self.detection_accuracy_data)?;

        let recent_detections = self
            .recent_detection
            .into_iter()
            .filter_map(|dto| match dto.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    get_logger().warn(
                        LogComponent::Infrastructure("SnapshotDecoder"),
                        &format!("⚠️ Skipping recent detection: {e}"),
                    );
                    None
                }
            })
            .collect();

        let snapshot = DashboardSnapshot {
            total_transactions: self.total_transaction,
            fraud_detected: self.fraud_detected,
            confusion_counts,
            model_performance: self
                .model_performance
                .into_iter()
                .map(|m| ModelScore { model_name: m.model, accuracy: m.accuracy })
                .collect(),
            trend: self
                .chart_trends
                .into_iter()
                .map(|t| TrendPoint { period: t.month, legitimate_count: t.legitimate, fraud_count: t.fraud })
                .collect(),
            recent_detections,
            headline: SnapshotHeadline {
                accuracy_rate: self.accuracy_rate,
                prevention_saved: self.preventation_saved,
                fraudulent: self.fraudulent,
                legitimate: self.legitimate,
            },
        };

        snapshot.validate()?;
        Ok(snapshot)
    }

    fn confusion_counts(matrix: &[Vec<u64>]) -> Result<ConfusionCounts, SnapshotError> {
        match matrix {
            [first, second] if first.len() == 2 && second.len() == 2 => Ok(ConfusionCounts {
                true_positive: first[0],
                true_negative: first[1],
                false_positive: second[0],
                false_negative: second[1],
            }),
            _ => Err(malformed("detectionAccuracyData must be a 2x2 matrix")),
        }
    }
}

impl RecentDetectionDto {
    fn into_record(self) -> Result<DetectionRecord, SnapshotError> {
        let id = self.id.into_transaction_id("recent_detection.id").map_err(|e| malformed(e.to_string()))?;
        let amount =
            self.amount.into_amount("recent_detection.amount").map_err(|e| malformed(e.to_string()))?;
        let risk_tier = RiskTier::from_str(self.risk.trim())
            .map_err(|_| malformed(format!("unknown risk tier `{}`", self.risk)))?;
        let observed_at = parse_iso8601_millis(&self.time).map_err(malformed)?;
        Ok(DetectionRecord::new(id, amount, risk_tier, observed_at))
    }
}

/// Decode a snapshot response body
pub fn decode_snapshot_body(body: &str) -> Result<DashboardSnapshot, SnapshotError> {
    let dto: DashboardSnapshotDto =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    dto.into_snapshot()
}
