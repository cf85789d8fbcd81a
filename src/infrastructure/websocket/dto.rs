use serde::Deserialize;

use crate::application::event_stream::StreamFrame;
use crate::domain::dashboard::{Amount, Probability, RawDetectionEvent, TransactionId};
use crate::domain::errors::MalformedMessage;

/// Identifier as it appears on the wire: a string or a bare number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireId {
    pub fn into_transaction_id(self, field: &'static str) -> Result<TransactionId, MalformedMessage> {
        let raw = match self {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        };
        TransactionId::new(raw).map_err(|reason| MalformedMessage::InvalidField { field, reason })
    }
}

/// Amount as it appears on the wire: a number, or text such as `"125.50$"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireAmount {
    Number(f64),
    Text(String),
}

impl WireAmount {
    pub fn into_amount(self, field: &'static str) -> Result<Amount, MalformedMessage> {
        let value = match self {
            WireAmount::Number(value) => value,
            WireAmount::Text(text) => {
                let trimmed = text.trim().trim_matches('$').trim();
                trimmed.parse::<f64>().map_err(|_| MalformedMessage::InvalidField {
                    field,
                    reason: format!("`{text}` is not an amount"),
                })?
            }
        };
        if !value.is_finite() {
            return Err(MalformedMessage::InvalidField { field, reason: "amount is not finite".to_string() });
        }
        Ok(Amount::new(value))
    }
}

/// Binary verdict: `0|1` from the scoring service, booleans tolerated
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WirePrediction {
    Flag(bool),
    Class(i64),
}

impl WirePrediction {
    fn into_flag(self) -> Result<bool, MalformedMessage> {
        match self {
            WirePrediction::Flag(flag) => Ok(flag),
            WirePrediction::Class(0) => Ok(false),
            WirePrediction::Class(1) => Ok(true),
            WirePrediction::Class(other) => Err(MalformedMessage::InvalidField {
                field: "predictions.random_forest.prediction",
                reason: format!("expected 0 or 1, got {other}"),
            }),
        }
    }
}

/// DTO for one pushed detection. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct DetectionMessageDto {
    pub transaction: TransactionDto,
    pub predictions: PredictionsDto,
}

#[derive(Debug, Deserialize)]
pub struct TransactionDto {
    pub txn_id: WireId,
    pub amount: WireAmount,
}

#[derive(Debug, Deserialize)]
pub struct PredictionsDto {
    pub random_forest: ModelPredictionDto,
}

#[derive(Debug, Deserialize)]
pub struct ModelPredictionDto {
    pub prediction: WirePrediction,
    pub probability: f64,
}

impl DetectionMessageDto {
    /// Converts the DTO into the domain event
    pub fn into_event(self) -> Result<RawDetectionEvent, MalformedMessage> {
        let verdict = self.predictions.random_forest;
        let model_probability = Probability::new(verdict.probability).map_err(|reason| {
            MalformedMessage::InvalidField { field: "predictions.random_forest.probability", reason }
        })?;

        Ok(RawDetectionEvent {
            transaction_id: self.transaction.txn_id.into_transaction_id("transaction.txn_id")?,
            amount: self.transaction.amount.into_amount("transaction.amount")?,
            model_prediction: verdict.prediction.into_flag()?,
            model_probability,
        })
    }
}

/// Decode a JSON text message into a detection event
pub fn decode_detection(data: &str) -> Result<RawDetectionEvent, MalformedMessage> {
    let dto: DetectionMessageDto =
        serde_json::from_str(data).map_err(|e| MalformedMessage::Undecodable(e.to_string()))?;
    dto.into_event()
}

/// Binary frames are accepted when they carry UTF-8 JSON.
pub fn decode_frame(frame: &StreamFrame) -> Result<RawDetectionEvent, MalformedMessage> {
    match frame {
        StreamFrame::Text(text) => decode_detection(text),
        StreamFrame::Binary(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| MalformedMessage::Undecodable(format!("binary frame is not UTF-8: {e}")))?;
            decode_detection(text)
        }
    }
}
