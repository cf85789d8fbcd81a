use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - transaction identifier as sent by the scoring service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Transaction id cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Value Object - transaction amount
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, From, Into, Constructor, Serialize, Deserialize)]
pub struct Amount(f64);

impl Amount {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Dashboard rendering, e.g. `125.50$`.
    pub fn to_display_string(&self) -> String {
        format!("{:.2}$", self.0)
    }
}

/// Value Object - model fraud probability, always inside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Into, Serialize, Deserialize)]
pub struct Probability(f64);

impl Probability {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(format!("probability {value} is outside [0, 1]"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Value Object - wall-clock time in milliseconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Deref, Constructor,
    Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn from_millis(value: u64) -> Self {
        Self(value)
    }

    pub fn from_secs(value: u64) -> Self {
        Self(value.saturating_mul(1000))
    }

    /// Whole seconds elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn seconds_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0) / 1000
    }
}

/// Coarse risk bucket derived from a fraud probability
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumString, AsRefStr,
    Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Probabilities strictly above this are `High`.
pub const HIGH_RISK_THRESHOLD: f64 = 0.8;
/// Probabilities strictly above this (and not `High`) are `Medium`.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.5;

impl RiskTier {
    /// Boundary values resolve to the lower tier: 0.8 is `Medium`, 0.5 is `Low`.
    pub fn from_probability(probability: Probability) -> Self {
        let p = probability.value();
        if p > HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if p > MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}
