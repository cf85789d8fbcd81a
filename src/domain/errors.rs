//! Error taxonomy of the dashboard client.
//!
//! Transport and decoding failures are handled at their own layer; the
//! reconciler itself is total over validated inputs and never returns these.

use derive_more::{Display, From};

/// Snapshot fetch or decode failure. Leaves the dashboard "not ready" until
/// an explicit reload succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SnapshotError {
    #[display(fmt = "snapshot request failed: {}", _0)]
    Transport(String),
    #[display(fmt = "snapshot endpoint answered HTTP {}", _0)]
    Status(u16),
    #[display(fmt = "snapshot body is malformed: {}", _0)]
    Malformed(String),
    #[display(fmt = "snapshot is inconsistent: {}", _0)]
    Inconsistent(String),
    #[display(fmt = "dashboard session has stopped")]
    SessionStopped,
}

impl std::error::Error for SnapshotError {}

/// Stream connection failure. Ends the current connection; events missed
/// while disconnected are never replayed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TransportError {
    #[display(fmt = "failed to open stream: {}", _0)]
    Open(String),
    #[display(fmt = "stream connection lost: {}", _0)]
    Connection(String),
}

impl std::error::Error for TransportError {}

/// A single stream payload that could not be turned into a detection event.
/// Dropped individually; the connection stays up.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MalformedMessage {
    #[display(fmt = "undecodable payload: {}", _0)]
    Undecodable(String),
    #[display(fmt = "invalid field `{}`: {}", field, reason)]
    InvalidField { field: &'static str, reason: String },
}

impl std::error::Error for MalformedMessage {}

/// Derived-state inconsistency detected before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum InvariantViolation {
    #[display(fmt = "fraud_detected {} exceeds total_transactions {}", fraud_detected, total_transactions)]
    FraudExceedsTotal { fraud_detected: u64, total_transactions: u64 },
}

impl std::error::Error for InvariantViolation {}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ConfigError {
    #[display(fmt = "invalid dashboard config: {}", _0)]
    Parse(String),
    #[display(fmt = "dashboard config field `{}` is out of range", _0)]
    OutOfRange(&'static str),
}

impl std::error::Error for ConfigError {}

/// Umbrella error for entry points that surface any of the above.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum DashboardError {
    Snapshot(SnapshotError),
    Transport(TransportError),
    Malformed(MalformedMessage),
    Config(ConfigError),
}

impl std::error::Error for DashboardError {}

