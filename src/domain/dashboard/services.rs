use super::value_objects::{Probability, RiskTier, Timestamp};
use std::fmt;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// Risk classification service
pub fn classify_risk(probability: Probability) -> RiskTier {
    RiskTier::from_probability(probability)
}

/// Coarse elapsed-time bucket, truncated toward zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAgo {
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
    Days(u64),
}

impl TimeAgo {
    /// Pure function of both instants; a future `observed_at` counts as zero elapsed.
    pub fn between(now: Timestamp, observed_at: Timestamp) -> Self {
        let elapsed = now.seconds_since(observed_at);
        if elapsed < SECONDS_PER_MINUTE {
            TimeAgo::Seconds(elapsed)
        } else if elapsed < SECONDS_PER_HOUR {
            TimeAgo::Minutes(elapsed / SECONDS_PER_MINUTE)
        } else if elapsed < SECONDS_PER_DAY {
            TimeAgo::Hours(elapsed / SECONDS_PER_HOUR)
        } else {
            TimeAgo::Days(elapsed / SECONDS_PER_DAY)
        }
    }
}

impl fmt::Display for TimeAgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = match *self {
            TimeAgo::Seconds(v) => (v, "second"),
            TimeAgo::Minutes(v) => (v, "minute"),
            TimeAgo::Hours(v) => (v, "hour"),
            TimeAgo::Days(v) => (v, "day"),
        };
        let plural = if value == 1 { "" } else { "s" };
        write!(f, "{value} {unit}{plural} ago")
    }
}
