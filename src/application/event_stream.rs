use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::application::reconciler::EngineHandle;
use crate::domain::{
    ConnectionState,
    errors::TransportError,
    logging::{LogComponent, get_logger},
};
use crate::infrastructure::websocket::decode_frame;
use crate::{log_debug, log_warn};

const COMPONENT: LogComponent = LogComponent::Application("EventStream");

/// One inbound frame from the push channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Trait for the push-channel transport
#[allow(async_fn_in_trait)]
pub trait StreamTransport {
    type Connection: Stream<Item = Result<StreamFrame, TransportError>> + Unpin;

    async fn open(&mut self) -> Result<Self::Connection, TransportError>;
}

/// Timer used between reconnect attempts
pub trait Delay {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// What to do after the connection closes or fails to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Stay disconnected; an explicit restart is required.
    #[default]
    Never,
    /// Retry with a doubling delay capped at `max_ms`. Events missed while
    /// disconnected are not backfilled.
    ExponentialBackoff { initial_ms: u64, max_ms: u64, max_attempts: Option<u32> },
}

impl ReconnectPolicy {
    /// 1s doubling up to 32s, unlimited attempts.
    pub fn standard_backoff() -> Self {
        ReconnectPolicy::ExponentialBackoff { initial_ms: 1_000, max_ms: 32_000, max_attempts: None }
    }

    /// Delay before reconnect attempt number `attempt` (0-based), or `None` to give up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::ExponentialBackoff { initial_ms, max_ms, max_attempts } => {
                if max_attempts.is_some_and(|max| attempt >= max) {
                    return None;
                }
                let factor = 1u64.checked_shl(attempt.min(63)).unwrap_or(u64::MAX);
                let delay = initial_ms.saturating_mul(factor).min(max_ms);
                Some(Duration::from_millis(delay))
            }
        }
    }
}

/// Counters returned when the client stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamReport {
    pub connections: u32,
    pub delivered: u64,
    pub malformed: u64,
}

/// Event stream client: connect, decode, forward, and optionally retry.
pub struct EventStreamClient<T, D> {
    transport: T,
    delay: D,
    policy: ReconnectPolicy,
    engine: EngineHandle,
    state: ConnectionState,
    report: StreamReport,
}

impl<T, D> EventStreamClient<T, D>
where
    T: StreamTransport,
    D: Delay,
{
    pub fn new(transport: T, delay: D, policy: ReconnectPolicy, engine: EngineHandle) -> Self {
        Self {
            transport,
            delay,
            policy,
            engine,
            state: ConnectionState::Disconnected,
            report: StreamReport::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Runs until the policy gives up or the engine stops listening.
    pub async fn run(mut self) -> StreamReport {
        let mut attempt = 0u32;
        loop {
            self.transition(ConnectionState::Connecting);
            match self.transport.open().await {
                Ok(connection) => {
                    self.report.connections += 1;
                    self.transition(ConnectionState::Connected);
                    get_logger().info(COMPONENT, "🚀 Detection stream connected");
                    // Backoff restarts only once the connection has carried a frame.
                    if self.pump(connection).await {
                        attempt = 0;
                    }
                }
                Err(e) => {
                    get_logger().error(COMPONENT, &format!("❌ Connection error: {e}"));
                }
            }
            self.transition(ConnectionState::Disconnected);

            if self.engine.is_closed() {
                break;
            }
            let Some(wait) = self.policy.delay_for(attempt) else {
                get_logger().warn(COMPONENT, "🔌 Stream disconnected; not reconnecting");
                break;
            };
            get_logger().warn(
                COMPONENT,
                &format!("🔌 Reconnecting in {}ms (attempt {})", wait.as_millis(), attempt + 1),
            );
            self.delay.sleep(wait).await;
            attempt = attempt.saturating_add(1);
        }
        self.report
    }

    /// Forward frames in arrival order until the connection ends.
    /// Returns whether any frame arrived.
    async fn pump(&mut self, mut connection: T::Connection) -> bool {
        let mut received = false;
        while let Some(frame) = connection.next().await {
            if frame.is_ok() {
                received = true;
            }
            match frame {
                Ok(frame) => match decode_frame(&frame) {
                    Ok(event) => {
                        log_debug!(COMPONENT, "📨 Detection {} received", event.transaction_id);
                        if !self.engine.submit_event(event) {
                            get_logger().warn(COMPONENT, "Reconciler stopped; closing stream");
                            return received;
                        }
                        self.report.delivered += 1;
                    }
                    Err(e) => {
                        self.report.malformed += 1;
                        log_warn!(COMPONENT, "⚠️ Dropping malformed message: {e}");
                    }
                },
                Err(e) => {
                    get_logger().error(COMPONENT, &format!("❌ Stream error: {e}"));
                    return received;
                }
            }
        }
        get_logger().info(COMPONENT, "Stream closed by server");
        received
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        log_debug!(COMPONENT, "{} -> {}", self.state, next);
        self.state = next;
        self.engine.report_connection(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_policy_gives_up_immediately() {
        assert_eq!(ReconnectPolicy::Never.delay_for(0), None);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = ReconnectPolicy::standard_backoff();
        let delays: Vec<u64> =
            (0..8).map(|a| policy.delay_for(a).unwrap().as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000, 32_000, 32_000, 32_000]);
        assert_eq!(policy.delay_for(200), Some(Duration::from_millis(32_000)));
    }

    #[test]
    fn backoff_respects_attempt_limit() {
        let policy =
            ReconnectPolicy::ExponentialBackoff { initial_ms: 10, max_ms: 100, max_attempts: Some(2) };
        assert!(policy.delay_for(1).is_some());
        assert_eq!(policy.delay_for(2), None);
    }
}
