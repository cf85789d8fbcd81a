use std::time::Duration;

use futures::StreamExt;
use futures::stream::LocalBoxStream;
use gloo_net::websocket::{Message, State, futures::WebSocket};

use crate::application::event_stream::{StreamFrame, StreamTransport};
use crate::domain::{
    errors::TransportError,
    logging::{LogComponent, get_logger},
};

const HANDSHAKE_POLL: Duration = Duration::from_millis(25);

/// Detection stream transport based on gloo. Dropping a connection closes the socket.
#[derive(Debug, Clone)]
pub struct DashboardWebSocketClient {
    url: String,
}

impl DashboardWebSocketClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StreamTransport for DashboardWebSocketClient {
    type Connection = LocalBoxStream<'static, Result<StreamFrame, TransportError>>;

    async fn open(&mut self) -> Result<Self::Connection, TransportError> {
        get_logger().info(
            LogComponent::Infrastructure("DashboardWS"),
            &format!("🔌 Connecting to detection stream: {}", self.url),
        );

        let ws = WebSocket::open(&self.url)
            .map_err(|e| TransportError::Open(format!("Failed to open WebSocket: {e:?}")))?;

        // `open` returns before the handshake; wait until the server accepts or refuses.
        loop {
            match ws.state() {
                State::Open => break,
                State::Connecting => gloo_timers::future::sleep(HANDSHAKE_POLL).await,
                State::Closing | State::Closed => {
                    return Err(TransportError::Open(format!("{} refused the connection", self.url)));
                }
            }
        }

        let frames = ws.map(|msg| match msg {
            Ok(Message::Text(data)) => Ok(StreamFrame::Text(data)),
            Ok(Message::Bytes(data)) => Ok(StreamFrame::Binary(data)),
            Err(e) => Err(TransportError::Connection(format!("{e:?}"))),
        });

        Ok(frames.boxed_local())
    }
}
