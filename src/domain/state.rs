use std::sync::Arc;

use derive_more::Display;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter};

use crate::domain::dashboard::DashboardState;

/// Stream connection lifecycle: `Disconnected -> Connecting -> Connected -> Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay, EnumIter, AsRefStr)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Whether the dashboard has a baseline to show.
#[derive(Debug, Clone, PartialEq, Eq, Default, Display)]
pub enum Readiness {
    #[default]
    #[display(fmt = "loading")]
    Loading,
    #[display(fmt = "ready")]
    Ready,
    /// The snapshot fetch failed; stays until a reload succeeds.
    #[display(fmt = "unavailable: {}", reason)]
    Unavailable { reason: String },
    #[display(fmt = "closed")]
    Closed,
}

/// One published version of the dashboard, shared immutably with every reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Publication {
    pub version: u64,
    pub readiness: Readiness,
    pub connection: ConnectionState,
    pub state: Option<Arc<DashboardState>>,
}

impl Publication {
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready && self.state.is_some()
    }

    /// Counters may be behind the server while the stream is down.
    pub fn is_live(&self) -> bool {
        self.is_ready() && self.connection == ConnectionState::Connected
    }
}
