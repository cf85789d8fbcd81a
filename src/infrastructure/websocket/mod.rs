//! WebSocket transport and data transfer objects.
//!
//! Currently this module provides a client for the detection push channel.

pub mod dashboard_client;
pub mod dto;

pub use dashboard_client::*;
pub use dto::*;
