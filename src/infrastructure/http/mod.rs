//! REST access to the scoring service's dashboard summary.

pub mod dashboard_rest_client;
pub mod dto;

pub use dashboard_rest_client::DashboardHttpClient;
pub use dto::{DashboardSnapshotDto, decode_snapshot_body};
