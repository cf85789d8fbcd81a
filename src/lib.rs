//! Fraud detection dashboard core: snapshot loading, the live detection
//! stream, reconciliation of the two into one consistent state, and the
//! derived views the page renders.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

pub use application::{DashboardSession, SessionReport, StatePublisher};
pub use config::DashboardConfig;
pub use domain::{ConnectionState, Publication, Readiness};
