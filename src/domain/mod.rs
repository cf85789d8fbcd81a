pub mod dashboard;
pub mod errors;
pub mod logging;
pub mod state;

pub use state::{ConnectionState, Publication, Readiness};
