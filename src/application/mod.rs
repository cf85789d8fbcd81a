pub mod event_stream;
pub mod publisher;
pub mod reconciler;
pub mod session;
pub mod snapshot_loader;
pub mod views;

pub use event_stream::*;
pub use publisher::*;
pub use reconciler::*;
pub use session::*;
pub use snapshot_loader::*;
