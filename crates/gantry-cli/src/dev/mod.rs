//! The development server.
//!
//! Three pieces cooperate through [`DevServerState`]: a filesystem
//! watcher that rebuilds on change, an axum server that serves the
//! output tree from disk, and a Server-Sent Events channel that tells
//! connected browsers when to reload.

pub mod server;
pub mod state;
pub mod watcher;

pub use state::{BuildStatus, DevServerState, ReloadEvent, SharedState};
pub use watcher::{FileWatcher, WatchConfig};
