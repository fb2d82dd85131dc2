//! State shared between the rebuild loop and the HTTP server.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gantry_config::DevOptions;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

/// Where the rebuild loop currently stands.
#[derive(Debug, Clone)]
pub enum BuildStatus {
    Idle,
    Building,
    Ready { duration_ms: u64, documents: usize },
    Failed { message: String },
}

impl BuildStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BuildStatus::Idle => "idle",
            BuildStatus::Building => "building",
            BuildStatus::Ready { .. } => "ready",
            BuildStatus::Failed { .. } => "failed",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// One message on the `/__gantry/events` stream.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadEvent {
    /// Monotonic per announcement. Lets the client tell a fresh event
    /// apart from the snapshot replayed when it connects.
    pub generation: u64,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Shared handle for the watcher thread and axum handlers.
pub type SharedState = Arc<DevServerState>;

pub struct DevServerState {
    pub output_root: PathBuf,
    pub options: DevOptions,
    status: RwLock<BuildStatus>,
    generation: AtomicU64,
    tx: broadcast::Sender<ReloadEvent>,
}

impl DevServerState {
    pub fn new(output_root: PathBuf, options: DevOptions) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            output_root,
            options,
            status: RwLock::new(BuildStatus::Idle),
            generation: AtomicU64::new(0),
            tx,
        }
    }

    pub fn status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    /// Record a new status and push it to every connected client.
    /// Sending with no subscribers is fine, the event just drops.
    pub fn announce(&self, status: BuildStatus) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let event = Self::event(&status, generation);
        *self.status.write() = status;
        let _ = self.tx.send(event);
    }

    /// The current status as an event. Replayed to fresh connections
    /// so the client can baseline its generation counter.
    pub fn snapshot(&self) -> ReloadEvent {
        Self::event(&self.status.read(), self.generation.load(Ordering::SeqCst))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    fn event(status: &BuildStatus, generation: u64) -> ReloadEvent {
        ReloadEvent {
            generation,
            status: status.label(),
            message: status.message().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DevServerState {
        DevServerState::new(PathBuf::from("dist"), DevOptions::default())
    }

    #[test]
    fn starts_idle_at_generation_zero() {
        let state = state();
        assert_eq!(state.status().label(), "idle");
        assert_eq!(state.snapshot().generation, 0);
    }

    #[test]
    fn announce_bumps_the_generation_and_swaps_the_status() {
        let state = state();
        state.announce(BuildStatus::Building);
        state.announce(BuildStatus::Ready {
            duration_ms: 40,
            documents: 2,
        });

        let snapshot = state.snapshot();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.status, "ready");
        assert!(snapshot.message.is_none());
    }

    #[test]
    fn failures_carry_their_message() {
        let state = state();
        state.announce(BuildStatus::Failed {
            message: "style bundle broke".to_string(),
        });
        assert_eq!(state.snapshot().message.as_deref(), Some("style bundle broke"));
    }

    #[test]
    fn events_serialize_without_a_message_field_when_none() {
        let event = ReloadEvent {
            generation: 3,
            status: "ready",
            message: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "generation": 3, "status": "ready" }));
    }

    #[tokio::test]
    async fn subscribers_receive_announcements() {
        let state = state();
        let mut rx = state.subscribe();

        state.announce(BuildStatus::Failed {
            message: "nope".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.generation, 1);
        assert_eq!(event.status, "failed");
        assert_eq!(event.message.as_deref(), Some("nope"));
    }
}
