//! Host side channels: the log window, user alerts and the host's own
//! translation lifecycle.
//!
//! The engine never talks to a UI directly. Everything user-facing goes
//! through a [`Host`], so an embedding application decides where progress
//! lines and alerts end up.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Host`] | Trait for host destinations |
//! | [`TracingHost`] | Default host, routes everything to `tracing` |
//! | [`RecordingHost`] | In-memory host for testing |

use std::sync::{Arc, Mutex};

pub trait Host: Send + Sync {
    /// Append a line to the host's log window.
    fn log(&self, text: &str);

    /// Show a user-facing alert.
    fn alert(&self, text: &str);

    /// Ask the host to stop its running translation job.
    fn abort_translation(&self) {}

    /// Host-side engine initialisation.
    fn init(&self) {}
}

/// Host that only emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHost;

impl Host for TracingHost {
    fn log(&self, text: &str) {
        tracing::info!(target: "custom_engine::host", "{}", text);
    }

    fn alert(&self, text: &str) {
        tracing::warn!(target: "custom_engine::host", alert = true, "{}", text);
    }
}

pub fn tracing_host() -> Arc<dyn Host> {
    Arc::new(TracingHost)
}

/// Something a [`RecordingHost`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Log(String),
    Alert(String),
    AbortTranslation,
    Init,
}

/// In-memory host for testing.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: HostEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Log(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Alert(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Host for RecordingHost {
    fn log(&self, text: &str) {
        self.push(HostEvent::Log(text.to_string()));
    }

    fn alert(&self, text: &str) {
        self.push(HostEvent::Alert(text.to_string()));
    }

    fn abort_translation(&self) {
        self.push(HostEvent::AbortTranslation);
    }

    fn init(&self) {
        self.push(HostEvent::Init);
    }
}
