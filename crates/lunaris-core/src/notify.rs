//! Best-effort notification of state transitions.
//!
//! The game service calls [`EventSink::emit`] once per event, after the
//! transaction has committed. A sink must never fail the caller: transport
//! errors are the sink's own business.

use std::sync::{Mutex, PoisonError};

use lunaris_types::GameEvent;
use tracing::info;

/// Receiver of committed game events.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Must not block for long and must not panic.
    fn emit(&self, event: &GameEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &GameEvent) {}
}

/// Writes one structured `tracing` line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &GameEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(event = event.name(), %payload, "Game event"),
            Err(e) => info!(event = event.name(), error = %e, "Game event (unserializable)"),
        }
    }
}

/// Keeps every event in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received so far, oldest first.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of every event received so far.
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(GameEvent::name)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &GameEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
