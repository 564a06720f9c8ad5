//! NATS event publisher for the engine.
//!
//! [`NatsSink`] implements [`EventSink`] by publishing every game event as
//! JSON to a NATS subject derived from the event name.
//!
//! # Subject Convention
//!
//! `lunaris.events.{name}` with the `:` separators of the event name turned
//! into `.` tokens, e.g. `building:started` is published on
//! `lunaris.events.building.started`. Subscribers can filter with
//! wildcards such as `lunaris.events.fleet.>`.
//!
//! # Sync/Async Bridge
//!
//! [`EventSink::emit`] is synchronous and runs after the transaction has
//! committed. Publishing is spawned onto the current tokio runtime so a slow
//! or unreachable NATS server never holds up a game operation; failures are
//! logged and dropped.

use lunaris_core::EventSink;
use lunaris_types::GameEvent;
use tracing::{debug, warn};

/// Subject prefix for all game events.
const SUBJECT_PREFIX: &str = "lunaris.events";

/// An event sink that publishes to NATS.
pub struct NatsSink {
    /// The NATS client connection.
    client: async_nats::Client,
}

impl NatsSink {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns the connection error if the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        let client = async_nats::connect(url).await?;
        Ok(Self { client })
    }
}

/// The NATS subject an event is published on.
pub fn subject_for(event: &GameEvent) -> String {
    format!("{SUBJECT_PREFIX}.{}", event.name().replace(':', "."))
}

impl EventSink for NatsSink {
    fn emit(&self, event: &GameEvent) {
        let subject = subject_for(event);
        let payload = match serde_json::to_vec(event) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(subject, error = %e, "Failed to serialize game event");
                return;
            }
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            match client.publish(subject.clone(), payload.into()).await {
                Ok(()) => debug!(subject, "Published game event"),
                Err(e) => warn!(subject, error = %e, "Failed to publish game event"),
            }
        });
    }
}
