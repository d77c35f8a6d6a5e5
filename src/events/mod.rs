//! Event Transport Module
//!
//! In-process topic bus standing in for the durable event log: request
//! handlers publish JSON messages to `content.created` / `content.deleted`,
//! the fan-out consumer drains them. Delivery is in-order per process; the
//! consumer stays idempotent and order-tolerant regardless, so the same
//! handlers hold under an at-least-once transport.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

// == Topics ==
/// Topic for content-creation events
pub const TOPIC_CONTENT_CREATED: &str = "content.created";
/// Topic for content-deletion events
pub const TOPIC_CONTENT_DELETED: &str = "content.deleted";

// == Envelope ==
/// One message on the bus: a topic and a JSON payload.
#[derive(Debug)]
pub struct EventEnvelope {
    pub topic: &'static str,
    pub payload: Vec<u8>,
}

// == Publisher ==
/// Cloneable publishing half of the bus, handed to request handlers.
///
/// Publishing is fire-and-forget: serialization or send failures are logged
/// and never fail the request that triggered them.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<EventEnvelope>,
}

impl EventPublisher {
    pub fn publish<T: Serialize>(&self, topic: &'static str, message: &T) {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(topic, %err, "Failed to serialize event payload");
                return;
            }
        };
        if self.tx.send(EventEnvelope { topic, payload }).is_err() {
            warn!(topic, "Event bus receiver gone, dropping event");
        }
    }
}

// == Stream ==
/// Receiving half of the bus, owned by exactly one consumer task.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<EventEnvelope>,
}

impl EventStream {
    /// Waits for the next message; `None` once all publishers are dropped.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.rx.recv().await
    }
}

// == Constructor ==
/// Creates a connected publisher/stream pair.
pub fn event_bus() -> (EventPublisher, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventPublisher { tx }, EventStream { rx })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let (publisher, mut stream) = event_bus();

        publisher.publish(TOPIC_CONTENT_CREATED, &json!({"id": 1, "authorId": 2}));

        let message = stream.recv().await.unwrap();
        assert_eq!(message.topic, TOPIC_CONTENT_CREATED);

        let value: serde_json::Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(value["id"], 1);
    }

    #[tokio::test]
    async fn test_publish_after_receiver_dropped_does_not_panic() {
        let (publisher, stream) = event_bus();
        drop(stream);

        publisher.publish(TOPIC_CONTENT_DELETED, &json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_stream_closes_when_publishers_dropped() {
        let (publisher, mut stream) = event_bus();
        publisher.publish(TOPIC_CONTENT_CREATED, &json!({"id": 1}));
        drop(publisher);

        assert!(stream.recv().await.is_some());
        assert!(stream.recv().await.is_none());
    }
}
