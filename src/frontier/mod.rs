// src/frontier/mod.rs
// =============================================================================
// The crawl frontier: a durable broker queue holding URLs still to crawl.
//
// Each message body is exactly one absolute URL as UTF-8 text. No envelope,
// no batching, no metadata.
//
// Delivery is at-least-once. A consumer acknowledges a message only after
// the page has been fetched and every discovered link has been published.
// If the consumer dies before that, the broker hands the message to someone
// else. That is the only retry there is.
//
// Submodules:
// - amqp: the RabbitMQ implementation (lapin)
// - memory: an in-process stand-in used by the control-loop tests
// =============================================================================

mod amqp;
#[cfg(test)]
mod memory;

pub use amqp::AmqpFrontier;
#[cfg(test)]
pub use memory::{MemoryFrontier, QueueEvent};

use async_trait::async_trait;
use std::str::Utf8Error;

use crate::error::QueueError;

/// One delivery taken off the queue and not yet settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Raw message body, expected to be a UTF-8 URL
    pub body: Vec<u8>,
    /// Broker-assigned tag used to ack or requeue this delivery
    pub delivery_tag: u64,
}

impl QueueMessage {
    /// The URL carried by this message.
    pub fn url(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Operations the producer and consumer need from the queue.
///
/// Every message handed out by `receive` must be settled exactly once, with
/// either `ack` or `requeue`. Dropping it unsettled leaves it with the broker,
/// which redelivers it once this connection goes away.
#[async_trait]
pub trait FrontierQueue: Send {
    /// Appends one persistent message carrying `url`.
    async fn publish(&mut self, url: &str) -> Result<(), QueueError>;

    /// Waits for the next message. `None` means the broker ended the
    /// subscription and no more messages will arrive on this connection.
    async fn receive(&mut self) -> Result<Option<QueueMessage>, QueueError>;

    /// Marks the message as fully processed; the broker deletes it.
    async fn ack(&mut self, message: QueueMessage) -> Result<(), QueueError>;

    /// Hands the message back to the broker for redelivery.
    async fn requeue(&mut self, message: QueueMessage) -> Result<(), QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_url_decodes_utf8() {
        let message = QueueMessage {
            body: b"http://example.com/about".to_vec(),
            delivery_tag: 1,
        };
        assert_eq!(message.url().unwrap(), "http://example.com/about");
    }

    #[test]
    fn test_message_url_rejects_invalid_utf8() {
        let message = QueueMessage {
            body: vec![0xff, 0xfe],
            delivery_tag: 1,
        };
        assert!(message.url().is_err());
    }
}
