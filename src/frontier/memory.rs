// src/frontier/memory.rs
// In-process frontier for exercising the producer and consumer without a
// broker. Records every settle/publish so tests can assert on ordering.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

use super::{FrontierQueue, QueueMessage};
use crate::error::QueueError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Published(String),
    Acked(u64),
    Requeued(u64),
}

#[derive(Debug, Default)]
pub struct MemoryFrontier {
    ready: VecDeque<QueueMessage>,
    next_tag: u64,
    pub events: Vec<QueueEvent>,
    fail_publish: bool,
    // Cancelled as soon as a message is handed out
    cancel_on_receive: Option<CancellationToken>,
    // Cancelled when a receive finds the queue empty
    cancel_when_drained: Option<CancellationToken>,
}

impl MemoryFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw body without recording a publish event.
    pub fn push_raw(&mut self, body: &[u8]) -> u64 {
        self.next_tag += 1;
        self.ready.push_back(QueueMessage {
            body: body.to_vec(),
            delivery_tag: self.next_tag,
        });
        self.next_tag
    }

    pub fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub fn cancel_on_receive(mut self, token: CancellationToken) -> Self {
        self.cancel_on_receive = Some(token);
        self
    }

    pub fn cancel_when_drained(mut self, token: CancellationToken) -> Self {
        self.cancel_when_drained = Some(token);
        self
    }

    pub fn published(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                QueueEvent::Published(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }
}

#[async_trait]
impl FrontierQueue for MemoryFrontier {
    async fn publish(&mut self, url: &str) -> Result<(), QueueError> {
        if self.fail_publish {
            return Err(QueueError::Rejected(url.to_string()));
        }
        self.push_raw(url.as_bytes());
        self.events.push(QueueEvent::Published(url.to_string()));
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<QueueMessage>, QueueError> {
        match self.ready.pop_front() {
            Some(message) => {
                if let Some(token) = &self.cancel_on_receive {
                    token.cancel();
                }
                Ok(Some(message))
            }
            None => {
                if let Some(token) = &self.cancel_when_drained {
                    token.cancel();
                }
                // Like a broker with nothing to deliver: wait forever
                std::future::pending().await
            }
        }
    }

    async fn ack(&mut self, message: QueueMessage) -> Result<(), QueueError> {
        self.events.push(QueueEvent::Acked(message.delivery_tag));
        Ok(())
    }

    async fn requeue(&mut self, message: QueueMessage) -> Result<(), QueueError> {
        self.events.push(QueueEvent::Requeued(message.delivery_tag));
        self.ready.push_back(message);
        Ok(())
    }
}
