// src/worker/consumer.rs
// =============================================================================
// The long-running crawl worker.
//
// Each cycle:
//   Idle -> Receiving -> Fetching -> Extracting -> Publishing -> Acknowledging
//
// - Receiving waits for the broker; this is the only place shutdown can
//   interrupt.
// - A failed fetch is logged and treated as "no links". The message is still
//   acknowledged, so that URL is not retried.
// - Every discovered link goes back onto the same queue, one message each,
//   in extraction order, before the original message is acknowledged.
//
// Shutdown is cooperative: the token is checked at the top of every cycle
// and raced against the receive. A cycle that has started always runs to
// its acknowledgement.
//
// Run as many consumers as you like against the same queue; the broker
// decides who gets which message.
// =============================================================================

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::discover_links;
use crate::crawl::Fetcher;
use crate::error::QueueError;
use crate::frontier::{FrontierQueue, QueueMessage};

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Messages acknowledged, including ones whose fetch failed
    pub processed: u64,
    /// Links pushed back onto the queue
    pub published: u64,
    /// Pages that could not be fetched
    pub fetch_failures: u64,
}

pub struct ConsumerLoop<Q> {
    fetcher: Fetcher,
    queue: Q,
    shutdown: CancellationToken,
    stats: ConsumerStats,
}

impl<Q: FrontierQueue> ConsumerLoop<Q> {
    pub fn new(fetcher: Fetcher, queue: Q, shutdown: CancellationToken) -> Self {
        Self {
            fetcher,
            queue,
            shutdown,
            stats: ConsumerStats::default(),
        }
    }

    /// Gives the queue back, e.g. to close the broker connection.
    pub fn into_queue(self) -> Q {
        self.queue
    }

    /// Processes messages until the shutdown token is cancelled.
    ///
    /// Returns an error only for broker failures, which end the worker;
    /// an empty queue just means waiting.
    pub async fn run(&mut self) -> Result<ConsumerStats, QueueError> {
        info!("waiting for messages");

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let received = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                received = self.queue.receive() => received?,
            };

            let Some(message) = received else {
                return Err(QueueError::Closed);
            };

            self.process(message).await?;
        }

        info!(
            processed = self.stats.processed,
            published = self.stats.published,
            fetch_failures = self.stats.fetch_failures,
            "consumer stopped"
        );
        Ok(self.stats.clone())
    }

    // One full cycle for one message. Ends with the message settled.
    async fn process(&mut self, message: QueueMessage) -> Result<(), QueueError> {
        let url = match message.url() {
            Ok(url) => url.to_string(),
            Err(e) => {
                // Nothing useful can be done with it; drop it
                warn!(delivery_tag = message.delivery_tag, error = %e, "message body is not UTF-8");
                self.queue.ack(message).await?;
                self.stats.processed += 1;
                return Ok(());
            }
        };

        info!(url = %url, "processing url");

        let links = match discover_links(&self.fetcher, &url).await {
            Ok(links) => links,
            Err(e) => {
                error!(url = %url, error = %e, "error fetching url");
                self.stats.fetch_failures += 1;
                Vec::new()
            }
        };

        if links.is_empty() {
            info!(url = %url, "no internal links found");
        }

        for link in &links {
            if let Err(e) = self.queue.publish(&link.url).await {
                error!(url = %link.url, error = %e, "failed to publish link");
                // Best effort; if the channel is gone the broker requeues anyway
                if let Err(requeue_err) = self.queue.requeue(message).await {
                    warn!(url = %url, error = %requeue_err, "failed to requeue message");
                }
                return Err(e);
            }
            info!(url = %link.url, "link sent");
            self.stats.published += 1;
        }

        self.queue.ack(message).await?;
        self.stats.processed += 1;
        Ok(())
    }
}
