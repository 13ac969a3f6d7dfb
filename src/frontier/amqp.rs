// src/frontier/amqp.rs
// =============================================================================
// RabbitMQ-backed frontier, built on lapin.
//
// Setup (connect):
// 1. Open the connection and one channel
// 2. Declare the queue durable. Declaring is idempotent, so every process
//    does it on startup and nobody has to create the queue by hand
// 3. Turn on publisher confirms, so a publish only returns once the broker
//    owns the message
// 4. Prefetch 1: this consumer holds at most one unacknowledged message, and
//    the broker spreads the rest over the other consumers
//
// Messages go through the default exchange with the queue name as routing
// key, delivery mode 2 (persistent).
// =============================================================================

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
    ConfirmSelectOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};
use tracing::{debug, info};

use super::{FrontierQueue, QueueMessage};
use crate::config::Config;
use crate::error::QueueError;

const PERSISTENT: u8 = 2;
const PREFETCH: u16 = 1;
const REPLY_SUCCESS: u16 = 200;

pub struct AmqpFrontier {
    connection: Connection,
    channel: Channel,
    queue: String,
    // Created on the first receive, so a producer never subscribes
    consumer: Option<Consumer>,
}

impl AmqpFrontier {
    /// Connects to the broker and declares the frontier queue.
    ///
    /// Any failure here is a broker connection error and is meant to end the
    /// process.
    pub async fn connect(config: &Config) -> Result<Self, QueueError> {
        let uri = config
            .broker
            .amqp_uri()
            .map_err(|e| QueueError::InvalidAddress(e.to_string()))?;

        let connection = Connection::connect(&uri, ConnectionProperties::default())
            .await
            .map_err(QueueError::Connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(QueueError::Connect)?;

        let frontier = Self {
            connection,
            channel,
            queue: config.queue.clone(),
            consumer: None,
        };

        let queued = frontier.declare().await.map_err(|e| match e {
            QueueError::Channel(inner) => QueueError::Connect(inner),
            other => other,
        })?;

        frontier
            .channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(QueueError::Connect)?;
        frontier
            .channel
            .basic_qos(PREFETCH, BasicQosOptions::default())
            .await
            .map_err(QueueError::Connect)?;

        info!(
            host = %config.broker.host,
            port = config.broker.port,
            queue = %frontier.queue,
            queued,
            "connected to broker"
        );

        Ok(frontier)
    }

    /// Declares the queue as durable and returns how many messages it holds.
    ///
    /// Safe to call any number of times with the same settings; existing
    /// messages are left alone.
    pub async fn declare(&self) -> Result<u32, QueueError> {
        let queue = self
            .channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        Ok(queue.message_count())
    }

    /// Closes the channel and the connection. Unacknowledged deliveries go
    /// back to the queue.
    pub async fn close(self) -> Result<(), QueueError> {
        self.channel.close(REPLY_SUCCESS, "bye").await?;
        self.connection.close(REPLY_SUCCESS, "bye").await?;
        Ok(())
    }
}

#[async_trait]
impl FrontierQueue for AmqpFrontier {
    async fn publish(&mut self, url: &str) -> Result<(), QueueError> {
        let confirm = self
            .channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                url.as_bytes(),
                BasicProperties::default().with_delivery_mode(PERSISTENT),
            )
            .await?
            .await?;

        if confirm.is_nack() {
            return Err(QueueError::Rejected(url.to_string()));
        }

        debug!(url, "published");
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<QueueMessage>, QueueError> {
        if self.consumer.is_none() {
            let consumer = self
                .channel
                .basic_consume(
                    &self.queue,
                    "",
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await?;
            self.consumer = Some(consumer);
        }

        let Some(consumer) = self.consumer.as_mut() else {
            return Ok(None);
        };

        match consumer.next().await {
            Some(Ok(delivery)) => Ok(Some(QueueMessage {
                body: delivery.data,
                delivery_tag: delivery.delivery_tag,
            })),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    async fn ack(&mut self, message: QueueMessage) -> Result<(), QueueError> {
        self.channel
            .basic_ack(message.delivery_tag, BasicAckOptions::default())
            .await?;
        Ok(())
    }

    async fn requeue(&mut self, message: QueueMessage) -> Result<(), QueueError> {
        self.channel
            .basic_nack(
                message.delivery_tag,
                BasicNackOptions {
                    requeue: true,
                    ..BasicNackOptions::default()
                },
            )
            .await?;
        Ok(())
    }
}
