//! AMQP (lapin) broker adapter.
//!
//! Declares the topic exchange and durable analysis queue on connect, hands
//! out a manually-acked consumer and a result publisher over the same
//! channel pair. Connection loss surfaces as an error from the source; the
//! composition root reconnects with backoff.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::{FieldTable, ShortString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use archlens_core::config::BrokerConfig;

use super::{Acknowledger, BrokerError, InboundDelivery, JobSource, ResultPublisher};

const CONSUMER_TAG: &str = "archlens-analyzer";

/// Connected broker with the analysis topology declared
pub struct AmqpBroker {
    channel: Channel,
    config: BrokerConfig,
}

impl AmqpBroker {
    /// Connect and declare exchange, queue, and binding.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let connection = Connection::connect(&config.amqp_uri(), ConnectionProperties::default())
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        channel
            .queue_declare(
                &config.analysis_queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        channel
            .queue_bind(
                &config.analysis_queue,
                &config.exchange,
                &config.analysis_routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        info!(
            exchange = %config.exchange,
            queue = %config.analysis_queue,
            "Broker topology declared"
        );

        Ok(Self {
            channel,
            config: config.clone(),
        })
    }

    /// Connect with exponential backoff, giving up only on shutdown.
    pub async fn connect_with_backoff(
        config: &BrokerConfig,
        shutdown: &CancellationToken,
    ) -> Result<Self, BrokerError> {
        let mut delay = config.reconnect_initial_delay();
        let max_delay = config.reconnect_max_delay();

        loop {
            match Self::connect(config).await {
                Ok(broker) => return Ok(broker),
                Err(e) => {
                    error!(error = %e, delay_ms = delay.as_millis() as u64, "Broker connection failed, retrying");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.cancelled() => {
                    warn!("Shutdown requested while reconnecting to broker");
                    return Err(BrokerError::Closed);
                }
            }

            delay = (delay * 2).min(max_delay);
        }
    }

    /// Start a manually-acked consumer on the analysis queue.
    pub async fn job_source(&self) -> Result<AmqpJobSource, BrokerError> {
        let consumer = self
            .channel
            .basic_consume(
                &self.config.analysis_queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        info!(queue = %self.config.analysis_queue, "Consuming analysis jobs");
        Ok(AmqpJobSource { consumer })
    }

    /// Publisher sharing this broker's channel.
    pub fn result_publisher(&self) -> AmqpResultPublisher {
        AmqpResultPublisher {
            channel: self.channel.clone(),
            exchange: self.config.exchange.clone(),
        }
    }
}

pub struct AmqpJobSource {
    consumer: lapin::Consumer,
}

#[async_trait]
impl JobSource for AmqpJobSource {
    async fn next_delivery(&mut self) -> Result<Option<InboundDelivery>, BrokerError> {
        match self.consumer.next().await {
            Some(Ok(delivery)) => Ok(Some(InboundDelivery::new(
                delivery.data,
                delivery.redelivered,
                Box::new(AmqpAcknowledger {
                    acker: delivery.acker,
                }),
            ))),
            Some(Err(e)) => Err(BrokerError::Connection(e.to_string())),
            None => Ok(None),
        }
    }
}

struct AmqpAcknowledger {
    acker: lapin::acker::Acker,
}

#[async_trait]
impl Acknowledger for AmqpAcknowledger {
    async fn ack(self: Box<Self>) -> Result<(), BrokerError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| BrokerError::Ack(e.to_string()))
    }

    async fn reject(self: Box<Self>, requeue: bool) -> Result<(), BrokerError> {
        self.acker
            .nack(BasicNackOptions {
                requeue,
                ..Default::default()
            })
            .await
            .map_err(|e| BrokerError::Ack(e.to_string()))
    }
}

pub struct AmqpResultPublisher {
    channel: Channel,
    exchange: String,
}

#[async_trait]
impl ResultPublisher for AmqpResultPublisher {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_content_type(ShortString::from("application/json"))
                    .with_delivery_mode(2),
            )
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))?
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))?;

        Ok(())
    }
}
