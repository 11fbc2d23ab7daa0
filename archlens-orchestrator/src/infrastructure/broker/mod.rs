//! Transport-agnostic broker seams.
//!
//! The intake/outtake component owns the broker connection; nothing else
//! touches it. The AMQP adapter backs production, the in-memory adapter
//! backs tests, and both speak the same traits.

pub mod amqp;
pub mod memory;

use async_trait::async_trait;

pub use amqp::{AmqpBroker, AmqpJobSource, AmqpResultPublisher};
pub use memory::{MemoryBroker, MemoryJobSource, MemoryResultPublisher, PublishedMessage};

/// One inbound message plus its acknowledgment handle
pub struct InboundDelivery {
    pub payload: Vec<u8>,
    /// True when the broker has delivered this message before
    pub redelivered: bool,
    acknowledger: Box<dyn Acknowledger>,
}

impl InboundDelivery {
    pub fn new(payload: Vec<u8>, redelivered: bool, acknowledger: Box<dyn Acknowledger>) -> Self {
        Self {
            payload,
            redelivered,
            acknowledger,
        }
    }

    /// Acknowledge: acceptance for processing, not completion.
    pub async fn ack(self) -> Result<(), BrokerError> {
        self.acknowledger.ack().await
    }

    /// Negative-acknowledge; `requeue` sends the message back for another
    /// delivery attempt.
    pub async fn reject(self, requeue: bool) -> Result<(), BrokerError> {
        self.acknowledger.reject(requeue).await
    }
}

/// Acknowledgment back-channel for one delivery
#[async_trait]
pub trait Acknowledger: Send {
    async fn ack(self: Box<Self>) -> Result<(), BrokerError>;
    async fn reject(self: Box<Self>, requeue: bool) -> Result<(), BrokerError>;
}

/// Source of inbound job messages
#[async_trait]
pub trait JobSource: Send {
    /// Next delivery; `Ok(None)` means the stream closed cleanly.
    async fn next_delivery(&mut self) -> Result<Option<InboundDelivery>, BrokerError>;
}

/// Sink for outbound result envelopes
#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BrokerError>;
}

/// Broker transport failures; all transient from the pipeline's viewpoint
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Broker connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Acknowledgment failed: {0}")]
    Ack(String),

    #[error("Broker channel closed")]
    Closed,
}
