//! In-memory broker adapter for tests.
//!
//! A channel-backed queue with the same ack/reject semantics as the AMQP
//! adapter: rejecting with requeue re-delivers the message with the
//! redelivered flag set, and every terminal decision is counted on a
//! shared ledger so tests can assert the acknowledgment policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

use super::{Acknowledger, BrokerError, InboundDelivery, JobSource, ResultPublisher};

/// One message published to the result side
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub routing_key: String,
    pub payload: Vec<u8>,
}

/// Terminal acknowledgment counters
#[derive(Debug, Default)]
pub struct AckLedger {
    pub acked: AtomicU64,
    pub requeued: AtomicU64,
    pub dropped: AtomicU64,
}

struct QueuedMessage {
    payload: Vec<u8>,
    redelivered: bool,
}

/// In-memory stand-in for the broker, used by the integration tests
pub struct MemoryBroker {
    job_tx: UnboundedSender<QueuedMessage>,
    job_rx: Mutex<Option<UnboundedReceiver<QueuedMessage>>>,
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    publish_notify: Arc<Notify>,
    ledger: Arc<AckLedger>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        Self {
            job_tx,
            job_rx: Mutex::new(Some(job_rx)),
            published: Arc::new(Mutex::new(Vec::new())),
            publish_notify: Arc::new(Notify::new()),
            ledger: Arc::new(AckLedger::default()),
        }
    }

    /// Simulate the upstream API publishing a job envelope.
    pub fn send_job(&self, payload: impl Into<Vec<u8>>) {
        let _ = self.job_tx.send(QueuedMessage {
            payload: payload.into(),
            redelivered: false,
        });
    }

    /// Take the single consumer side. Panics if taken twice (test misuse).
    pub fn job_source(&self) -> MemoryJobSource {
        let receiver = self
            .job_rx
            .lock()
            .take()
            .expect("job source already taken");
        MemoryJobSource {
            receiver,
            requeue_tx: self.job_tx.clone(),
            ledger: self.ledger.clone(),
        }
    }

    pub fn result_publisher(&self) -> MemoryResultPublisher {
        MemoryResultPublisher {
            published: self.published.clone(),
            notify: self.publish_notify.clone(),
        }
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }

    pub fn ledger(&self) -> Arc<AckLedger> {
        self.ledger.clone()
    }

    /// Wait until at least `count` messages have been published, or the
    /// timeout elapses; returns whatever is published either way.
    pub async fn wait_for_published(
        &self,
        count: usize,
        timeout: std::time::Duration,
    ) -> Vec<PublishedMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let current = self.published();
            if current.len() >= count || tokio::time::Instant::now() >= deadline {
                return current;
            }
            let _ = tokio::time::timeout(std::time::Duration::from_millis(20), async {
                self.publish_notify.notified().await;
            })
            .await;
        }
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryJobSource {
    receiver: UnboundedReceiver<QueuedMessage>,
    requeue_tx: UnboundedSender<QueuedMessage>,
    ledger: Arc<AckLedger>,
}

#[async_trait]
impl JobSource for MemoryJobSource {
    async fn next_delivery(&mut self) -> Result<Option<InboundDelivery>, BrokerError> {
        match self.receiver.recv().await {
            Some(message) => Ok(Some(InboundDelivery::new(
                message.payload.clone(),
                message.redelivered,
                Box::new(MemoryAcknowledger {
                    payload: message.payload,
                    requeue_tx: self.requeue_tx.clone(),
                    ledger: self.ledger.clone(),
                }),
            ))),
            None => Ok(None),
        }
    }
}

struct MemoryAcknowledger {
    payload: Vec<u8>,
    requeue_tx: UnboundedSender<QueuedMessage>,
    ledger: Arc<AckLedger>,
}

#[async_trait]
impl Acknowledger for MemoryAcknowledger {
    async fn ack(self: Box<Self>) -> Result<(), BrokerError> {
        self.ledger.acked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reject(self: Box<Self>, requeue: bool) -> Result<(), BrokerError> {
        if requeue {
            self.ledger.requeued.fetch_add(1, Ordering::SeqCst);
            let _ = self.requeue_tx.send(QueuedMessage {
                payload: self.payload,
                redelivered: true,
            });
        } else {
            self.ledger.dropped.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub struct MemoryResultPublisher {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    notify: Arc<Notify>,
}

#[async_trait]
impl ResultPublisher for MemoryResultPublisher {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.published.lock().push(PublishedMessage {
            routing_key: routing_key.to_string(),
            payload: payload.to_vec(),
        });
        self.notify.notify_waiters();
        Ok(())
    }
}
