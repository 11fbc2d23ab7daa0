//! Message intake loop.
//!
//! The consumer never analyzes inline: it validates the envelope, submits
//! the job, and acknowledges the message as *received*. Acknowledgment
//! policy distinguishes failure classes explicitly:
//!
//! - validation failures are permanent: ack and drop, never requeue (a
//!   malformed message redelivered forever is a poison message)
//! - a full queue is transient: requeue on first delivery, drop on
//!   redelivery (the redelivered flag caps the retry loop)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::application::use_cases::JobPipeline;
use crate::domain::envelope::AnalysisRequest;
use crate::infrastructure::broker::{BrokerError, InboundDelivery, JobSource};
use crate::infrastructure::worker_pool::SubmitError;

/// Intake counters, readable by tests and operators
#[derive(Debug, Default)]
pub struct ConsumerStats {
    pub accepted: AtomicU64,
    pub validation_failures: AtomicU64,
    pub requeued: AtomicU64,
    pub dropped: AtomicU64,
}

pub struct MessageConsumer {
    pipeline: Arc<JobPipeline>,
    shutdown: CancellationToken,
    stats: Arc<ConsumerStats>,
}

impl MessageConsumer {
    pub fn new(pipeline: Arc<JobPipeline>, shutdown: CancellationToken) -> Self {
        Self {
            pipeline,
            shutdown,
            stats: Arc::new(ConsumerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<ConsumerStats> {
        self.stats.clone()
    }

    /// Consume until shutdown or the source fails.
    ///
    /// `Ok(())` means the stream closed (shutdown or clean broker close);
    /// an error asks the caller to reconnect and call again.
    pub async fn run(&self, mut source: Box<dyn JobSource>) -> Result<(), BrokerError> {
        info!("Message consumer started");

        loop {
            let delivery = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Message consumer shutting down");
                    return Ok(());
                }
                delivery = source.next_delivery() => delivery?,
            };

            match delivery {
                Some(delivery) => self.handle(delivery).await,
                None => {
                    warn!("Job source closed");
                    return Ok(());
                }
            }
        }
    }

    async fn handle(&self, delivery: InboundDelivery) {
        let redelivered = delivery.redelivered;

        let job = match AnalysisRequest::decode(&delivery.payload) {
            Ok(job) => job,
            Err(e) => {
                // Permanent: this payload can never succeed. Drop it.
                warn!(
                    error = %e,
                    payload_bytes = delivery.payload.len(),
                    "Invalid job envelope, dropping message"
                );
                self.stats.validation_failures.fetch_add(1, Ordering::SeqCst);
                if let Err(ack_err) = delivery.ack().await {
                    error!(error = %ack_err, "Failed to ack invalid message");
                }
                return;
            }
        };

        let project_id = job.project_id.clone();
        match self.pipeline.submit(job).await {
            Ok(()) => {
                self.stats.accepted.fetch_add(1, Ordering::SeqCst);
                // Acceptance for processing, not completion
                if let Err(e) = delivery.ack().await {
                    error!(project_id = %project_id, error = %e, "Failed to ack accepted message");
                }
            }
            Err(SubmitError::QueueFull) if !redelivered => {
                warn!(project_id = %project_id, "Queue full, requeueing for one retry");
                self.stats.requeued.fetch_add(1, Ordering::SeqCst);
                if let Err(e) = delivery.reject(true).await {
                    error!(project_id = %project_id, error = %e, "Failed to requeue message");
                }
            }
            Err(e) => {
                // Redelivered and still rejected, or the pool is gone:
                // dropping beats redelivering forever.
                error!(project_id = %project_id, error = %e, "Dropping job after failed submission");
                self.stats.dropped.fetch_add(1, Ordering::SeqCst);
                if let Err(ack_err) = delivery.ack().await {
                    error!(project_id = %project_id, error = %ack_err, "Failed to ack dropped message");
                }
            }
        }
    }
}
