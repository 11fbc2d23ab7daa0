//! Bounded worker pool.
//!
//! One dispatcher task owns every Task mutation and the aggregate
//! statistics. Concurrency is bounded by a semaphore, pending work by a
//! bounded queue; submission past the queue bound is rejected, not
//! blocked. Each job gets a deadline-cancelled token and runs under a
//! per-project single-flight guard, so redelivered duplicates serialize
//! instead of racing.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use archlens_core::config::WorkerConfig;

use crate::domain::task::{JobOutput, Task};
use crate::infrastructure::job_store::JobStore;

/// Boxed job body; receives the cancellation token it must observe.
pub type JobFuture = Pin<Box<dyn Future<Output = Result<JobOutput, JobError>> + Send>>;

/// Aggregate pool statistics.
///
/// At quiescence `submitted == completed + failed` holds; `submitted`
/// counts accepted submissions only, not queue-full rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub total_processing_ms: u64,
    pub avg_processing_ms: f64,
}

struct QueuedJob {
    project_id: String,
    factory: Box<dyn FnOnce(CancellationToken) -> JobFuture + Send>,
}

struct PoolInner {
    tx: mpsc::Sender<QueuedJob>,
    store: Arc<dyn JobStore>,
    stats: Mutex<PoolStats>,
    shutdown: CancellationToken,
}

/// Handle to the pool; cheap to clone.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    pub fn new(
        config: &WorkerConfig,
        store: Arc<dyn JobStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let max_workers = config.max_workers.max(1);
        let (tx, rx) = mpsc::channel(config.queue_size);

        let inner = Arc::new(PoolInner {
            tx,
            store,
            stats: Mutex::new(PoolStats::default()),
            shutdown,
        });

        let semaphore = Arc::new(Semaphore::new(max_workers));
        let keyed = KeyedMutex::default();
        tokio::spawn(dispatch(
            rx,
            inner.clone(),
            semaphore,
            keyed,
            config.job_timeout(),
        ));

        info!(max_workers, queue_size = config.queue_size, "Worker pool started");
        Self { inner }
    }

    /// Submit a job keyed by project identifier.
    ///
    /// Registers a pending task and enqueues the job; a full queue rejects
    /// the submission and rolls the task registration back.
    pub async fn submit<F>(&self, project_id: &str, factory: F) -> Result<(), SubmitError>
    where
        F: FnOnce(CancellationToken) -> JobFuture + Send + 'static,
    {
        self.inner.store.insert(Task::pending(project_id)).await;

        let job = QueuedJob {
            project_id: project_id.to_string(),
            factory: Box::new(factory),
        };

        match self.inner.tx.try_send(job) {
            Ok(()) => {
                self.inner.stats.lock().submitted += 1;
                debug!(project_id, "Job enqueued");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.inner.store.remove(project_id).await;
                warn!(project_id, "Job queue full, submission rejected");
                Err(SubmitError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.inner.store.remove(project_id).await;
                Err(SubmitError::PoolClosed)
            }
        }
    }

    pub fn stats(&self) -> PoolStats {
        *self.inner.stats.lock()
    }
}

async fn dispatch(
    mut rx: mpsc::Receiver<QueuedJob>,
    inner: Arc<PoolInner>,
    semaphore: Arc<Semaphore>,
    keyed: KeyedMutex,
    job_timeout: Duration,
) {
    loop {
        // A permit is taken before polling the queue, so the queue bound
        // reflects genuinely waiting work rather than work already pulled
        // into the dispatcher.
        let permit = tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let job = tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        tokio::spawn(run_one(
            inner.clone(),
            keyed.clone(),
            job,
            permit,
            job_timeout,
        ));
    }

    info!("Worker pool dispatcher exiting");
}

async fn run_one(
    inner: Arc<PoolInner>,
    keyed: KeyedMutex,
    job: QueuedJob,
    permit: OwnedSemaphorePermit,
    job_timeout: Duration,
) {
    // Single-flight: a duplicate submission for the same project waits here
    // (holding its pool slot) until the in-flight run finishes.
    let _flight = keyed.acquire(&job.project_id).await;

    inner.store.mark_running(&job.project_id).await;
    debug!(project_id = %job.project_id, "Job started");

    let token = CancellationToken::new();
    let mut fut = (job.factory)(token.clone());
    let started = Instant::now();

    let result = tokio::select! {
        result = &mut fut => result,
        _ = tokio::time::sleep(job_timeout) => {
            warn!(
                project_id = %job.project_id,
                timeout_secs = job_timeout.as_secs(),
                "Job deadline exceeded, cancelling"
            );
            token.cancel();
            // Cooperative: the job observes the token at its next
            // checkpoint. A finish that raced the deadline still counts.
            match fut.await {
                Ok(output) => Ok(output),
                Err(_) => Err(JobError::DeadlineExceeded),
            }
        }
    };

    let elapsed = started.elapsed();

    match result {
        Ok(output) => {
            inner
                .store
                .mark_completed(&job.project_id, output)
                .await;
            let mut stats = inner.stats.lock();
            stats.completed += 1;
            stats.total_processing_ms += elapsed.as_millis() as u64;
            let finished = stats.completed + stats.failed;
            stats.avg_processing_ms = stats.total_processing_ms as f64 / finished as f64;
            info!(
                project_id = %job.project_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "Job completed"
            );
        }
        Err(e) => {
            inner
                .store
                .mark_failed(&job.project_id, e.to_string())
                .await;
            let mut stats = inner.stats.lock();
            stats.failed += 1;
            stats.total_processing_ms += elapsed.as_millis() as u64;
            let finished = stats.completed + stats.failed;
            stats.avg_processing_ms = stats.total_processing_ms as f64 / finished as f64;
            error!(project_id = %job.project_id, error = %e, "Job failed");
        }
    }

    drop(permit);
}

/// Per-key async mutex; keys are never evicted, matching task retention.
#[derive(Clone, Default)]
struct KeyedMutex {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl KeyedMutex {
    async fn acquire(&self, key: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Submission rejections
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Job queue is full")]
    QueueFull,

    #[error("Worker pool is shut down")]
    PoolClosed,
}

/// Failures surfaced by an executing job
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Job deadline exceeded")]
    DeadlineExceeded,

    #[error("Job cancelled")]
    Cancelled,

    #[error("Internal job error: {0}")]
    Internal(String),
}
