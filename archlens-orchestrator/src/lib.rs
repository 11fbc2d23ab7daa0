//! archlens-orchestrator - Concurrent task pipeline
//!
//! Turns inbound queue messages into asynchronous analysis jobs:
//!
//! - envelope validation and decoding, with an explicit transient/permanent
//!   failure split driving the acknowledgment policy
//! - a bounded worker pool with an injected job store, per-job deadlines,
//!   and per-project single-flight execution
//! - broker intake/outtake behind transport-agnostic traits, with an AMQP
//!   adapter for production and an in-memory adapter for tests
//!
//! Delivery is at-least-once: redelivered duplicates are tolerated (the
//! single-flight guard serializes them) and every run writes fresh
//! timestamped artifacts.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::use_cases::{JobContext, JobPipeline, ResultRouting};
pub use domain::envelope::{AnalysisJob, AnalysisRequest, EnvelopeError, ResultEnvelope};
pub use domain::task::{JobOutput, Task, TaskStatus};
pub use infrastructure::archive::{ArchiveExtractor, ExtractionError, ProjectWorkspace};
pub use infrastructure::broker::{
    Acknowledger, AmqpBroker, BrokerError, InboundDelivery, JobSource, MemoryBroker,
    ResultPublisher,
};
pub use infrastructure::consumer::{ConsumerStats, MessageConsumer};
pub use infrastructure::job_store::{InMemoryJobStore, JobStore};
pub use infrastructure::worker_pool::{JobError, PoolStats, SubmitError, WorkerPool};
