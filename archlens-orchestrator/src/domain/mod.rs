//! Pipeline domain: tasks and message envelopes

pub mod envelope;
pub mod task;

pub use envelope::{AnalysisJob, AnalysisRequest, EnvelopeError, ResultEnvelope};
pub use task::{JobOutput, Task, TaskStatus};
