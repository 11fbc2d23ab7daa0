//! Job pipeline: one queue message becomes one analysis run.
//!
//! The run extracts the archive, analyzes the tree, and publishes exactly
//! one result envelope. Failures at any stage discard partial results and
//! publish an error envelope instead; the inbound message was already
//! acknowledged at submission, because neither a corrupt archive nor an
//! analysis bug can succeed on redelivery.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use archlens_analysis::application::use_cases::{AnalysisError, AnalyzeProjectUseCase};
use archlens_core::config::BrokerConfig;

use crate::domain::envelope::{AnalysisJob, ResultEnvelope};
use crate::domain::task::JobOutput;
use crate::infrastructure::archive::ArchiveExtractor;
use crate::infrastructure::broker::ResultPublisher;
use crate::infrastructure::worker_pool::{JobError, JobFuture, SubmitError, WorkerPool};

/// Routing keys for outbound results
#[derive(Debug, Clone)]
pub struct ResultRouting {
    pub completed: String,
    pub error: String,
}

impl ResultRouting {
    pub fn from_config(config: &BrokerConfig) -> Self {
        Self {
            completed: config.result_completed_routing_key.clone(),
            error: config.result_error_routing_key.clone(),
        }
    }
}

/// Shared collaborators for executing jobs
#[derive(Clone)]
pub struct JobContext {
    pub archive: Arc<ArchiveExtractor>,
    pub analyzer: AnalyzeProjectUseCase,
    pub publisher: Arc<dyn ResultPublisher>,
    pub routing: ResultRouting,
}

/// Accepts validated jobs and runs them on the worker pool
pub struct JobPipeline {
    pool: WorkerPool,
    context: JobContext,
}

impl JobPipeline {
    pub fn new(pool: WorkerPool, context: JobContext) -> Self {
        Self { pool, context }
    }

    /// Submit a decoded job; rejection means the caller decides requeueing.
    pub async fn submit(&self, job: AnalysisJob) -> Result<(), SubmitError> {
        let context = self.context.clone();
        let project_id = job.project_id.clone();
        self.pool
            .submit(&project_id, move |token| {
                Box::pin(run_analysis_job(context, job, token)) as JobFuture
            })
            .await
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

/// Execute one job end to end and publish its outcome.
#[instrument(skip(context, job, token), fields(project_id = %job.project_id))]
async fn run_analysis_job(
    context: JobContext,
    job: AnalysisJob,
    token: CancellationToken,
) -> Result<JobOutput, JobError> {
    let project_id = job.project_id.clone();
    info!("Processing analysis job");

    let result = execute(&context, job, token).await;

    match &result {
        Ok(output) => {
            publish_success(&context, &project_id, output).await;
            info!(
                files_processed = output.files_processed,
                "Analysis job finished successfully"
            );
        }
        Err(e) => {
            publish_error(&context, &project_id, e).await;
            warn!(error = %e, "Analysis job failed");
        }
    }

    result
}

async fn execute(
    context: &JobContext,
    job: AnalysisJob,
    token: CancellationToken,
) -> Result<JobOutput, JobError> {
    // Archive unpacking is filesystem-bound; keep it off the async workers
    let workspace = {
        let archive = context.archive.clone();
        let project_id = job.project_id.clone();
        let data = job.archive;
        tokio::task::spawn_blocking(move || archive.extract(&project_id, &data))
            .await
            .map_err(|e| JobError::Internal(format!("extraction task panicked: {}", e)))?
            .map_err(|e| JobError::Extraction(e.to_string()))?
    };

    let outcome = context
        .analyzer
        .execute(
            &job.project_id,
            &workspace.source_dir,
            &workspace.output_dir,
            token,
        )
        .await
        .map_err(|e| match e {
            AnalysisError::Cancelled => JobError::Cancelled,
            other => JobError::Analysis(other.to_string()),
        })?;

    Ok(JobOutput {
        analysis_file: outcome.analysis_file,
        summary_file: outcome.summary_file,
        files_processed: outcome.files_processed,
    })
}

async fn publish_success(context: &JobContext, project_id: &str, output: &JobOutput) {
    let analysis_content = read_artifact(&output.analysis_file).await;
    let summary_content = read_artifact(&output.summary_file).await;

    let envelope = ResultEnvelope::success(
        project_id,
        analysis_content.as_deref(),
        summary_content.as_deref(),
        output.files_processed,
    );

    publish(context, &context.routing.completed, project_id, &envelope).await;
}

async fn publish_error(context: &JobContext, project_id: &str, error: &JobError) {
    let envelope = ResultEnvelope::failure(project_id, error.to_string());
    publish(context, &context.routing.error, project_id, &envelope).await;
}

async fn publish(
    context: &JobContext,
    routing_key: &str,
    project_id: &str,
    envelope: &ResultEnvelope,
) {
    let payload = match envelope.to_bytes() {
        Ok(payload) => payload,
        Err(e) => {
            error!(project_id, error = %e, "Failed to serialize result envelope");
            return;
        }
    };

    if let Err(e) = context.publisher.publish(routing_key, &payload).await {
        error!(project_id, routing_key, error = %e, "Failed to publish result envelope");
    } else {
        info!(project_id, routing_key, "Result envelope published");
    }
}

async fn read_artifact(path: &std::path::Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Artifact missing while building result");
            None
        }
    }
}
