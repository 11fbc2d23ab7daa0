//! Application setup and wiring

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use archlens_analysis::application::use_cases::AnalyzeProjectUseCase;
use archlens_core::Config;
use archlens_orchestrator::infrastructure::broker::AmqpBroker;
use archlens_orchestrator::{
    ArchiveExtractor, BrokerError, InMemoryJobStore, JobContext, JobPipeline, JobSource,
    MessageConsumer, ResultRouting, WorkerPool,
};

use crate::workers::spawn_cleanup_worker;

/// Run the analyzer until a shutdown signal arrives.
///
/// The consume loop owns broker reconnection: whenever the source closes
/// or fails, a fresh connection is established with backoff and a new
/// consumer takes over. The worker pool and job store survive reconnects.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone());

    let store = Arc::new(InMemoryJobStore::new());
    let pool = WorkerPool::new(&config.worker, store.clone(), shutdown.child_token());
    let extractor = Arc::new(ArchiveExtractor::new(config.storage.work_dir.clone()));
    let analyzer = AnalyzeProjectUseCase::new(&config.analysis);

    spawn_cleanup_worker(extractor.clone(), &config, shutdown.child_token());

    while !shutdown.is_cancelled() {
        let broker = match AmqpBroker::connect_with_backoff(&config.broker, &shutdown).await {
            Ok(broker) => broker,
            Err(BrokerError::Closed) => break,
            Err(e) => {
                error!(error = %e, "Broker connection failed");
                break;
            }
        };

        let context = JobContext {
            archive: extractor.clone(),
            analyzer: analyzer.clone(),
            publisher: Arc::new(broker.result_publisher()),
            routing: ResultRouting::from_config(&config.broker),
        };
        let pipeline = Arc::new(JobPipeline::new(pool.clone(), context));
        let consumer = MessageConsumer::new(pipeline, shutdown.child_token());

        let source: Box<dyn JobSource> = match broker.job_source().await {
            Ok(source) => Box::new(source),
            Err(e) => {
                error!(error = %e, "Failed to start consuming, reconnecting");
                tokio::time::sleep(config.broker.reconnect_initial_delay()).await;
                continue;
            }
        };

        match consumer.run(source).await {
            Ok(()) => {
                if shutdown.is_cancelled() {
                    break;
                }
                warn!("Job stream closed, reconnecting");
            }
            Err(e) => {
                error!(error = %e, "Consumer failed, reconnecting");
            }
        }

        tokio::time::sleep(config.broker.reconnect_initial_delay()).await;
    }

    info!("Analyzer stopped");
    Ok(())
}

fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            token.cancel();
        }
    });
}
