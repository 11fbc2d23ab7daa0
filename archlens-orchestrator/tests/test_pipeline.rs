//! Integration tests for the message-driven analysis pipeline

use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio_util::sync::CancellationToken;
use zip::write::FileOptions;
use zip::ZipWriter;

use archlens_analysis::application::use_cases::AnalyzeProjectUseCase;
use archlens_core::config::{AnalysisConfig, BrokerConfig, WorkerConfig};
use archlens_orchestrator::infrastructure::broker::MemoryBroker;
use archlens_orchestrator::{
    ArchiveExtractor, InMemoryJobStore, JobContext, JobPipeline, JobStore, MessageConsumer,
    ResultRouting, TaskStatus, WorkerPool,
};

struct Harness {
    broker: MemoryBroker,
    store: Arc<InMemoryJobStore>,
    pipeline: Arc<JobPipeline>,
    consumer_stats: Arc<archlens_orchestrator::ConsumerStats>,
    shutdown: CancellationToken,
    _work_dir: tempfile::TempDir,
}

fn start_harness(max_workers: usize) -> Harness {
    let work_dir = tempfile::tempdir().expect("work dir");
    let broker = MemoryBroker::new();
    let store = Arc::new(InMemoryJobStore::new());
    let shutdown = CancellationToken::new();

    let worker_config = WorkerConfig {
        max_workers,
        queue_size: 16,
        job_timeout_seconds: 30,
    };
    let pool = WorkerPool::new(&worker_config, store.clone(), shutdown.child_token());

    let context = JobContext {
        archive: Arc::new(ArchiveExtractor::new(work_dir.path())),
        analyzer: AnalyzeProjectUseCase::new(&AnalysisConfig::default()),
        publisher: Arc::new(broker.result_publisher()),
        routing: ResultRouting::from_config(&BrokerConfig::default()),
    };
    let pipeline = Arc::new(JobPipeline::new(pool, context));

    let consumer = MessageConsumer::new(pipeline.clone(), shutdown.child_token());
    let consumer_stats = consumer.stats();
    let source = Box::new(broker.job_source());
    tokio::spawn(async move {
        let _ = consumer.run(source).await;
    });

    Harness {
        broker,
        store,
        pipeline,
        consumer_stats,
        shutdown,
        _work_dir: work_dir,
    }
}

fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn ping_project_zip() -> Vec<u8> {
    zip_with(&[(
        "src/main/java/com/example/PingController.java",
        "package com.example;\n\n@RestController\npublic class PingController {\n    @GetMapping(\"/ping\")\n    public String ping() {\n        return \"pong\";\n    }\n}\n",
    )])
}

fn envelope(project_id: &str, archive: &[u8]) -> Vec<u8> {
    serde_json::json!({
        "projectId": project_id,
        "fileContent": BASE64.encode(archive),
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn valid_envelope_produces_success_result() {
    let harness = start_harness(2);

    harness.broker.send_job(envelope("p1", &ping_project_zip()));

    let published = harness
        .broker
        .wait_for_published(1, Duration::from_secs(10))
        .await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].routing_key, "result.completed");

    let result: serde_json::Value = serde_json::from_slice(&published[0].payload).unwrap();
    assert_eq!(result["projectId"], "p1");
    assert_eq!(result["success"], true);
    assert_eq!(result["filesProcessed"], 1);

    let analysis_json = BASE64
        .decode(result["analysisContent"].as_str().unwrap())
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&analysis_json).unwrap();
    let endpoints = document["api"]["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0]["method"], "GET");
    assert_eq!(endpoints[0]["path"], "/ping");
    assert_eq!(endpoints[0]["handler"], "ping");
    assert_eq!(endpoints[0]["responseType"], "String");

    let task = harness.store.get("p1").await.expect("task recorded");
    assert_eq!(task.status, TaskStatus::Completed);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn envelope_without_file_content_is_dropped_once() {
    let harness = start_harness(1);

    harness
        .broker
        .send_job(br#"{"projectId": "p2"}"#.to_vec());

    // Give the consumer time to take the validation path
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        harness
            .consumer_stats
            .validation_failures
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
    assert!(harness.broker.published().is_empty());
    assert!(harness.store.get("p2").await.is_none());
    assert_eq!(harness.broker.ledger().acked.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(
        harness.broker.ledger().requeued.load(std::sync::atomic::Ordering::SeqCst),
        0
    );

    harness.shutdown.cancel();
}

#[tokio::test]
async fn corrupt_archive_publishes_error_envelope() {
    let harness = start_harness(1);

    harness.broker.send_job(envelope("p3", b"not a zip archive"));

    let published = harness
        .broker
        .wait_for_published(1, Duration::from_secs(10))
        .await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].routing_key, "result.error");

    let result: serde_json::Value = serde_json::from_slice(&published[0].payload).unwrap();
    assert_eq!(result["projectId"], "p3");
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().contains("Extraction"));

    let task = harness.store.get("p3").await.expect("task recorded");
    assert_eq!(task.status, TaskStatus::Failed);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn two_projects_serialize_on_a_single_worker() {
    let harness = start_harness(1);

    harness.broker.send_job(envelope("left", &ping_project_zip()));
    harness.broker.send_job(envelope("right", &ping_project_zip()));

    let published = harness
        .broker
        .wait_for_published(2, Duration::from_secs(20))
        .await;
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|p| p.routing_key == "result.completed"));

    let stats = harness.pipeline.pool().stats();
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.completed + stats.failed, 2);
    assert_eq!(stats.failed, 0);

    for id in ["left", "right"] {
        let task = harness.store.get(id).await.expect("task recorded");
        assert_eq!(task.status, TaskStatus::Completed);
    }

    harness.shutdown.cancel();
}
