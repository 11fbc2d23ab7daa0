//! Injected task registry.
//!
//! The registry is an explicit dependency rather than process-wide state so
//! tests instantiate isolated pools. Only the pool dispatcher mutates task
//! records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::task::{JobOutput, Task, TaskStatus};

/// Task registry keyed by project identifier
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, task: Task);
    async fn remove(&self, id: &str);
    async fn mark_running(&self, id: &str);
    async fn mark_completed(&self, id: &str, output: JobOutput);
    async fn mark_failed(&self, id: &str, error: String);
    async fn get(&self, id: &str) -> Option<Task>;
    /// Drop finished tasks older than the cutoff; returns how many were
    /// removed. Running and pending tasks are never pruned.
    async fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize;
}

/// Map-and-lock store; sufficient for a single-process analyzer
#[derive(Default)]
pub struct InMemoryJobStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    async fn remove(&self, id: &str) {
        self.tasks.write().await.remove(id);
    }

    async fn mark_running(&self, id: &str) {
        if let Some(task) = self.tasks.write().await.get_mut(id) {
            task.status = TaskStatus::Running;
            task.started_at = Some(Utc::now());
        }
    }

    async fn mark_completed(&self, id: &str, output: JobOutput) {
        if let Some(task) = self.tasks.write().await.get_mut(id) {
            task.status = TaskStatus::Completed;
            task.finished_at = Some(Utc::now());
            task.result = Some(output);
            task.error = None;
        }
    }

    async fn mark_failed(&self, id: &str, error: String) {
        if let Some(task) = self.tasks.write().await.get_mut(id) {
            task.status = TaskStatus::Failed;
            task.finished_at = Some(Utc::now());
            task.result = None;
            task.error = Some(error);
        }
    }

    async fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    async fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| {
            !(task.is_finished() && task.finished_at.map(|t| t < cutoff).unwrap_or(false))
        });
        before - tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn output() -> JobOutput {
        JobOutput {
            analysis_file: PathBuf::from("a.json"),
            summary_file: PathBuf::from("s.json"),
            files_processed: 1,
        }
    }

    #[tokio::test]
    async fn lifecycle_transitions_are_recorded() {
        let store = InMemoryJobStore::new();
        store.insert(Task::pending("p1")).await;

        store.mark_running("p1").await;
        assert_eq!(store.get("p1").await.unwrap().status, TaskStatus::Running);

        store.mark_completed("p1", output()).await;
        let task = store.get("p1").await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.finished_at.is_some());
        assert!(task.result.is_some());
    }

    #[tokio::test]
    async fn failed_tasks_keep_the_error() {
        let store = InMemoryJobStore::new();
        store.insert(Task::pending("p1")).await;
        store.mark_failed("p1", "corrupt archive".to_string()).await;

        let task = store.get("p1").await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("corrupt archive"));
    }

    #[tokio::test]
    async fn prune_spares_unfinished_tasks() {
        let store = InMemoryJobStore::new();
        store.insert(Task::pending("pending")).await;
        store.insert(Task::pending("done")).await;
        store.mark_completed("done", output()).await;

        let removed = store.prune_finished(Utc::now()).await;
        assert_eq!(removed, 1);
        assert!(store.get("pending").await.is_some());
        assert!(store.get("done").await.is_none());
    }
}
