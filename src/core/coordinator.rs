use std::sync::Arc;

use super::models::ScanJob;
use super::orchestrator::Orchestrator;
use super::tasks::{TaskSet, TaskStats};

/// Owns every running discovery scan, top level and recursive alike.
#[derive(Clone)]
pub struct Coordinator {
    orchestrator: Arc<Orchestrator>,
    tasks: TaskSet,
}

impl Coordinator {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            tasks: TaskSet::new(),
        }
    }

    /// Starts `job` concurrently; returns without waiting for it.
    pub fn launch(&self, job: ScanJob) {
        let label = format!("{}:{}/{}", job.protocol, job.port, job.base_path);
        let coordinator = self.clone();
        self.tasks.spawn(label, async move {
            coordinator.orchestrator.scan(job, &coordinator).await
        });
    }

    /// Returns once no scan at any depth is running, including scans launched
    /// after the wait began.
    pub async fn await_all(&self) {
        self.tasks.wait_idle().await;
    }

    pub fn shutdown(&self) {
        self.tasks.abort_all();
    }

    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    pub fn stats(&self) -> TaskStats {
        self.tasks.stats()
    }
}
