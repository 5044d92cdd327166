use anyhow::Result;
use async_trait::async_trait;
use crate::config::RunConfig;
use crate::core::models::ScanJob;

/// Lines produced by a running tool, consumed in emission order.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> Result<Option<String>>;

    /// Waits for the tool to exit once its output is exhausted.
    async fn finish(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    fn name(&self) -> &'static str;
    /// Raw probe output, inspected by the caller for the up marker.
    async fn probe(&self, config: &RunConfig) -> Result<String>;
}

#[async_trait]
pub trait ContentDiscovery: Send + Sync {
    fn name(&self) -> &'static str;
    async fn start(&self, job: &ScanJob, config: &RunConfig) -> Result<Box<dyn LineSource>>;
}
