use anyhow::Result;
use std::sync::Arc;

use super::coordinator::Coordinator;
use super::models::{Answer, DiscoveredEntry, RecursionPolicy, ScanJob};
use crate::config::RunConfig;
use crate::plugins::types::ContentDiscovery;
use crate::ui::printer::{Printer, Source};
use crate::ui::prompt::Prompter;

/// Runs one discovery scan and turns directory hits into new scans.
pub struct Orchestrator {
    config: Arc<RunConfig>,
    discovery: Arc<dyn ContentDiscovery>,
    prompter: Arc<dyn Prompter>,
    printer: Printer,
}

impl Orchestrator {
    pub fn new(
        config: Arc<RunConfig>,
        discovery: Arc<dyn ContentDiscovery>,
        prompter: Arc<dyn Prompter>,
        printer: Printer,
    ) -> Self {
        Self {
            config,
            discovery,
            prompter,
            printer,
        }
    }

    /// Streams the discovery output for `job` until the tool exits.
    ///
    /// Children are handed to `coordinator` and never awaited here.
    pub async fn scan(&self, job: ScanJob, coordinator: &Coordinator) -> Result<()> {
        let url = job.url(&self.config.target);
        let result = self.stream(&job, &url, coordinator).await;
        if let Err(e) = &result {
            self.printer
                .error(Source::Gobuster, format!("Scan of {} failed: {:#}", url, e));
        }
        result
    }

    async fn stream(&self, job: &ScanJob, url: &str, coordinator: &Coordinator) -> Result<()> {
        self.printer.say(0, Source::Gobuster, format!("Starting {}", url));

        let mut lines = self.discovery.start(job, &self.config).await?;
        tracing::debug!("{} running against {}", self.discovery.name(), url);
        let mut policy = RecursionPolicy::default();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            // The first character is gobuster's leading separator
            let mut chars = line.chars();
            chars.next();
            self.printer
                .say(0, Source::Gobuster, format!("{}{}", url, chars.as_str()));

            let Some(entry) = DiscoveredEntry::parse(line) else {
                continue;
            };
            tracing::debug!("Discovered {} ({:?}) from {:?}", entry.path, entry.status, entry.raw);
            if !entry.is_directory {
                continue;
            }

            if self.should_recurse(url, &entry, &mut policy).await {
                coordinator.launch(job.child(&entry.path));
            }
        }

        lines.finish().await?;
        self.printer.say(1, Source::Gobuster, format!("Finished {}", url));
        Ok(())
    }

    async fn should_recurse(&self, url: &str, entry: &DiscoveredEntry, policy: &mut RecursionPolicy) -> bool {
        if let Some(decision) = policy.standing_decision() {
            return decision;
        }

        let candidate = format!("{}{}", url, entry.path.trim_start_matches('/'));
        let question = format!("Want to scan \"{}\"?", candidate);
        match self
            .prompter
            .ask(Source::Gobuster, &question, Answer::RECURSION)
            .await
        {
            Ok(answer) => policy.apply(answer),
            Err(e) => {
                // Nobody left to ask, so stop asking for this scan
                tracing::warn!("Prompt for {} failed: {:#}", candidate, e);
                *policy = RecursionPolicy::NeverRecurse;
                false
            }
        }
    }
}
