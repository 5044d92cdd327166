use anyhow::Result;
use async_trait::async_trait;

use crate::config::RunConfig;
use crate::core::models::ScanJob;
use crate::executors::command::stream;
use crate::plugins::types::{ContentDiscovery, LineSource};

/// Directory brute force through `gobuster dir`.
#[derive(Clone)]
pub struct Gobuster;

impl Gobuster {
    pub fn args(&self, job: &ScanJob, config: &RunConfig) -> Vec<String> {
        let gobuster = &config.tools.gobuster;
        let mut args = gobuster.base_args.clone();
        args.extend([
            "-t".to_string(),
            gobuster.threads.to_string(),
            "--timeout".to_string(),
            format!("{}s", gobuster.timeout_secs),
            "-x".to_string(),
            gobuster.extensions.clone(),
            "-o".to_string(),
            job.output_file(&config.results_dir).display().to_string(),
            "-u".to_string(),
            job.url(&config.target),
            "-w".to_string(),
            config.wordlist.display().to_string(),
        ]);
        args
    }
}

#[async_trait]
impl ContentDiscovery for Gobuster {
    fn name(&self) -> &'static str {
        "gobuster"
    }

    async fn start(&self, job: &ScanJob, config: &RunConfig) -> Result<Box<dyn LineSource>> {
        let args = self.args(job, config);
        let lines = stream(&config.tools.gobuster.command, &args)?;
        Ok(Box::new(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Protocol, WebService};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_child_scan_command_line() {
        let mut config = RunConfig::for_tests("10.10.10.5", "telescope");
        config.wordlist = "/tmp/words.txt".into();
        let job = ScanJob::root(WebService {
            protocol: Protocol::Http,
            port: 8080,
        })
        .child("/admin/");

        assert_eq!(
            Gobuster.args(&job, &config).join(" "),
            "dir -qfazk -t 5 --timeout 5s -x ,php,html,txt,md,sh,py \
             -o telescope/gobuster-admin.txt -u http://10.10.10.5:8080/admin/ -w /tmp/words.txt"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_start() {
        let mut config = RunConfig::for_tests("10.10.10.5", "telescope");
        config.tools.gobuster.command = "telescope-no-such-gobuster".to_string();
        let job = ScanJob::root(WebService {
            protocol: Protocol::Https,
            port: 443,
        });
        assert!(Gobuster.start(&job, &config).await.is_err());
    }
}
