use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::core::errors::TelescopeError;
use crate::executors::command::execute;
use crate::plugins::types::LivenessProbe;

pub const QUICK_SCAN: &str = "nmap-quickscan";
pub const FULL_SCAN: &str = "nmap-fullscan";

/// Host discovery ping through nmap.
#[derive(Clone)]
pub struct NmapPing;

#[async_trait]
impl LivenessProbe for NmapPing {
    fn name(&self) -> &'static str {
        "nmap_ping"
    }

    async fn probe(&self, config: &RunConfig) -> Result<String> {
        let nmap = &config.tools.nmap;
        let mut args = nmap.liveness_args.clone();
        args.push(config.target.value.clone());

        let result = execute(&nmap.command, &args, Some(nmap.limits.probe_timeout_ms)).await?;
        Ok(result.stdout)
    }
}

/// Files a named scan writes into the result directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFiles {
    pub normal: PathBuf,
    pub xml: PathBuf,
}

impl ScanFiles {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            normal: dir.join(format!("{}.nmap", name)),
            xml: dir.join(format!("{}.xml", name)),
        }
    }
}

pub fn scan_args(base_args: &[String], ports: Option<&[u16]>, files: &ScanFiles, target: &str) -> Vec<String> {
    let mut args = base_args.to_vec();
    if let Some(ports) = ports {
        let list = ports.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",");
        args.push(format!("-p{}", list));
    }
    args.extend([
        "-oN".to_string(),
        files.normal.display().to_string(),
        "-oX".to_string(),
        files.xml.display().to_string(),
        target.to_string(),
    ]);
    args
}

/// Full TCP sweep of the target.
pub async fn quick_scan(config: &RunConfig) -> Result<ScanFiles> {
    let nmap = &config.tools.nmap;
    let files = ScanFiles::new(&config.results_dir, QUICK_SCAN);
    let args = scan_args(&nmap.quick_args, None, &files, &config.target.value);

    execute(&nmap.command, &args, None).await?;
    Ok(files)
}

/// Service, version and default script scan restricted to `ports`.
///
/// An empty port list has nothing to look at and yields `None` without
/// running nmap.
pub async fn full_scan(config: &RunConfig, ports: &[u16]) -> Result<Option<ScanFiles>> {
    if ports.is_empty() {
        return Ok(None);
    }

    let nmap = &config.tools.nmap;
    let files = ScanFiles::new(&config.results_dir, FULL_SCAN);
    let args = scan_args(&nmap.full_args, Some(ports), &files, &config.target.value);

    execute(&nmap.command, &args, None).await?;
    Ok(Some(files))
}

pub fn read_report(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        TelescopeError::MalformedScanOutput(format!("cannot read {}: {}", path.display(), e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quick_scan_args() {
        let config = RunConfig::for_tests("10.10.10.5", "telescope");
        let files = ScanFiles::new(&config.results_dir, QUICK_SCAN);
        let args = scan_args(&config.tools.nmap.quick_args, None, &files, "10.10.10.5");
        assert_eq!(
            args.join(" "),
            "-Pn -sS -p- -T5 --min-rate 2500 --max-retries 3 \
             -oN telescope/nmap-quickscan.nmap -oX telescope/nmap-quickscan.xml 10.10.10.5"
        );
    }

    #[test]
    fn test_full_scan_args_restrict_ports() {
        let config = RunConfig::for_tests("10.10.10.5", "out");
        let files = ScanFiles::new(&config.results_dir, FULL_SCAN);
        let args = scan_args(&config.tools.nmap.full_args, Some(&[22, 80, 443]), &files, "10.10.10.5");
        assert!(args.contains(&"-p22,80,443".to_string()));
        assert!(args.contains(&"-sC".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("10.10.10.5"));
    }

    #[tokio::test]
    async fn test_full_scan_with_no_ports_does_nothing() {
        let mut config = RunConfig::for_tests("10.10.10.5", "out");
        // would fail to launch if it were invoked
        config.tools.nmap.command = "telescope-no-such-nmap".to_string();
        assert_eq!(full_scan(&config, &[]).await.unwrap(), None);
    }

    #[test]
    fn test_unreadable_report_is_malformed() {
        let err = read_report(Path::new("/nonexistent/nmap-quickscan.xml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TelescopeError>(),
            Some(TelescopeError::MalformedScanOutput(_))
        ));
    }
}
