use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORDLIST: &str = "/usr/share/wordlists/dirbuster/directory-list-2.3-medium.txt";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub tools: ToolsConfig,
    pub liveness: LivenessConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub nmap: NmapConfig,
    pub gobuster: GobusterConfig,
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NmapConfig {
    pub command: String,
    /// Host discovery only, no port scan.
    pub liveness_args: Vec<String>,
    /// Substring of the liveness probe output that marks the host as up.
    pub up_marker: String,
    pub quick_args: Vec<String>,
    pub full_args: Vec<String>,
    pub limits: NmapLimits,
}

impl Default for NmapConfig {
    fn default() -> Self {
        Self {
            command: "nmap".to_string(),
            liveness_args: args(&["-T5", "--max-retries=3", "-sn"]),
            up_marker: "1 host up".to_string(),
            quick_args: args(&["-Pn", "-sS", "-p-", "-T5", "--min-rate", "2500", "--max-retries", "3"]),
            full_args: args(&["-Pn", "-O", "-sV", "-sC", "-T5", "--min-rate", "2500", "--max-retries", "3"]),
            limits: NmapLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NmapLimits {
    pub probe_timeout_ms: u64,
}

impl Default for NmapLimits {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 60000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GobusterConfig {
    pub command: String,
    pub base_args: Vec<String>,
    pub threads: u32,
    pub timeout_secs: u64,
    /// Comma separated, the leading empty entry probes bare paths.
    pub extensions: String,
    pub wordlist: PathBuf,
}

impl Default for GobusterConfig {
    fn default() -> Self {
        Self {
            command: "gobuster".to_string(),
            base_args: args(&["dir", "-qfazk"]),
            threads: 5,
            timeout_secs: 5,
            extensions: ",php,html,txt,md,sh,py".to_string(),
            wordlist: PathBuf::from(DEFAULT_WORDLIST),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
}

impl LivenessConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 11,
            retry_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("telescope"),
        }
    }
}
