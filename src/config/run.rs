use anyhow::Result;
use std::path::PathBuf;

use super::types::{GlobalConfig, LivenessConfig, ToolsConfig};
use crate::cli::args::Cli;
use crate::core::models::Target;

/// Everything one run needs, fixed before the first scan starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: Target,
    pub verbosity: u8,
    pub skip_liveness: bool,
    pub show_banner: bool,
    pub wordlist: PathBuf,
    pub output_base: PathBuf,
    /// Set once the result directory exists.
    pub results_dir: PathBuf,
    pub tools: ToolsConfig,
    pub liveness: LivenessConfig,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli, global: GlobalConfig) -> Result<Self> {
        let target = Target::new(cli.target.clone())?;
        let wordlist = cli
            .gb_wordlist
            .clone()
            .unwrap_or_else(|| global.tools.gobuster.wordlist.clone());
        let output_base = cli.output.clone().unwrap_or(global.output.base_dir);

        Ok(Self {
            target,
            verbosity: cli.verbosity,
            skip_liveness: cli.no_ping,
            show_banner: !cli.no_banner,
            wordlist,
            results_dir: output_base.clone(),
            output_base,
            tools: global.tools,
            liveness: global.liveness,
        })
    }

    pub fn with_results_dir(mut self, dir: PathBuf) -> Self {
        self.results_dir = dir;
        self
    }

    /// Fabricated configuration for exercising components without a CLI.
    #[cfg(test)]
    pub fn for_tests(target: &str, results_dir: impl Into<PathBuf>) -> Self {
        let global = GlobalConfig::default();
        let results_dir = results_dir.into();
        Self {
            target: Target::new(target).expect("valid test target"),
            verbosity: 0,
            skip_liveness: false,
            show_banner: false,
            wordlist: global.tools.gobuster.wordlist.clone(),
            output_base: results_dir.clone(),
            results_dir,
            tools: global.tools,
            liveness: global.liveness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::try_parse_from([
            "telescope",
            "-t",
            "10.0.0.1",
            "--no-ping",
            "--gb-wordlist",
            "/tmp/small.txt",
            "-o",
            "loot",
        ])
        .unwrap();

        let config = RunConfig::from_cli(&cli, GlobalConfig::default()).unwrap();
        assert_eq!(config.target.value, "10.0.0.1");
        assert!(config.skip_liveness);
        assert!(config.show_banner);
        assert_eq!(config.wordlist, PathBuf::from("/tmp/small.txt"));
        assert_eq!(config.output_base, PathBuf::from("loot"));
    }

    #[test]
    fn test_defaults_come_from_file_config() {
        let cli = Cli::try_parse_from(["telescope", "-t", "10.0.0.1", "-b"]).unwrap();
        let config = RunConfig::from_cli(&cli, GlobalConfig::default()).unwrap();
        assert!(!config.show_banner);
        assert_eq!(config.wordlist, PathBuf::from(crate::config::types::DEFAULT_WORDLIST));
        assert_eq!(config.output_base, PathBuf::from("telescope"));
    }
}
