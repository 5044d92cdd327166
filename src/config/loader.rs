use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use super::types::GlobalConfig;
use crate::core::errors::TelescopeError;

const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./telescope.toml",
    "./config/telescope.toml",
    "~/.config/telescope/telescope.toml",
    "/etc/telescope/telescope.toml",
];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with a custom path
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<GlobalConfig> {
        // An explicitly requested file must exist
        if let Some(path) = custom_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        for default_path in DEFAULT_CONFIG_PATHS {
            let path = Self::expand_path(default_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {:?}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {:#}", path, e);
                        continue;
                    }
                }
            }
        }

        tracing::info!("No configuration file found, using default settings");
        Ok(GlobalConfig::default())
    }

    fn load_from_file(path: &Path) -> Result<GlobalConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: GlobalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {:?}", path))?;

        Self::validate_config(&config)?;

        Ok(config)
    }

    fn validate_config(config: &GlobalConfig) -> Result<(), TelescopeError> {
        let invalid = |msg: &str| Err(TelescopeError::Config(msg.to_string()));

        if config.tools.nmap.command.is_empty() {
            return invalid("nmap command cannot be empty");
        }
        if config.tools.nmap.up_marker.is_empty() {
            return invalid("nmap up_marker cannot be empty");
        }
        if config.tools.gobuster.command.is_empty() {
            return invalid("gobuster command cannot be empty");
        }
        if config.tools.gobuster.threads == 0 {
            return invalid("gobuster threads must be greater than 0");
        }
        if config.liveness.max_attempts == 0 {
            return invalid("liveness max_attempts must be greater than 0");
        }
        if config.output.base_dir.as_os_str().is_empty() {
            return invalid("output base_dir cannot be empty");
        }

        Ok(())
    }

    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_tool_settings() {
        let config = GlobalConfig::default();
        assert_eq!(config.tools.nmap.command, "nmap");
        assert_eq!(config.tools.gobuster.threads, 5);
        assert_eq!(config.tools.gobuster.extensions, ",php,html,txt,md,sh,py");
        assert_eq!(config.liveness.max_attempts, 11);
        assert_eq!(config.liveness.retry_delay_secs, 5);
        assert_eq!(config.output.base_dir, PathBuf::from("telescope"));
    }

    #[test]
    fn test_load_partial_custom_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[tools.gobuster]
command = "custom-gobuster"
threads = 20
wordlist = "/opt/lists/common.txt"

[liveness]
max_attempts = 3
"#;
        fs::write(&temp_file, config_content).unwrap();

        let config = ConfigLoader::load_with_custom_path(Some(temp_file.path())).unwrap();
        assert_eq!(config.tools.gobuster.command, "custom-gobuster");
        assert_eq!(config.tools.gobuster.threads, 20);
        assert_eq!(config.tools.gobuster.wordlist, PathBuf::from("/opt/lists/common.txt"));
        // untouched keys keep their defaults
        assert_eq!(config.tools.gobuster.timeout_secs, 5);
        assert_eq!(config.liveness.max_attempts, 3);
        assert_eq!(config.liveness.retry_delay_secs, 5);
        assert_eq!(config.tools.nmap.up_marker, "1 host up");
    }

    #[test]
    fn test_validation_errors() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[tools.gobuster]\nthreads = 0\n").unwrap();

        let result = ConfigLoader::load_with_custom_path(Some(temp_file.path()));
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("gobuster threads must be greater than 0"));
    }

    #[test]
    fn test_missing_custom_path_is_an_error() {
        let result = ConfigLoader::load_with_custom_path(Some(Path::new("/nonexistent/telescope.toml")));
        assert!(result.is_err());
    }
}
