use which::which;

use crate::config::RunConfig;
use crate::core::errors::TelescopeError;

/// Fails with a launch error for the first configured tool not on PATH.
pub fn verify_or_bail(config: &RunConfig) -> Result<(), TelescopeError> {
    let required = [
        config.tools.nmap.command.as_str(),
        config.tools.gobuster.command.as_str(),
    ];

    for tool in required {
        match which(tool) {
            Ok(path) => {
                tracing::debug!("Found {}: {:?}", tool, path);
            }
            Err(e) => {
                return Err(TelescopeError::ProcessLaunch {
                    tool: tool.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
                });
            }
        }
    }

    tracing::info!("All required tools found");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_launch_failure() {
        let mut config = RunConfig::for_tests("10.10.10.5", "telescope");
        config.tools.nmap.command = "sh".to_string();
        config.tools.gobuster.command = "telescope-no-such-gobuster".to_string();

        match verify_or_bail(&config) {
            Err(TelescopeError::ProcessLaunch { tool, .. }) => {
                assert_eq!(tool, "telescope-no-such-gobuster");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_present_tools_pass() {
        let mut config = RunConfig::for_tests("10.10.10.5", "telescope");
        config.tools.nmap.command = "sh".to_string();
        config.tools.gobuster.command = "sh".to_string();
        assert!(verify_or_bail(&config).is_ok());
    }
}
