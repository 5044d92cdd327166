use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ExecError {
    pub tool: String,
    pub args: Vec<String>,
    pub exit_code: Option<i32>,
    pub stderr_tail: String,
}

impl ExecError {
    pub fn command_line(&self) -> String {
        std::iter::once(self.tool.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "`{}` exited with status {}", self.command_line(), code)?,
            None => write!(f, "`{}` terminated abnormally", self.command_line())?,
        }
        if !self.stderr_tail.is_empty() {
            write!(f, ": {}", self.stderr_tail)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum TelescopeError {
    #[error("failed to launch {tool}: {source}")]
    ProcessLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process error: {0}")]
    Process(ExecError),

    #[error("malformed scan output: {0}")]
    MalformedScanOutput(String),

    #[error("{target} did not respond after {attempts} attempts, check if it is up or if it filters pings")]
    LivenessCheckExhausted { target: String, attempts: u32 },

    #[error("some scans require root privileges, please run as root")]
    InsufficientPrivileges,

    #[error("configuration error: {0}")]
    Config(String),
}

impl TelescopeError {
    /// Failures that are logged while the run carries on with partial results.
    pub fn is_best_effort(&self) -> bool {
        matches!(self, TelescopeError::Process(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_display_includes_stderr() {
        let err = ExecError {
            tool: "gobuster".to_string(),
            args: vec!["dir".to_string()],
            exit_code: Some(1),
            stderr_tail: "wordlist not found".to_string(),
        };
        assert_eq!(err.to_string(), "`gobuster dir` exited with status 1: wordlist not found");
    }

    #[test]
    fn test_only_process_errors_are_best_effort() {
        let process = TelescopeError::Process(ExecError {
            tool: "nmap".to_string(),
            args: vec![],
            exit_code: None,
            stderr_tail: String::new(),
        });
        assert!(process.is_best_effort());
        assert!(!TelescopeError::InsufficientPrivileges.is_best_effort());
        assert!(!TelescopeError::MalformedScanOutput("empty".into()).is_best_effort());
    }
}
