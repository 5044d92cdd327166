use crate::core::errors::{ExecError, TelescopeError};
use crate::plugins::types::LineSource;
use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const STDERR_TAIL_LINES: usize = 10;

#[derive(Debug)]
pub struct CommandResult {
    pub stdout: String,
}

fn spawn(tool: &str, args: &[String]) -> Result<Child, TelescopeError> {
    tracing::debug!("Executing: {} {:?}", tool, args);

    Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| TelescopeError::ProcessLaunch {
            tool: tool.to_string(),
            source,
        })
}

fn exec_error(tool: &str, args: &[String], exit_code: Option<i32>, stderr: &str, start: Instant) -> TelescopeError {
    tracing::debug!("{} failed after {}ms", tool, start.elapsed().as_millis());
    TelescopeError::Process(ExecError {
        tool: tool.to_string(),
        args: args.to_vec(),
        exit_code,
        stderr_tail: tail(stderr, STDERR_TAIL_LINES),
    })
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

/// Runs a one-shot command and captures its output.
pub async fn execute(tool: &str, args: &[String], timeout_ms: Option<u64>) -> Result<CommandResult> {
    let start = Instant::now();
    let mut child = spawn(tool, args)?;

    let stdout = child.stdout.take().map(BufReader::new);
    let stderr = child.stderr.take().map(BufReader::new);

    // Read outputs while waiting so neither pipe can fill up and stall the tool
    let collected = async { tokio::join!(read_all(stdout), read_all(stderr), child.wait()) };
    let outcome = match timeout_ms {
        Some(ms) => timeout(Duration::from_millis(ms), collected).await,
        None => Ok(collected.await),
    };

    let (stdout_result, stderr_result, wait_result) = match outcome {
        Ok(parts) => parts,
        Err(_) => {
            let _ = child.kill().await;
            let msg = format!("Command timed out after {}ms", timeout_ms.unwrap_or_default());
            return Err(exec_error(tool, args, None, &msg, start).into());
        }
    };

    let stderr = stderr_result?;
    let status = match wait_result {
        Ok(status) => status,
        Err(e) => {
            return Err(exec_error(tool, args, None, &format!("Process error: {}", e), start).into());
        }
    };

    if !status.success() {
        return Err(exec_error(tool, args, status.code(), &stderr, start).into());
    }

    Ok(CommandResult {
        stdout: stdout_result?,
    })
}

async fn read_all<R>(reader: Option<BufReader<R>>) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(String::new());
    };

    // Tool output is not guaranteed to be UTF-8
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw).await?;
    Ok(String::from_utf8_lossy(&raw).lines().collect::<Vec<_>>().join("\n"))
}

/// A running command whose stdout is consumed line by line.
///
/// Stderr is drained in the background so a chatty tool never stalls on a
/// full pipe.
pub struct LineStream {
    tool: String,
    args: Vec<String>,
    start: Instant,
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<Result<String>>>,
}

/// Starts a long-running command for streamed consumption.
pub fn stream(tool: &str, args: &[String]) -> Result<LineStream> {
    let start = Instant::now();
    let mut child = spawn(tool, args)?;

    let stdout = child.stdout.take().map(BufReader::new);
    let stderr = child
        .stderr
        .take()
        .map(|err| tokio::spawn(read_all(Some(BufReader::new(err)))));

    Ok(LineStream {
        tool: tool.to_string(),
        args: args.to_vec(),
        start,
        child,
        stdout,
        stderr,
    })
}

#[async_trait]
impl LineSource for LineStream {
    /// Bytes that are not UTF-8 (e.g. Latin-1 wordlist entries) are replaced,
    /// never fatal.
    async fn next_line(&mut self) -> Result<Option<String>> {
        let Some(reader) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut raw = Vec::new();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            return Ok(None);
        }
        if raw.last() == Some(&b'\n') {
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    async fn finish(mut self: Box<Self>) -> Result<()> {
        // Close our end so a tool still writing gets EPIPE instead of blocking.
        self.stdout.take();
        let status = self.child.wait().await?;

        let stderr = match self.stderr.take() {
            Some(handle) => handle.await??,
            None => String::new(),
        };

        if !status.success() {
            return Err(exec_error(&self.tool, &self.args, status.code(), &stderr, self.start).into());
        }

        tracing::debug!(
            "{} finished in {}ms",
            self.tool,
            self.start.elapsed().as_millis()
        );
        Ok(())
    }
}
