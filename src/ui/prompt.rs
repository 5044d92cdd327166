use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::io::{BufRead, Write};
use tokio::sync::Mutex;

use super::printer::{Source, format_line};
use crate::core::models::Answer;

/// The operator channel. Implementations must serialize concurrent questions.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn ask(&self, source: Source, message: &str, allowed: &[Answer]) -> Result<Answer>;
}

/// Asks on `output` until `input` yields one of the allowed answers.
pub fn ask_until_valid<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    source: Source,
    message: &str,
    allowed: &[Answer],
) -> Result<Answer> {
    let options: Vec<&str> = allowed.iter().map(Answer::as_str).collect();
    let question = format!("{} [{}]: ", format_line(source, message), options.join("/"));

    loop {
        output.write_all(question.as_bytes())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read operator input")? == 0 {
            bail!("operator input closed");
        }
        if let Some(answer) = Answer::parse(&line, allowed) {
            return Ok(answer);
        }
    }
}

/// Prompts on the terminal, one question at a time.
#[derive(Default)]
pub struct StdinPrompter {
    turn: Mutex<()>,
}

impl StdinPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Prompter for StdinPrompter {
    async fn ask(&self, source: Source, message: &str, allowed: &[Answer]) -> Result<Answer> {
        let _turn = self.turn.lock().await;

        let message = message.to_string();
        let allowed = allowed.to_vec();
        tokio::task::spawn_blocking(move || {
            // Stdout stays unlocked so other scans keep printing while we wait
            let stdin = std::io::stdin();
            ask_until_valid(&mut stdin.lock(), &mut std::io::stdout(), source, &message, &allowed)
        })
        .await?
    }
}
