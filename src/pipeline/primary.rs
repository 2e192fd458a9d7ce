//! Primary generator: the external AI command-line tool.
//!
//! One attempt per request. The instruction goes on the command line after
//! the configured prompt flag; the document goes to the child's stdin for
//! both tasks. A failure is returned as data ([`PrimaryOutcome::Failed`]) so
//! the workflow can branch on it without unwinding.

use crate::config::StudyAidConfig;
use crate::error::ExternalToolError;
use crate::output::Flashcard;
use crate::pipeline::parse::parse_primary_flashcards;
use crate::pipeline::process::ProcessRunner;
use crate::prompts::{PRIMARY_FLASHCARD_INSTRUCTION, PRIMARY_SUMMARY_INSTRUCTION};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Result of one primary-generator attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryOutcome<T> {
    Success(T),
    /// Recoverable: the workflow falls back to the local model.
    Failed(ExternalToolError),
}

impl<T> PrimaryOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PrimaryOutcome<U> {
        match self {
            PrimaryOutcome::Success(v) => PrimaryOutcome::Success(f(v)),
            PrimaryOutcome::Failed(e) => PrimaryOutcome::Failed(e),
        }
    }
}

/// Drives the external tool through a [`ProcessRunner`].
#[derive(Clone)]
pub struct PrimaryGenerator {
    runner: Arc<dyn ProcessRunner>,
    program: String,
    prompt_flag: String,
    enabled: bool,
}

impl PrimaryGenerator {
    pub fn new(runner: Arc<dyn ProcessRunner>, config: &StudyAidConfig) -> Self {
        Self {
            runner,
            program: config.primary_program.clone(),
            prompt_flag: config.prompt_flag.clone(),
            enabled: config.primary_enabled,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Summarise the whole document with the external tool.
    pub async fn summarize(&self, text: &str) -> PrimaryOutcome<String> {
        self.invoke(PRIMARY_SUMMARY_INSTRUCTION, text).await
    }

    /// Generate flashcards for the whole document with the external tool.
    ///
    /// A successful run whose output contains no `Q:`/`A:` pair yields an
    /// empty list, not a failure.
    pub async fn flashcards(&self, text: &str) -> PrimaryOutcome<Vec<Flashcard>> {
        self.invoke(PRIMARY_FLASHCARD_INSTRUCTION, text)
            .await
            .map(|raw| parse_primary_flashcards(&raw))
    }

    async fn invoke(&self, instruction: &str, text: &str) -> PrimaryOutcome<String> {
        if !self.enabled {
            return PrimaryOutcome::Failed(ExternalToolError::Disabled);
        }

        let args = if self.prompt_flag.is_empty() {
            vec![instruction.to_string()]
        } else {
            vec![self.prompt_flag.clone(), instruction.to_string()]
        };

        let start = Instant::now();
        let output = match self.runner.run(&self.program, &args, text.as_bytes()).await {
            Ok(output) => output,
            Err(e) => {
                return PrimaryOutcome::Failed(ExternalToolError::Spawn {
                    program: self.program.clone(),
                    detail: e.to_string(),
                })
            }
        };
        debug!(
            "'{}' exited with {:?} after {}ms ({} bytes stdout, {} bytes stderr)",
            self.program,
            output.code,
            start.elapsed().as_millis(),
            output.stdout.len(),
            output.stderr.len()
        );

        if !output.success() {
            return PrimaryOutcome::Failed(ExternalToolError::NonZeroExit {
                program: self.program.clone(),
                code: output.code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        PrimaryOutcome::Success(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
