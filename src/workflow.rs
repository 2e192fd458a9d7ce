//! Summary and flashcard workflows: primary tool first, local model second.
//!
//! Each request runs a two-state machine:
//!
//! ```text
//! TRY_PRIMARY ──success──▶ done (GenerationSource::Primary)
//!      │
//!    failed
//!      ▼
//!  FALLBACK ──local unavailable──▶ Err(FallbackUnavailable)
//!      │
//!      └──chunk ▶ local model per chunk, in order ▶ aggregate ▶ done (LocalFallback)
//! ```
//!
//! Nothing is retried. A local model call that errors ends the request; a
//! flashcard chunk whose output cannot be parsed only adds a warning.

use crate::config::StudyAidConfig;
use crate::error::{ExternalToolError, StudyAidError};
use crate::output::{ExtractedDocument, FlashcardOutput, GenerationSource, SummaryOutput, Task};
use crate::pipeline::chunk::chunk_text;
use crate::pipeline::local::{ChunkFlashcard, LocalModelService};
use crate::pipeline::primary::{PrimaryGenerator, PrimaryOutcome};
use crate::pipeline::process::{ProcessRunner, TokioProcessRunner};
use crate::pipeline::{extract, input};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Entry point for both workflows.
///
/// Cheap to clone; clones share the process runner and the local models, so
/// one instance built at startup can serve concurrent requests.
#[derive(Clone)]
pub struct StudyAid {
    config: StudyAidConfig,
    primary: PrimaryGenerator,
    local: Arc<LocalModelService>,
}

impl StudyAid {
    /// Production wiring: real subprocesses and models from
    /// `config.local_provider` / `config.local_model`.
    ///
    /// The local model server is contacted here, once. If it is unreachable
    /// or lacks the model the service still starts, and only requests that
    /// need the fallback are affected.
    pub async fn new(config: StudyAidConfig) -> Self {
        let local = LocalModelService::initialize(&config).await;
        Self::with_components(config, Arc::new(TokioProcessRunner), Arc::new(local))
    }

    /// Assemble a service from explicit parts.
    pub fn with_components(
        config: StudyAidConfig,
        runner: Arc<dyn ProcessRunner>,
        local: Arc<LocalModelService>,
    ) -> Self {
        let primary = PrimaryGenerator::new(runner, &config);
        Self {
            config,
            primary,
            local,
        }
    }

    pub fn config(&self) -> &StudyAidConfig {
        &self.config
    }

    pub fn local_models(&self) -> &LocalModelService {
        &self.local
    }

    /// Summarise `text`, falling back to per-chunk local summaries.
    pub async fn process_document_for_summary(
        &self,
        text: &str,
    ) -> Result<SummaryOutput, StudyAidError> {
        let task = Task::Summary;
        let start = Instant::now();

        info!("Attempting to summarize with '{}'...", self.primary.program());
        self.notify(|cb| cb.on_primary_start(task));
        let primary_failure = match self.primary.summarize(text).await {
            PrimaryOutcome::Success(summary) => {
                info!(
                    "Summarized with '{}' in {}ms",
                    self.primary.program(),
                    start.elapsed().as_millis()
                );
                self.notify(|cb| cb.on_workflow_complete(task, GenerationSource::Primary));
                return Ok(SummaryOutput {
                    text: summary,
                    source: GenerationSource::Primary,
                    chunk_count: 0,
                    primary_failure: None,
                });
            }
            PrimaryOutcome::Failed(e) => e,
        };

        let chunks = self.begin_fallback(task, &primary_failure, text)?;
        let mut summaries = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let summary = self
                .local
                .summarize_chunk(idx, chunk)
                .await
                .map_err(|e| with_primary_failure(e, &primary_failure))?;
            summaries.push(summary);
            self.notify(|cb| cb.on_chunk_complete(idx, chunks.len()));
        }

        info!(
            "Summarized {} chunks with local model in {}ms",
            chunks.len(),
            start.elapsed().as_millis()
        );
        self.notify(|cb| cb.on_workflow_complete(task, GenerationSource::LocalFallback));
        Ok(SummaryOutput {
            text: summaries.join(" "),
            source: GenerationSource::LocalFallback,
            chunk_count: chunks.len(),
            primary_failure: Some(primary_failure),
        })
    }

    /// Generate flashcards for `text`, falling back to one card per chunk.
    pub async fn process_document_for_flashcards(
        &self,
        text: &str,
    ) -> Result<FlashcardOutput, StudyAidError> {
        let task = Task::Flashcards;
        let start = Instant::now();

        info!("Attempting to generate flashcards with '{}'...", self.primary.program());
        self.notify(|cb| cb.on_primary_start(task));
        let primary_failure = match self.primary.flashcards(text).await {
            PrimaryOutcome::Success(flashcards) => {
                info!(
                    "Generated {} flashcards with '{}' in {}ms",
                    flashcards.len(),
                    self.primary.program(),
                    start.elapsed().as_millis()
                );
                self.notify(|cb| cb.on_workflow_complete(task, GenerationSource::Primary));
                return Ok(FlashcardOutput {
                    flashcards,
                    source: GenerationSource::Primary,
                    chunk_count: 0,
                    warnings: Vec::new(),
                    primary_failure: None,
                });
            }
            PrimaryOutcome::Failed(e) => e,
        };

        let chunks = self.begin_fallback(task, &primary_failure, text)?;
        let mut flashcards = Vec::new();
        let mut warnings = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let outcome = self
                .local
                .flashcard_from_chunk(idx, chunk)
                .await
                .map_err(|e| with_primary_failure(e, &primary_failure))?;
            match outcome {
                ChunkFlashcard::Parsed(card) => flashcards.push(card),
                ChunkFlashcard::Unparsed(warning) => {
                    self.notify(|cb| cb.on_chunk_warning(idx, &warning.to_string()));
                    warnings.push(warning);
                }
            }
            self.notify(|cb| cb.on_chunk_complete(idx, chunks.len()));
        }

        info!(
            "Generated {} flashcards with local model ({} of {} chunks unparsed) in {}ms",
            flashcards.len(),
            warnings.len(),
            chunks.len(),
            start.elapsed().as_millis()
        );
        self.notify(|cb| cb.on_workflow_complete(task, GenerationSource::LocalFallback));
        Ok(FlashcardOutput {
            flashcards,
            source: GenerationSource::LocalFallback,
            chunk_count: chunks.len(),
            warnings,
            primary_failure: Some(primary_failure),
        })
    }

    /// Extract the text of a PDF given as a local path or HTTP/HTTPS URL.
    pub async fn extract_text(&self, input_str: &str) -> Result<ExtractedDocument, StudyAidError> {
        let resolved = input::resolve_input(input_str, self.config.download_timeout_secs).await?;
        extract::extract_text(resolved.path(), self.config.password.as_deref(), &resolved.stem())
            .await
    }

    /// Extract a PDF and summarise it.
    pub async fn summarize_pdf(
        &self,
        input_str: &str,
    ) -> Result<(ExtractedDocument, SummaryOutput), StudyAidError> {
        let document = self.extract_text(input_str).await?;
        let summary = self.process_document_for_summary(&document.text).await?;
        Ok((document, summary))
    }

    /// Extract a PDF and generate flashcards from it.
    pub async fn flashcards_from_pdf(
        &self,
        input_str: &str,
    ) -> Result<(ExtractedDocument, FlashcardOutput), StudyAidError> {
        let document = self.extract_text(input_str).await?;
        let flashcards = self.process_document_for_flashcards(&document.text).await?;
        Ok((document, flashcards))
    }

    /// Enter the FALLBACK state: log the primary failure, check the local
    /// models, and chunk the text.
    fn begin_fallback(
        &self,
        task: Task,
        primary_failure: &ExternalToolError,
        text: &str,
    ) -> Result<Vec<String>, StudyAidError> {
        warn!(
            "Primary {} generation failed: {}. Falling back to local model.",
            task, primary_failure
        );
        self.notify(|cb| cb.on_primary_failed(task, &primary_failure.to_string()));

        if let Some(reason) = self.local.unavailable_reason() {
            return Err(StudyAidError::FallbackUnavailable {
                task: task.as_str(),
                primary: primary_failure.clone(),
                local: reason.to_string(),
            });
        }

        let chunks = chunk_text(text, self.config.max_chunk_size);
        info!(
            "Split document into {} chunks (max {} chars)",
            chunks.len(),
            self.config.max_chunk_size
        );
        self.notify(|cb| cb.on_fallback_start(task, chunks.len()));
        Ok(chunks)
    }

    fn notify(&self, event: impl FnOnce(&dyn crate::progress::WorkflowProgressCallback)) {
        if let Some(ref cb) = self.config.progress_callback {
            event(cb.as_ref());
        }
    }
}

/// Attach the failure that triggered the fallback to a local call error.
fn with_primary_failure(err: StudyAidError, primary_failure: &ExternalToolError) -> StudyAidError {
    match err {
        StudyAidError::LocalGeneration { chunk, detail, .. } => StudyAidError::LocalGeneration {
            chunk,
            detail,
            primary: Some(primary_failure.clone()),
        },
        other => other,
    }
}

/// Serialise `value` as pretty JSON and write it to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_json_atomic<T: Serialize>(
    value: &T,
    path: impl AsRef<Path>,
) -> Result<(), StudyAidError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StudyAidError::Internal(format!("Failed to serialise output: {e}")))?;
    write_atomic(path.as_ref(), json.as_bytes()).await
}

/// Write `contents` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StudyAidError> {
    let write_failed = |source| StudyAidError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_failed)?;
    Ok(())
}
