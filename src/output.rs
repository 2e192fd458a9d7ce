//! Result types returned by the workflows and the PDF extraction stage.

use crate::error::{ChunkParseWarning, ExternalToolError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Which of the two generation paths produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    /// The external AI command-line tool.
    Primary,
    /// The chunked local-model pipeline.
    LocalFallback,
}

impl fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationSource::Primary => f.write_str("primary"),
            GenerationSource::LocalFallback => f.write_str("local fallback"),
        }
    }
}

/// The two workflows. Used in logs, errors, and progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Summary,
    Flashcards,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Summary => "summary",
            Task::Flashcards => "flashcards",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`crate::workflow::StudyAid::process_document_for_summary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// The summary text.
    pub text: String,
    pub source: GenerationSource,
    /// Chunks fed to the local model; 0 when the primary tool answered.
    pub chunk_count: usize,
    /// Why the primary tool was bypassed, when it was.
    pub primary_failure: Option<ExternalToolError>,
}

/// Result of [`crate::workflow::StudyAid::process_document_for_flashcards`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardOutput {
    pub flashcards: Vec<Flashcard>,
    pub source: GenerationSource,
    /// Chunks fed to the local model; 0 when the primary tool answered.
    pub chunk_count: usize,
    /// One entry per chunk whose model output could not be parsed.
    pub warnings: Vec<ChunkParseWarning>,
    /// Why the primary tool was bypassed, when it was.
    pub primary_failure: Option<ExternalToolError>,
}

impl FlashcardOutput {
    /// Number of chunks that contributed no flashcard.
    pub fn unparsed_chunks(&self) -> usize {
        self.warnings.len()
    }
}

/// Text pulled out of a PDF, ready for either workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Metadata title, or the file name when the PDF has none.
    pub title: String,
    pub text: String,
    pub page_count: usize,
}
