//! # studyaid
//!
//! Turn study material into summaries and flashcards.
//!
//! Generation goes to an external AI command-line tool first (`gemini` by
//! default). When that tool is missing or exits non-zero, the document is cut
//! into small chunks and handed to a locally configured model one chunk at a
//! time, so a result is still produced offline.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF or text
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Extract   page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Primary   one run of the external tool, document on stdin
//!  │      └─ on failure:
//!  ├─ 4. Chunk     greedy whitespace chunking (512 chars by default)
//!  ├─ 5. Local     one model call per chunk, in order
//!  └─ 6. Result    summary text or flashcards + which generator produced it
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use studyaid::{StudyAid, StudyAidConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let aid = StudyAid::new(StudyAidConfig::default()).await;
//!     let text = std::fs::read_to_string("lecture-notes.txt")?;
//!
//!     let summary = aid.process_document_for_summary(&text).await?;
//!     println!("[{}] {}", summary.source, summary.text);
//!
//!     let cards = aid.process_document_for_flashcards(&text).await?;
//!     for card in &cards.flashcards {
//!         println!("Q: {}\nA: {}", card.question, card.answer);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `studyaid` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! studyaid = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{StudyAidConfig, StudyAidConfigBuilder};
pub use error::{ChunkParseWarning, ExternalToolError, StudyAidError};
pub use output::{
    ExtractedDocument, Flashcard, FlashcardOutput, GenerationSource, SummaryOutput, Task,
};
pub use pipeline::chunk::chunk_text;
pub use pipeline::local::{LocalModel, LocalModelError, LocalModelService};
pub use pipeline::process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use progress::{NoopProgressCallback, ProgressCallback, WorkflowProgressCallback};
pub use workflow::{write_json_atomic, StudyAid};
