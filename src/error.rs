//! Error types for the studyaid library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`StudyAidError`] — **Fatal**: the request cannot produce a result at all
//!   (bad input file, primary tool failed AND the local model is unavailable,
//!   the local model call itself failed). Returned as `Err(StudyAidError)`
//!   from the [`crate::workflow::StudyAid`] entry points.
//!
//! * [`ExternalToolError`] — **Recoverable**: the external AI command-line
//!   tool could not be spawned or exited non-zero. The workflow catches it and
//!   switches to the local fallback; it only reaches the caller wrapped inside
//!   [`StudyAidError::FallbackUnavailable`].
//!
//! * [`ChunkParseWarning`] — **Non-fatal**: the local model produced output
//!   for one chunk that could not be parsed as a flashcard. Stored inside
//!   [`crate::output::FlashcardOutput`] so callers can see how many chunks
//!   contributed nothing.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the studyaid library.
#[derive(Debug, Error)]
pub enum StudyAidError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The PDF opened fine but no page carried extractable text
    /// (typically a scanned document without an OCR layer).
    #[error("PDF '{path}' contains no extractable text ({pages} pages)")]
    EmptyDocument { path: PathBuf, pages: usize },

    /// pdfium failed while reading the text of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, or install pdfium where the system\n\
loader can find it (e.g. /usr/local/lib).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Generation errors ─────────────────────────────────────────────────
    /// The local model failed to initialise at startup and is unavailable
    /// for the lifetime of the service.
    #[error("Local model is not available: {reason}")]
    ModelUnavailable { reason: String },

    /// The primary tool failed and the fallback could not even start.
    #[error("{task}: primary generator failed ({primary}) and local model is not available ({local})")]
    FallbackUnavailable {
        task: &'static str,
        primary: ExternalToolError,
        local: String,
    },

    /// The local model was available but a call to it failed.
    ///
    /// `primary` is the failure that sent the request to the local model,
    /// when the call happened on the fallback path.
    #[error("Local model call failed on chunk {chunk}: {detail}{}", after_primary(.primary))]
    LocalGeneration {
        chunk: usize,
        detail: String,
        primary: Option<ExternalToolError>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single external-tool invocation.
///
/// Carries whatever diagnostic text was available: the captured standard
/// error for a non-zero exit, or the I/O error for a failed spawn.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ExternalToolError {
    /// The program could not be started or its pipes could not be driven.
    #[error("could not run '{program}': {detail}")]
    Spawn { program: String, detail: String },

    /// The program ran but exited unsuccessfully.
    #[error("'{program}' exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The primary stage was switched off in the configuration.
    #[error("primary generator disabled")]
    Disabled,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn after_primary(primary: &Option<ExternalToolError>) -> String {
    match primary {
        Some(p) => format!(" (after primary generator failed: {p})"),
        None => String::new(),
    }
}

/// Local model output for one chunk that did not contain the expected
/// `answer:` marker. Logged and recorded, never escalated.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("chunk {chunk}: could not parse flashcard from local model output: {raw:?}")]
pub struct ChunkParseWarning {
    /// 0-indexed chunk position.
    pub chunk: usize,
    /// The unparsed model output.
    pub raw: String,
}
