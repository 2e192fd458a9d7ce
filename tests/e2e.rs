//! End-to-end tests against the real external tool, a real local model,
//! and real PDF files in `./test_cases/`.
//!
//! Gated behind the `E2E_ENABLED` environment variable so they do not run in
//! CI unless explicitly requested. Each test also skips itself when the
//! collaborator it needs (the `gemini` CLI, Ollama, a PDF) is missing.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_fallback_summary_with_ollama -- --nocapture

use std::path::PathBuf;
use studyaid::{GenerationSource, StudyAid, StudyAidConfig, StudyAidError};

// ── Test helpers ─────────────────────────────────────────────────────────────

const BIOLOGY_NOTES: &str = "\
Photosynthesis is the process by which green plants convert light energy into \
chemical energy. It takes place mainly in the chloroplasts of leaf cells. The \
light-dependent reactions split water and release oxygen. The Calvin cycle \
then fixes carbon dioxide into glucose using ATP and NADPH. Cellular \
respiration reverses this: glucose is broken down in the mitochondria to \
release energy as ATP.";

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Helper: check if Ollama is reachable at the configured host.
async fn ollama_is_available() -> bool {
    let host =
        std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string());
    reqwest::Client::new()
        .get(format!("{host}/api/tags"))
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await
        .is_ok()
}

fn program_on_path(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn ollama_config() -> StudyAidConfig {
    let model = std::env::var("OLLAMA_TEXT_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
    println!("[ollama] Using model: {model}");
    StudyAidConfig::builder()
        .primary_enabled(false)
        .local_provider("ollama")
        .local_model(model)
        .max_chunk_size(256)
        .build()
        .expect("config must build")
}

// ── Primary tool ─────────────────────────────────────────────────────────────

/// Requires the `gemini` CLI on PATH and authenticated.
#[tokio::test]
async fn test_primary_summary_with_gemini_cli() {
    e2e_skip_unless_enabled!();
    if !program_on_path("gemini") {
        println!("SKIP — gemini CLI not found on PATH");
        return;
    }

    let aid = StudyAid::new(StudyAidConfig::default()).await;
    let out = aid
        .process_document_for_summary(BIOLOGY_NOTES)
        .await
        .expect("summary must succeed");

    println!("[{}] {}", out.source, out.text);
    assert!(!out.text.trim().is_empty(), "summary must not be empty");
}

#[tokio::test]
async fn test_primary_flashcards_with_gemini_cli() {
    e2e_skip_unless_enabled!();
    if !program_on_path("gemini") {
        println!("SKIP — gemini CLI not found on PATH");
        return;
    }

    let aid = StudyAid::new(StudyAidConfig::default()).await;
    let out = aid
        .process_document_for_flashcards(BIOLOGY_NOTES)
        .await
        .expect("flashcards must succeed");

    for card in &out.flashcards {
        println!("Q: {}\nA: {}\n", card.question, card.answer);
    }
    if out.source == GenerationSource::Primary {
        assert!(
            !out.flashcards.is_empty(),
            "gemini output should contain at least one Q:/A: pair"
        );
    }
}

// ── Local fallback (Ollama) ──────────────────────────────────────────────────

/// Requires Ollama running at `OLLAMA_HOST` with `OLLAMA_TEXT_MODEL`
/// (default `llama3.2`) pulled.
#[tokio::test]
async fn test_fallback_summary_with_ollama() {
    e2e_skip_unless_enabled!();
    if !ollama_is_available().await {
        println!("SKIP — Ollama not reachable (start with: ollama serve)");
        return;
    }

    let aid = StudyAid::new(ollama_config()).await;
    let out = aid
        .process_document_for_summary(BIOLOGY_NOTES)
        .await
        .expect("local summary must succeed");

    println!("{} chunks → {}", out.chunk_count, out.text);
    assert_eq!(out.source, GenerationSource::LocalFallback);
    assert!(out.chunk_count >= 2, "256-char chunks should split the notes");
    assert!(!out.text.trim().is_empty());
}

#[tokio::test]
async fn test_fallback_flashcards_with_ollama() {
    e2e_skip_unless_enabled!();
    if !ollama_is_available().await {
        println!("SKIP — Ollama not reachable (start with: ollama serve)");
        return;
    }

    let aid = StudyAid::new(ollama_config()).await;
    let out = aid
        .process_document_for_flashcards(BIOLOGY_NOTES)
        .await
        .expect("local flashcards must succeed");

    println!(
        "{} cards from {} chunks ({} unparsed)",
        out.flashcards.len(),
        out.chunk_count,
        out.unparsed_chunks()
    );
    assert_eq!(out.flashcards.len() + out.unparsed_chunks(), out.chunk_count);
}

/// A primary program that does not exist must hand over to the local model.
#[tokio::test]
async fn test_missing_primary_tool_falls_back_to_ollama() {
    e2e_skip_unless_enabled!();
    if !ollama_is_available().await {
        println!("SKIP — Ollama not reachable (start with: ollama serve)");
        return;
    }

    let mut config = ollama_config();
    config.primary_enabled = true;
    config.primary_program = "studyaid-no-such-program".to_string();
    let aid = StudyAid::new(config).await;

    let out = aid
        .process_document_for_summary(BIOLOGY_NOTES)
        .await
        .expect("fallback must succeed");

    assert_eq!(out.source, GenerationSource::LocalFallback);
    let failure = out.primary_failure.expect("primary failure is reported");
    assert!(failure.to_string().contains("studyaid-no-such-program"), "{failure}");
}

// ── PDF extraction (needs libpdfium) ────────────────────────────────────────

#[tokio::test]
async fn test_extract_text_from_sample_pdf() {
    e2e_skip_unless_enabled!();
    let pdf = test_cases_dir().join("sample.pdf");
    if !pdf.exists() {
        println!("SKIP — test file not found: {}", pdf.display());
        return;
    }

    let aid = StudyAid::new(StudyAidConfig::default()).await;
    let doc = aid
        .extract_text(&pdf.to_string_lossy())
        .await
        .expect("extraction must succeed");

    println!("{} ({} pages, {} chars)", doc.title, doc.page_count, doc.text.len());
    assert!(doc.page_count > 0);
    assert!(!doc.text.trim().is_empty());
    assert!(!doc.text.contains("\n\n\n"), "blank lines must be collapsed");
    assert!(!doc.text.contains('\u{FEFF}'));
}

#[tokio::test]
async fn test_extract_nonexistent_file() {
    e2e_skip_unless_enabled!();

    let aid = StudyAid::new(StudyAidConfig::default()).await;
    let err = aid
        .extract_text("/definitely/not/a/real/file.pdf")
        .await
        .expect_err("missing file must fail");
    assert!(matches!(err, StudyAidError::FileNotFound { .. }));
}

// ── Compile-time checks (no collaborators) ──────────────────────────────────

#[test]
fn test_study_aid_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StudyAid>();
    assert_send_sync::<studyaid::NoopProgressCallback>();
}
