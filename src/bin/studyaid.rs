//! CLI binary for studyaid.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `StudyAidConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use studyaid::{
    write_json_atomic, ExtractedDocument, FlashcardOutput, GenerationSource, ProgressCallback,
    StudyAid, StudyAidConfig, SummaryOutput, Task, WorkflowProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the primary tool runs, then a chunk bar if the workflow
/// falls back to the local model.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl WorkflowProgressCallback for CliProgressCallback {
    fn on_primary_start(&self, task: Task) {
        self.bar.set_prefix("Primary");
        self.bar.set_message(format!("generating {task}…"));
    }

    fn on_primary_failed(&self, _task: Task, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} primary tool failed: {}", yellow("⚠"), dim(first_line)));
    }

    fn on_fallback_start(&self, _task: Task, total_chunks: usize) {
        self.bar.set_length(total_chunks as u64);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} chunks  \
                 ⏱ {elapsed_precise}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_prefix("Local model");
        self.bar.set_message("");
        self.bar.reset_eta();
    }

    fn on_chunk_complete(&self, _index: usize, _total: usize) {
        self.bar.inc(1);
    }

    fn on_chunk_warning(&self, index: usize, _warning: &str) {
        self.bar.println(format!(
            "  {} chunk {} produced no flashcard",
            yellow("⚠"),
            index + 1
        ));
    }

    fn on_workflow_complete(&self, task: Task, source: GenerationSource) {
        self.bar.finish_and_clear();
        eprintln!("{} {} generated ({})", green("✔"), bold(task.as_str()), source);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a PDF (gemini CLI first, local model if that fails)
  studyaid summarize lecture.pdf

  # Flashcards from a plain-text file, as JSON
  studyaid flashcards --text-file notes.txt --json -o cards.json

  # Work offline: skip the external tool entirely
  studyaid summarize --no-primary --local-model llama3.2 lecture.pdf

  # Just pull the text out of a PDF at a URL
  studyaid extract https://example.edu/biology/week3.pdf

ENVIRONMENT VARIABLES:
  STUDYAID_PRIMARY_PROGRAM  External AI tool (default: gemini)
  STUDYAID_LOCAL_PROVIDER   edgequake-llm provider for the fallback (default: ollama)
  STUDYAID_LOCAL_MODEL      Fallback model ID (default: llama3.2)
  STUDYAID_LOCAL_HOST       Local model server URL (default: OLLAMA_HOST or localhost)
  PDFIUM_LIB_PATH           Path to libpdfium if it is not on the loader path
  RUST_LOG                  Override log filtering (e.g. studyaid=debug)
"#;

/// Summaries and flashcards from study material.
#[derive(Parser, Debug)]
#[command(
    name = "studyaid",
    version,
    about = "Generate summaries and flashcards from PDFs and text",
    long_about = "Generate summaries and flashcards from study material. The external AI \
command-line tool (gemini by default) is tried first; if it is missing or fails, the text \
is chunked and processed by a local model instead.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    opts: GlobalOpts,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarise a document.
    Summarize(SourceArgs),
    /// Generate question/answer flashcards from a document.
    Flashcards(SourceArgs),
    /// Print the text extracted from a PDF.
    Extract {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "text_file", conflicts_with = "text_file")]
    input: Option<String>,

    /// Read plain text from this file instead of a PDF.
    #[arg(long, env = "STUDYAID_TEXT_FILE")]
    text_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Write the result to this file instead of stdout.
    #[arg(short, long, global = true, env = "STUDYAID_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON instead of plain text.
    #[arg(long, global = true, env = "STUDYAID_JSON")]
    json: bool,

    /// Maximum chunk length in characters for the local model.
    #[arg(long, global = true, env = "STUDYAID_MAX_CHUNK_SIZE", default_value_t = 512)]
    max_chunk_size: usize,

    /// External AI command-line tool tried first.
    #[arg(long, global = true, env = "STUDYAID_PRIMARY_PROGRAM", default_value = "gemini")]
    primary_program: String,

    /// Skip the external tool and use the local model directly.
    #[arg(long, global = true, env = "STUDYAID_NO_PRIMARY")]
    no_primary: bool,

    /// edgequake-llm provider for the local fallback (ollama, lmstudio, …).
    #[arg(long, global = true, env = "STUDYAID_LOCAL_PROVIDER", default_value = "ollama")]
    local_provider: String,

    /// Model ID for the local fallback.
    #[arg(long, global = true, env = "STUDYAID_LOCAL_MODEL", default_value = "llama3.2")]
    local_model: String,

    /// Base URL of the local model server.
    #[arg(long, global = true, env = "STUDYAID_LOCAL_HOST")]
    local_host: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, global = true, env = "STUDYAID_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "STUDYAID_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "STUDYAID_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "STUDYAID_QUIET")]
    quiet: bool,

    /// Disable progress display.
    #[arg(long, global = true, env = "STUDYAID_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let opts = &cli.opts;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress display replaces INFO-level logs unless --verbose is set.
    let show_progress = !opts.quiet
        && !opts.no_progress
        && !opts.json
        && !matches!(cli.command, Command::Extract { .. });
    let filter = if opts.verbose {
        "debug"
    } else if opts.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn WorkflowProgressCallback>)
    } else {
        None
    };

    let config = build_config(opts, progress_cb)?;
    let aid = StudyAid::new(config).await;

    match &cli.command {
        Command::Extract { input } => {
            let document = aid
                .extract_text(input)
                .await
                .context("Text extraction failed")?;
            emit(opts, &document, |d: &ExtractedDocument| d.text.clone()).await?;
        }
        Command::Summarize(source) => {
            let text = load_text(&aid, source).await?;
            let summary = aid
                .process_document_for_summary(&text)
                .await
                .context("Summary generation failed")?;
            emit(opts, &summary, render_summary).await?;
            report(opts, summary.source, summary.chunk_count, 0);
        }
        Command::Flashcards(source) => {
            let text = load_text(&aid, source).await?;
            let cards = aid
                .process_document_for_flashcards(&text)
                .await
                .context("Flashcard generation failed")?;
            emit(opts, &cards, render_flashcards).await?;
            report(opts, cards.source, cards.chunk_count, cards.unparsed_chunks());
        }
    }

    Ok(())
}

/// Map CLI args to `StudyAidConfig`.
fn build_config(opts: &GlobalOpts, progress: Option<ProgressCallback>) -> Result<StudyAidConfig> {
    let mut builder = StudyAidConfig::builder()
        .primary_program(&opts.primary_program)
        .primary_enabled(!opts.no_primary)
        .max_chunk_size(opts.max_chunk_size)
        .local_provider(&opts.local_provider)
        .local_model(&opts.local_model)
        .download_timeout_secs(opts.download_timeout);

    if let Some(ref host) = opts.local_host {
        builder = builder.local_host(host);
    }
    if let Some(ref pwd) = opts.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Document text from `--text-file` or from the PDF input.
async fn load_text(aid: &StudyAid, source: &SourceArgs) -> Result<String> {
    if let Some(ref path) = source.text_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read text from {:?}", path));
    }
    let input = source
        .input
        .as_deref()
        .context("Either <INPUT> or --text-file is required")?;
    let document = aid
        .extract_text(input)
        .await
        .context("Text extraction failed")?;
    Ok(document.text)
}

/// Write the result as JSON or rendered text, to `--output` or stdout.
async fn emit<T: serde::Serialize>(
    opts: &GlobalOpts,
    value: &T,
    render: impl Fn(&T) -> String,
) -> Result<()> {
    if opts.json {
        if let Some(ref path) = opts.output {
            write_json_atomic(value, path)
                .await
                .context("Failed to write output")?;
        } else {
            let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
            println!("{json}");
        }
        return Ok(());
    }

    let mut text = render(value);
    if !text.ends_with('\n') {
        text.push('\n');
    }
    if let Some(ref path) = opts.output {
        studyaid::workflow::write_atomic(path, text.as_bytes())
            .await
            .context("Failed to write output")?;
    } else {
        io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

fn render_summary(summary: &SummaryOutput) -> String {
    summary.text.clone()
}

fn render_flashcards(cards: &FlashcardOutput) -> String {
    cards
        .flashcards
        .iter()
        .map(|c| format!("Q: {}\nA: {}", c.question, c.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One-line summary on stderr when the progress display was off.
fn report(opts: &GlobalOpts, source: GenerationSource, chunks: usize, unparsed: usize) {
    if opts.quiet || opts.json || !opts.no_progress {
        // The progress display already printed the outcome.
        return;
    }
    match source {
        GenerationSource::Primary => eprintln!("Generated with {}", opts.primary_program),
        GenerationSource::LocalFallback if unparsed > 0 => eprintln!(
            "Generated with local model from {} chunks ({} produced no flashcard)",
            chunks, unparsed
        ),
        GenerationSource::LocalFallback => {
            eprintln!("Generated with local model from {} chunks", chunks)
        }
    }
}
