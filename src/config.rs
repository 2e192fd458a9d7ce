//! Configuration types for summary and flashcard generation.
//!
//! All workflow behaviour is controlled through [`StudyAidConfig`], built via
//! its [`StudyAidConfigBuilder`]. One struct holds the knobs for both the
//! primary CLI tool and the local fallback model so a single value can be
//! logged, cloned into tasks, and compared between runs.

use crate::error::StudyAidError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default external AI command-line tool.
pub const DEFAULT_PRIMARY_PROGRAM: &str = "gemini";

/// Default flag that introduces the instruction on the primary tool's command line.
pub const DEFAULT_PROMPT_FLAG: &str = "-p";

/// Default edgequake-llm provider for the local fallback.
pub const DEFAULT_LOCAL_PROVIDER: &str = "ollama";

/// Default locally-hosted model identifier.
pub const DEFAULT_LOCAL_MODEL: &str = "llama3.2";

/// Configuration for the summary and flashcard workflows.
///
/// # Example
/// ```rust
/// use studyaid::StudyAidConfig;
///
/// let config = StudyAidConfig::builder()
///     .max_chunk_size(400)
///     .local_model("llama3.2")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_chunk_size, 400);
/// ```
#[derive(Clone)]
pub struct StudyAidConfig {
    /// Executable invoked as the primary generator. Default: `gemini`.
    ///
    /// Executed directly, never through a shell.
    pub primary_program: String,

    /// Flag preceding the instruction argument. Default: `-p`.
    pub prompt_flag: String,

    /// Whether to try the primary generator at all. Default: true.
    ///
    /// When false every request goes straight to the local fallback.
    pub primary_enabled: bool,

    /// Maximum chunk length in characters for the local model. Default: 512.
    pub max_chunk_size: usize,

    /// edgequake-llm provider name for the local model. Default: `ollama`.
    pub local_provider: String,

    /// Model identifier served by the local provider. Default: `llama3.2`.
    pub local_model: String,

    /// Base URL of the local model server.
    ///
    /// `None` reads `OLLAMA_HOST` / `LMSTUDIO_HOST`, then falls back to the
    /// provider's default port on localhost.
    pub local_host: Option<String>,

    /// Upper bound on tokens per local chunk summary. Default: 150.
    pub summary_max_tokens: usize,

    /// Lower bound on tokens per local chunk summary, stated in the prompt. Default: 30.
    pub summary_min_tokens: usize,

    /// Upper bound on tokens per local flashcard generation. Default: 100.
    pub flashcard_max_tokens: usize,

    /// Sampling temperature for the local model. Default: 0.0 (deterministic).
    pub temperature: f32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives workflow events (primary attempt, per-chunk progress).
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for StudyAidConfig {
    fn default() -> Self {
        Self {
            primary_program: DEFAULT_PRIMARY_PROGRAM.to_string(),
            prompt_flag: DEFAULT_PROMPT_FLAG.to_string(),
            primary_enabled: true,
            max_chunk_size: 512,
            local_provider: DEFAULT_LOCAL_PROVIDER.to_string(),
            local_model: DEFAULT_LOCAL_MODEL.to_string(),
            local_host: None,
            summary_max_tokens: 150,
            summary_min_tokens: 30,
            flashcard_max_tokens: 100,
            temperature: 0.0,
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for StudyAidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudyAidConfig")
            .field("primary_program", &self.primary_program)
            .field("prompt_flag", &self.prompt_flag)
            .field("primary_enabled", &self.primary_enabled)
            .field("max_chunk_size", &self.max_chunk_size)
            .field("local_provider", &self.local_provider)
            .field("local_model", &self.local_model)
            .field("local_host", &self.local_host)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("summary_min_tokens", &self.summary_min_tokens)
            .field("flashcard_max_tokens", &self.flashcard_max_tokens)
            .field("temperature", &self.temperature)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn WorkflowProgressCallback>"),
            )
            .finish()
    }
}

impl StudyAidConfig {
    /// Create a new builder for `StudyAidConfig`.
    pub fn builder() -> StudyAidConfigBuilder {
        StudyAidConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`StudyAidConfig`].
#[derive(Debug)]
pub struct StudyAidConfigBuilder {
    config: StudyAidConfig,
}

impl StudyAidConfigBuilder {
    pub fn primary_program(mut self, program: impl Into<String>) -> Self {
        self.config.primary_program = program.into();
        self
    }

    pub fn prompt_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.prompt_flag = flag.into();
        self
    }

    pub fn primary_enabled(mut self, v: bool) -> Self {
        self.config.primary_enabled = v;
        self
    }

    pub fn max_chunk_size(mut self, n: usize) -> Self {
        self.config.max_chunk_size = n;
        self
    }

    pub fn local_provider(mut self, name: impl Into<String>) -> Self {
        self.config.local_provider = name.into();
        self
    }

    pub fn local_model(mut self, model: impl Into<String>) -> Self {
        self.config.local_model = model.into();
        self
    }

    pub fn local_host(mut self, url: impl Into<String>) -> Self {
        self.config.local_host = Some(url.into());
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn summary_min_tokens(mut self, n: usize) -> Self {
        self.config.summary_min_tokens = n;
        self
    }

    pub fn flashcard_max_tokens(mut self, n: usize) -> Self {
        self.config.flashcard_max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StudyAidConfig, StudyAidError> {
        let c = &self.config;
        if c.max_chunk_size == 0 {
            return Err(StudyAidError::InvalidConfig(
                "max_chunk_size must be ≥ 1".into(),
            ));
        }
        if c.primary_enabled && c.primary_program.trim().is_empty() {
            return Err(StudyAidError::InvalidConfig(
                "primary_program must not be empty while the primary generator is enabled".into(),
            ));
        }
        if c.summary_min_tokens > c.summary_max_tokens {
            return Err(StudyAidError::InvalidConfig(format!(
                "summary_min_tokens ({}) exceeds summary_max_tokens ({})",
                c.summary_min_tokens, c.summary_max_tokens
            )));
        }
        if c.local_model.trim().is_empty() {
            return Err(StudyAidError::InvalidConfig(
                "local_model must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
