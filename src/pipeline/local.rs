//! Local model generator: the fallback used when the primary tool fails.
//!
//! [`LocalModelService`] is built once at startup and shared read-only by
//! every request. Construction either yields two ready model handles
//! ("summarization" and "text-to-text generation") or records why they could
//! not be built; in the latter case every call fails fast with
//! [`StudyAidError::ModelUnavailable`] for the lifetime of the service.
//!
//! The handles sit behind the [`LocalModel`] trait. [`LlmLocalModel`] is
//! the production implementation over an edgequake-llm provider (Ollama,
//! LM Studio, or any OpenAI-compatible endpoint serving the model).

use crate::config::StudyAidConfig;
use crate::error::{ChunkParseWarning, StudyAidError};
use crate::output::Flashcard;
use crate::pipeline::parse::parse_local_flashcard;
use crate::prompts::{local_flashcard_prompt, local_summary_system, LOCAL_FLASHCARD_SYSTEM};
use async_trait::async_trait;
use edgequake_llm::{
    ChatMessage, CompletionOptions, LLMProvider, LMStudioProvider, OllamaModelInfo,
    OllamaProvider, ProviderFactory, ProviderType,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_LMSTUDIO_HOST: &str = "http://localhost:1234";

/// A single failed call to a local model.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LocalModelError(pub String);

/// One locally-hosted generative model.
#[async_trait]
pub trait LocalModel: Send + Sync {
    /// Run one generation bounded to `max_tokens` output tokens.
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: usize,
    ) -> Result<String, LocalModelError>;
}

/// [`LocalModel`] over an edgequake-llm provider.
pub struct LlmLocalModel {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl LlmLocalModel {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }
}

#[async_trait]
impl LocalModel for LlmLocalModel {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: usize,
    ) -> Result<String, LocalModelError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| LocalModelError(e.to_string()))?;
        debug!(
            "Local model: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Per-chunk result of local flashcard generation: zero or one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkFlashcard {
    Parsed(Flashcard),
    /// Output lacked the `answer:` marker; the chunk contributes nothing.
    Unparsed(ChunkParseWarning),
}

impl ChunkFlashcard {
    /// The chunk's contribution as a sequence of 0 or 1 cards.
    pub fn into_cards(self) -> Vec<Flashcard> {
        match self {
            ChunkFlashcard::Parsed(card) => vec![card],
            ChunkFlashcard::Unparsed(_) => Vec::new(),
        }
    }
}

enum ModelState {
    Ready {
        summarizer: Arc<dyn LocalModel>,
        generator: Arc<dyn LocalModel>,
    },
    Unavailable {
        reason: String,
    },
}

/// Process-wide local model handles with an explicit availability state.
pub struct LocalModelService {
    state: ModelState,
    summary_max_tokens: usize,
    summary_min_tokens: usize,
    flashcard_max_tokens: usize,
}

impl LocalModelService {
    /// Connect to `config.local_provider` and build both handles for
    /// `config.local_model`.
    ///
    /// Ollama is asked for its pulled models and LM Studio for its health;
    /// an unreachable server or a missing model leaves the service
    /// unavailable. Never fails: the reason is remembered and reported by
    /// every later call.
    pub async fn initialize(config: &StudyAidConfig) -> Self {
        match connect(config).await {
            Ok(provider) => {
                info!(
                    "Local models ready: {}/{}",
                    config.local_provider, config.local_model
                );
                let summarizer: Arc<dyn LocalModel> =
                    Arc::new(LlmLocalModel::new(Arc::clone(&provider), config.temperature));
                let generator: Arc<dyn LocalModel> =
                    Arc::new(LlmLocalModel::new(provider, config.temperature));
                Self::from_models(summarizer, generator, config)
            }
            Err(reason) => {
                error!(
                    "Failed to load local models ({}/{}): {}. Local fallback will not be available.",
                    config.local_provider, config.local_model, reason
                );
                Self::unavailable(reason, config)
            }
        }
    }

    /// Wrap already-constructed handles.
    pub fn from_models(
        summarizer: Arc<dyn LocalModel>,
        generator: Arc<dyn LocalModel>,
        config: &StudyAidConfig,
    ) -> Self {
        Self {
            state: ModelState::Ready {
                summarizer,
                generator,
            },
            summary_max_tokens: config.summary_max_tokens,
            summary_min_tokens: config.summary_min_tokens,
            flashcard_max_tokens: config.flashcard_max_tokens,
        }
    }

    /// A service whose models could not be loaded.
    pub fn unavailable(reason: impl Into<String>, config: &StudyAidConfig) -> Self {
        Self {
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
            summary_max_tokens: config.summary_max_tokens,
            summary_min_tokens: config.summary_min_tokens,
            flashcard_max_tokens: config.flashcard_max_tokens,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    /// Why the models are unavailable, if they are.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready { .. } => None,
            ModelState::Unavailable { reason } => Some(reason),
        }
    }

    fn handles(&self) -> Result<(&Arc<dyn LocalModel>, &Arc<dyn LocalModel>), StudyAidError> {
        match &self.state {
            ModelState::Ready {
                summarizer,
                generator,
            } => Ok((summarizer, generator)),
            ModelState::Unavailable { reason } => Err(StudyAidError::ModelUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// Summarise one chunk (`index` is its 0-indexed position, for errors).
    pub async fn summarize_chunk(&self, index: usize, chunk: &str) -> Result<String, StudyAidError> {
        let (summarizer, _) = self.handles()?;
        let system = local_summary_system(self.summary_min_tokens, self.summary_max_tokens);
        let summary = summarizer
            .generate(&system, chunk, self.summary_max_tokens)
            .await
            .map_err(|e| StudyAidError::LocalGeneration {
                chunk: index,
                detail: e.to_string(),
                primary: None,
            })?;
        Ok(summary.trim().to_string())
    }

    /// Generate at most one flashcard from one chunk.
    ///
    /// Unparseable output is not an error: it is logged and returned as
    /// [`ChunkFlashcard::Unparsed`].
    pub async fn flashcard_from_chunk(
        &self,
        index: usize,
        chunk: &str,
    ) -> Result<ChunkFlashcard, StudyAidError> {
        let (_, generator) = self.handles()?;
        let raw = generator
            .generate(
                LOCAL_FLASHCARD_SYSTEM,
                &local_flashcard_prompt(chunk),
                self.flashcard_max_tokens,
            )
            .await
            .map_err(|e| StudyAidError::LocalGeneration {
                chunk: index,
                detail: e.to_string(),
                primary: None,
            })?;

        match parse_local_flashcard(&raw) {
            Some(card) => Ok(ChunkFlashcard::Parsed(card)),
            None => {
                warn!("Could not parse flashcard from local model output: {}", raw);
                Ok(ChunkFlashcard::Unparsed(ChunkParseWarning { chunk: index, raw }))
            }
        }
    }
}

/// Resolve and check the provider behind the local model.
async fn connect(config: &StudyAidConfig) -> Result<Arc<dyn LLMProvider>, String> {
    let model = config.local_model.as_str();
    match ProviderType::from_str(&config.local_provider) {
        Some(ProviderType::Ollama) => {
            let host = resolve_host(config, "OLLAMA_HOST", DEFAULT_OLLAMA_HOST);
            let provider = OllamaProvider::builder()
                .host(&host)
                .model(model)
                .build()
                .map_err(|e| format!("Ollama provider: {e}"))?;
            let listing = provider
                .list_models()
                .await
                .map_err(|e| format!("Ollama not reachable at {host}: {e}"))?;
            if !ollama_has_model(&listing.models, model) {
                return Err(format!(
                    "model '{model}' is not pulled in Ollama at {host} (run: ollama pull {model})"
                ));
            }
            Ok(Arc::new(provider))
        }
        Some(ProviderType::LMStudio) => {
            let host = resolve_host(config, "LMSTUDIO_HOST", DEFAULT_LMSTUDIO_HOST);
            let provider = LMStudioProvider::builder()
                .host(&host)
                .model(model)
                .build()
                .map_err(|e| format!("LM Studio provider: {e}"))?;
            provider
                .health_check()
                .await
                .map_err(|e| format!("LM Studio not reachable at {host}: {e}"))?;
            Ok(Arc::new(provider))
        }
        _ => ProviderFactory::create_llm_provider(&config.local_provider, model)
            .map_err(|e| e.to_string()),
    }
}

fn resolve_host(config: &StudyAidConfig, env_var: &str, default: &str) -> String {
    config
        .local_host
        .clone()
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Ollama lists models as `name:tag`; an untagged request means `:latest`.
fn ollama_has_model(models: &[OllamaModelInfo], wanted: &str) -> bool {
    let wanted = if wanted.contains(':') {
        wanted.to_string()
    } else {
        format!("{wanted}:latest")
    };
    models
        .iter()
        .any(|m| m.name == wanted || m.model == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed reply and records the prompts and token limits it saw.
    struct FixedModel {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, String, usize)>>,
    }

    impl FixedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(detail: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(detail.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LocalModel for FixedModel {
        async fn generate(
            &self,
            system: &str,
            prompt: &str,
            max_tokens: usize,
        ) -> Result<String, LocalModelError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string(), max_tokens));
            self.reply.clone().map_err(LocalModelError)
        }
    }

    fn service(summarizer: Arc<FixedModel>, generator: Arc<FixedModel>) -> LocalModelService {
        LocalModelService::from_models(summarizer, generator, &StudyAidConfig::default())
    }

    #[tokio::test]
    async fn summary_uses_bounded_output() {
        let summarizer = FixedModel::replying(" Cells divide. \n");
        let svc = service(Arc::clone(&summarizer), FixedModel::replying(""));

        assert_eq!(svc.summarize_chunk(0, "Mitosis text").await.unwrap(), "Cells divide.");
        let seen = summarizer.seen.lock().unwrap();
        assert_eq!(seen[0].1, "Mitosis text");
        assert_eq!(seen[0].2, 150);
        assert!(seen[0].0.contains("between 30 and 150 tokens"));
    }

    #[tokio::test]
    async fn flashcard_parses_question_answer() {
        let generator = FixedModel::replying("question: What? answer: Because.");
        let svc = service(FixedModel::replying(""), Arc::clone(&generator));

        let result = svc.flashcard_from_chunk(0, "Some chunk").await.unwrap();
        assert_eq!(result, ChunkFlashcard::Parsed(Flashcard::new("What?", "Because.")));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0].2, 100);
        assert!(seen[0].1.ends_with("Some chunk"));
    }

    #[tokio::test]
    async fn unparseable_flashcard_is_a_warning_not_an_error() {
        let svc = service(FixedModel::replying(""), FixedModel::replying("no marker here"));

        let result = svc.flashcard_from_chunk(4, "chunk").await.unwrap();
        assert_eq!(
            result,
            ChunkFlashcard::Unparsed(ChunkParseWarning {
                chunk: 4,
                raw: "no marker here".into()
            })
        );
        assert!(result.into_cards().is_empty());
    }

    #[tokio::test]
    async fn unavailable_service_fails_fast() {
        let svc = LocalModelService::unavailable("model not found", &StudyAidConfig::default());
        assert!(!svc.is_available());
        assert_eq!(svc.unavailable_reason(), Some("model not found"));

        let err = svc.summarize_chunk(0, "text").await.unwrap_err();
        assert!(matches!(err, StudyAidError::ModelUnavailable { ref reason } if reason == "model not found"));
        let err = svc.flashcard_from_chunk(0, "text").await.unwrap_err();
        assert!(matches!(err, StudyAidError::ModelUnavailable { .. }));
    }

    #[tokio::test]
    async fn model_call_failure_names_the_chunk() {
        let svc = service(FixedModel::failing("connection refused"), FixedModel::replying(""));
        let err = svc.summarize_chunk(2, "text").await.unwrap_err();
        match err {
            StudyAidError::LocalGeneration { chunk, detail, .. } => {
                assert_eq!(chunk, 2);
                assert_eq!(detail, "connection refused");
            }
            other => panic!("expected LocalGeneration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn summary_is_returned_verbatim_apart_from_outer_whitespace() {
        let reply = "\n```\n- Cells divide.\n```\n";
        let svc = service(FixedModel::replying(reply), FixedModel::replying(""));
        assert_eq!(
            svc.summarize_chunk(0, "text").await.unwrap(),
            "```\n- Cells divide.\n```"
        );
    }

    #[tokio::test]
    async fn unknown_provider_leaves_service_unavailable() {
        let config = StudyAidConfig::builder()
            .local_provider("no-such-provider")
            .build()
            .unwrap();
        let svc = LocalModelService::initialize(&config).await;
        assert!(!svc.is_available());
        assert!(svc.unavailable_reason().unwrap().contains("no-such-provider"));
    }

    #[tokio::test]
    async fn unreachable_ollama_leaves_service_unavailable() {
        let config = StudyAidConfig::builder()
            .local_provider("ollama")
            .local_host("http://127.0.0.1:1")
            .build()
            .unwrap();
        let svc = LocalModelService::initialize(&config).await;
        assert!(!svc.is_available());
        let reason = svc.unavailable_reason().unwrap();
        assert!(reason.contains("http://127.0.0.1:1"), "{reason}");

        let err = svc.summarize_chunk(0, "text").await.unwrap_err();
        assert!(matches!(err, StudyAidError::ModelUnavailable { .. }));
    }

    #[tokio::test]
    async fn unreachable_lmstudio_leaves_service_unavailable() {
        let config = StudyAidConfig::builder()
            .local_provider("lmstudio")
            .local_host("http://127.0.0.1:1")
            .build()
            .unwrap();
        let svc = LocalModelService::initialize(&config).await;
        assert!(!svc.is_available());
    }

    fn pulled(name: &str) -> OllamaModelInfo {
        serde_json::from_value(serde_json::json!({ "name": name, "model": name })).unwrap()
    }

    #[test]
    fn ollama_model_matching_defaults_to_latest_tag() {
        let models = vec![pulled("llama3.2:latest"), pulled("qwen2.5:7b")];
        assert!(ollama_has_model(&models, "llama3.2"));
        assert!(ollama_has_model(&models, "llama3.2:latest"));
        assert!(ollama_has_model(&models, "qwen2.5:7b"));
        assert!(!ollama_has_model(&models, "qwen2.5"));
        assert!(!ollama_has_model(&models, "flan-t5-base"));
        assert!(!ollama_has_model(&[], "llama3.2"));
    }

    #[test]
    fn ready_service_reports_available() {
        let svc = service(FixedModel::replying(""), FixedModel::replying(""));
        assert!(svc.is_available());
        assert_eq!(svc.unavailable_reason(), None);
    }
}
