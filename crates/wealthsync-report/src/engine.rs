use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use wealthsync_core::AiConfig;

use crate::ReportError;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// First retry delay; doubles on each further attempt.
const BASE_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// A hosted text-completion API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ReportError>;
}

// --- Anthropic Messages API ---

/// Talks to the Anthropic Messages API directly so HTTP statuses reach the caller.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ReportError> {
        let body = MessagesBody {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::ProviderUnavailable {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Provider(format!("unexpected response body: {e}")))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect();
        if text.trim().is_empty() {
            return Err(ReportError::EmptyCompletion);
        }

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            })
            .unwrap_or_default();
        Ok(Completion { text, usage })
    }
}

// --- Other backends via the llm crate ---

fn map_backend(provider: &str) -> Result<LLMBackend, ReportError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(ReportError::Provider(format!("unknown provider: {other}"))),
    }
}

/// Any backend the `llm` crate supports. Status codes are not exposed by
/// that crate, so its failures surface as [`ReportError::Provider`].
pub struct LlmProvider {
    provider: String,
    api_key: String,
    base_url: Option<String>,
}

impl LlmProvider {
    pub fn new(provider: &str, api_key: impl Into<String>, base_url: Option<String>) -> Result<Self, ReportError> {
        map_backend(provider)?;
        Ok(Self {
            provider: provider.to_string(),
            api_key: api_key.into(),
            base_url,
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ReportError> {
        let mut builder = LLMBuilder::new()
            .backend(map_backend(&self.provider)?)
            .model(&request.model)
            .max_tokens(request.max_tokens)
            .system(&request.system);

        if !self.api_key.is_empty() {
            builder = builder.api_key(&self.api_key);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }

        let llm = builder
            .build()
            .map_err(|e| ReportError::Provider(format!("build LLM: {e}")))?;

        let messages = vec![ChatMessage::user().content(&request.prompt).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| ReportError::Provider(format!("chat: {e}")))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(Completion {
                text,
                usage: TokenUsage::default(),
            }),
            _ => Err(ReportError::EmptyCompletion),
        }
    }
}

/// Build the provider named in the config.
pub fn provider_from_config(ai: &AiConfig) -> Result<Arc<dyn CompletionProvider>, ReportError> {
    ai.require()?;
    if ai.provider == "anthropic" {
        return Ok(Arc::new(AnthropicProvider::new(&ai.api_key, ai.base_url.clone())));
    }
    Ok(Arc::new(LlmProvider::new(
        &ai.provider,
        &ai.api_key,
        ai.base_url.clone(),
    )?))
}

// --- Calling with timeout, cancellation and bounded retry ---

#[derive(Debug, Clone)]
pub struct CallOptions {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn from_config(ai: &AiConfig) -> Self {
        Self {
            model: ai.model.clone(),
            max_tokens: ai.max_tokens,
            timeout: Duration::from_secs(ai.timeout_secs),
            max_attempts: ai.attempts(),
            backoff: BASE_BACKOFF,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

async fn attempt(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    options: &CallOptions,
) -> Result<Completion, ReportError> {
    let call = tokio::time::timeout(options.timeout, provider.complete(request));
    let outcome = match &options.cancel {
        Some(token) => tokio::select! {
            _ = token.cancelled() => return Err(ReportError::Cancelled),
            outcome = call => outcome,
        },
        None => call.await,
    };
    outcome.unwrap_or(Err(ReportError::Timeout(options.timeout)))
}

/// Run one completion under the configured timeout and cancellation token.
///
/// Retryable failures are attempted again up to `max_attempts` in total with
/// exponential backoff. The provider call has no side effects, so repeating
/// it is safe.
pub async fn complete_with(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    options: &CallOptions,
) -> Result<Completion, ReportError> {
    let max_attempts = options.max_attempts.max(1);
    let mut delay = options.backoff;

    for n in 1..=max_attempts {
        match attempt(provider, request, options).await {
            Ok(completion) => return Ok(completion),
            Err(e) if e.is_retryable() && n < max_attempts => {
                tracing::warn!(attempt = n, error = %e, retry_in = ?delay, "completion failed, retrying");
                match &options.cancel {
                    Some(token) => tokio::select! {
                        _ = token.cancelled() => return Err(ReportError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    },
                    None => tokio::time::sleep(delay).await,
                }
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("loop returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_map_by_name() {
        assert!(map_backend("openai").is_ok());
        assert!(map_backend("ollama").is_ok());
        assert!(matches!(map_backend("watson"), Err(ReportError::Provider(_))));
    }

    #[test]
    fn unconfigured_ai_is_rejected() {
        let ai = AiConfig::default();
        assert!(matches!(
            provider_from_config(&ai),
            Err(ReportError::Config(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let p = AnthropicProvider::new("k", Some("http://localhost:8080/".into()));
        assert_eq!(p.base_url, "http://localhost:8080");
    }
}
