/// LLM client: the single point of entry for all text-completion calls.
///
/// No other module may call the completion API directly. Callers depend on the
/// `CompletionModel` trait; `LlmClient` is the OpenAI-compatible implementation.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[cfg(test)]
pub mod testing;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One text-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_instructions: String,
    pub user_content: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Anything that turns a `CompletionRequest` into free-form text.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client with retry on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_instructions,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_content,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut attempt: u32 = 0;

        loop {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
            let retries_left = attempt < MAX_RETRIES;

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) if retries_left => {
                    warn!("LLM request failed: {e}");
                    continue;
                }
                Err(e) => return Err(LlmError::Http(e)),
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, text);
                if retries_left {
                    continue;
                }
                return Err(exhausted_error(status.as_u16(), text));
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&text)
                    .map(|e| e.error.message)
                    .unwrap_or(text);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;

            if let Some(usage) = &chat.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(LlmError::EmptyContent);
        }
    }
}

/// Error for a retryable status that persisted through the final attempt.
fn exhausted_error(status: u16, message: String) -> LlmError {
    if status == 429 {
        LlmError::RateLimited {
            retries: MAX_RETRIES,
        }
    } else {
        LlmError::Api { status, message }
    }
}

/// Returns the outermost `{...}` span of free-form model output.
pub fn extract_json_object(text: &str) -> Option<&str> {
    extract_block(text, '{', '}')
}

/// Returns the outermost `[...]` span of free-form model output.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_block(text, '[', ']')
}

fn extract_block(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parses the first JSON object embedded in `text`, if any.
pub fn parse_embedded_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let block = extract_json_object(text).ok_or(LlmError::EmptyContent)?;
    Ok(serde_json::from_str(block)?)
}

/// Parses the first JSON array embedded in `text`, if any.
pub fn parse_embedded_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, LlmError> {
    let block = extract_json_array(text).ok_or(LlmError::EmptyContent)?;
    Ok(serde_json::from_str(block)?)
}
