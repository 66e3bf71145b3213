use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::formatter::{AdviceRequest, ChatMessage};
use crate::traits::{AdviceError, AdviceResponse, AdviceService, ConfigurationError};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const MODEL: &str = "gpt-4";
pub const MAX_TOKENS: u32 = 750;
pub const TEMPERATURE: f32 = 0.7;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Service credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from `OPENAI_API_KEY`; an empty value counts as missing
    pub fn from_env() -> Result<Self, ConfigurationError> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(ConfigurationError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            }),
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Connection settings for the chat-completion endpoint
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Chat-completion client for the OpenAI API
pub struct OpenAiAdviceService {
    http_client: reqwest::Client,
    config: ServiceConfig,
}

impl OpenAiAdviceService {
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigurationError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl AdviceService for OpenAiAdviceService {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn request_advice(&self, request: &AdviceRequest) -> Result<AdviceResponse, AdviceError> {
        let body = ChatCompletionRequest {
            model: MODEL,
            messages: request.messages(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let endpoint = self.config.endpoint();
        debug!(endpoint = %endpoint, prompt = %request.prompt, "Sending chat completion request");
        let started = Instant::now();

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(self.config.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| AdviceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AdviceError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Advice service rejected the request");
            return Err(AdviceError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| AdviceError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AdviceError::MalformedResponse("no message content".to_string()))?;

        debug!(
            duration_ms = started.elapsed().as_millis() as u64,
            chars = content.len(),
            "Chat completion finished"
        );

        Ok(AdviceResponse {
            text: content.trim().to_string(),
        })
    }
}
