use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracker_core::ClassificationRequest;
use tracker_logging::tracker_debug;

use crate::{CompletionError, FailureKind};

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Hosted text-understanding service: prompt in, free-form text out.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &ClassificationRequest) -> Result<String, CompletionError>;

    /// Model identifier, used to fingerprint the prompt contract in logs.
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    settings: CompletionSettings,
    client: reqwest::Client,
}

impl OpenAiChatClient {
    pub fn new(settings: CompletionSettings) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| CompletionError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl CompletionService for OpenAiChatClient {
    async fn complete(&self, request: &ClassificationRequest) -> Result<String, CompletionError> {
        let url = reqwest::Url::parse(&self.endpoint())
            .map_err(|err| CompletionError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let body = ChatRequest {
            model: &self.settings.model,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
        };

        tracker_debug!("POST {} model={}", url, self.settings.model);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| CompletionError::new(FailureKind::InvalidBody, err.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|reply| reply.content)
            .unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        return CompletionError::new(FailureKind::Timeout, err.to_string());
    }
    CompletionError::new(FailureKind::Network, err.to_string())
}

/// Answers every request with the same text. Used for dry runs.
#[derive(Debug, Clone)]
pub struct StubCompletionService {
    reply: String,
}

impl StubCompletionService {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// Classifies everything as irrelevant.
    pub fn irrelevant() -> Self {
        Self::new(r#"{ "job_application": false, "job_update": false }"#)
    }
}

#[async_trait::async_trait]
impl CompletionService for StubCompletionService {
    async fn complete(&self, _request: &ClassificationRequest) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}
