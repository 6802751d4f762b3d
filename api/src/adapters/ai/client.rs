//! OpenAI-compatible chat completion client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AiClient, AiCompletion, ChatMessage};
use crate::error::AiError;

/// Client for `POST {base_url}/chat/completions`
pub struct OpenAiCompatibleClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: i32,
    #[serde(default)]
    completion_tokens: i32,
}

impl CompletionResponse {
    fn into_completion(self) -> Result<AiCompletion, AiError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::InvalidResponse("no choices returned".to_string()))?;
        let usage = self.usage.unwrap_or_default();

        Ok(AiCompletion {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}

#[async_trait]
impl AiClient for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<AiCompletion, AiError> {
        let response = self
            .http
            .post(self.api_url("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                temperature: 0.2,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: CompletionResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
            body.into_completion()
        } else if status.as_u16() == 429 {
            Err(AiError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(AiError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Used when no AI API key is configured
pub struct DisabledAiClient;

#[async_trait]
impl AiClient for DisabledAiClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<AiCompletion, AiError> {
        Err(AiError::Disabled)
    }
}
