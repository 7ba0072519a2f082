use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ChatBackend, CompletionRequest};
use crate::conversation::Message;
use crate::core::config::BackendConfig;
use crate::error::ModelError;

/// OpenAI compatible chat completions endpoint using structured outputs.
pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_env: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    r#type: &'static str,
    json_schema: JsonSchema<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchema<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl OpenAiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ModelError> {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn build_request<'a>(request: &'a CompletionRequest<'a>) -> ChatRequest<'a> {
        ChatRequest {
            model: request.model,
            messages: request.messages,
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchema {
                    name: request.shape.name,
                    strict: true,
                    schema: &request.shape.schema,
                },
            },
        }
    }

    fn content_of(response: ChatResponse) -> Result<String, ModelError> {
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ModelError::EmptyResponse)?;

        if let Some(refusal) = message.refusal {
            return Err(ModelError::Coercion {
                shape: "response",
                reason: format!("model refused: {refusal}"),
            });
        }

        message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

impl ChatBackend for OpenAiBackend {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::MissingApiKey(self.api_key_env.clone()))?;

        let body = Self::build_request(request);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json()?;
        debug!(choices = parsed.choices.len(), "chat completion received");
        Self::content_of(parsed)
    }
}
