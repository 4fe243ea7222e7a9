use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collaborators::ConversationalAi;
use crate::error::{AssistantError, Result};
use crate::utils::config::AiSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for an OpenAI-compatible chat completions endpoint.
pub struct LlmClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient {
    pub fn new(settings: &AiSettings) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }
}

impl ConversationalAi for LlmClient {
    fn ask(&self, query: &str) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(AssistantError::collaborator(
                "assistant AI",
                "no API key configured",
            ));
        }

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: query,
            }],
            temperature: 0.7,
            max_tokens: 1024,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AssistantError::collaborator("assistant AI", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            log::error!("chat completion failed with {}: {}", status, detail);
            return Err(AssistantError::collaborator(
                "assistant AI",
                format!("request failed with status {}", status),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AssistantError::collaborator("assistant AI", e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AssistantError::collaborator("assistant AI", "empty completion"))
    }
}
