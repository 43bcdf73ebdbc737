//! Chat-completions generation service.
//!
//! Speaks the OpenAI-compatible `POST /v1/chat/completions` protocol. The
//! API key is read from the environment variable named in the config, so
//! it never lands in the config file.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use hearth_core::config::GenerationConfig;

use super::{GenerationOutput, GenerationRequest, GenerationService};
use crate::error::GenerationError;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct HttpGenerationService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpGenerationService {
    pub fn new(config: &GenerationConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_body(&self, request: &GenerationRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "system", "content": system_prompt(request)},
                {"role": "user", "content": user_prompt(request)},
            ],
        })
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            GenerationError::NotConfigured(format!("{} is not set", self.api_key_env))
        })?;

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(GenerationError::Status { status, body });
        }

        parse_chat_body(&body)
    }
}

/// Pull the first choice's content out of a chat-completions body.
fn parse_chat_body(body: &str) -> Result<GenerationOutput, GenerationError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|_| GenerationError::Unparseable {
            raw: body.to_string(),
        })?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(GenerationOutput::Text)
        .ok_or_else(|| GenerationError::Unparseable {
            raw: body.to_string(),
        })
}

fn system_prompt(request: &GenerationRequest) -> String {
    let mut prompt = request.brief.clone();
    prompt.push_str("\n\nReply with the JSON object only, without commentary.");
    prompt.push_str(&format!("\nWrite every text value in language \"{}\".", request.language));
    prompt
}

fn user_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::from("Preferences:\n");
    for entry in &request.answers {
        prompt.push_str(&format!("- {}: {}\n", entry.field, entry.value));
    }
    if let Some(hint) = &request.format_hint {
        prompt.push_str(&format!("\nPresentation: {}\n", hint));
    }
    prompt
}
