//! OpenAI chat completions backend
//!
//! Generation goes through the `openai` crate; the model listing endpoint is
//! not covered by the crate, so it is fetched directly.

use async_trait::async_trait;
use log::debug;
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::timeout;

use super::{GenerationRequest, ModelInfo, TextGenerator, CAPABILITY_CHAT_COMPLETIONS, REQUEST_TIMEOUT};
use crate::core::{Provider, SoulError};
use crate::features::chat::Role;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Preferred OpenAI models, best first
pub const OPENAI_MODEL_PRIORITY: &[&str] = &[
    "gpt-4o-mini",
    "gpt-4o",
    "gpt-4.1-mini",
    "gpt-4.1",
    "gpt-3.5-turbo",
];

const MODELS_URL: &str = "https://api.openai.com/v1/models";

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SoulError> {
        // Generation credentials come from the environment, exported at
        // startup by `Config::export_provider_env`; this key is for listing
        let api_key = api_key.into();

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SoulError::generation(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_OPENAI_MODEL
    }

    fn model_priority(&self) -> &'static [&'static str] {
        OPENAI_MODEL_PRIORITY
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, SoulError> {
        let response = self
            .client
            .get(MODELS_URL)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SoulError::generation(format!("OpenAI model listing failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: ModelList = response
            .json()
            .await
            .map_err(|e| SoulError::generation(format!("Failed to parse OpenAI model list: {e}")))?;

        debug!("OpenAI reported {} models", parsed.data.len());
        Ok(parsed.data.into_iter().map(|m| model_info(m.id)).collect())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, SoulError> {
        let messages = build_messages(request);
        debug!("Sending {} messages to OpenAI", messages.len());

        let completion = timeout(
            REQUEST_TIMEOUT,
            ChatCompletion::builder(&request.model, messages).create(),
        )
        .await
        .map_err(|_| {
            SoulError::generation(format!(
                "OpenAI request timed out after {} seconds",
                REQUEST_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| classify_api_error(&e.to_string()))?;

        let response = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
            .trim()
            .to_string();

        if response.is_empty() {
            return Err(SoulError::generation("OpenAI returned an empty reply"));
        }
        Ok(response)
    }
}

fn build_messages(request: &GenerationRequest) -> Vec<ChatCompletionMessage> {
    let mut messages = vec![ChatCompletionMessage {
        role: ChatCompletionMessageRole::System,
        content: Some(request.system_instruction.clone()),
        name: None,
        function_call: None,
        tool_call_id: None,
        tool_calls: None,
    }];

    for turn in &request.turns {
        let role = match turn.role() {
            Role::User => ChatCompletionMessageRole::User,
            Role::Assistant => ChatCompletionMessageRole::Assistant,
        };
        messages.push(ChatCompletionMessage {
            role,
            content: Some(turn.content().to_string()),
            name: None,
            function_call: None,
            tool_call_id: None,
            tool_calls: None,
        });
    }

    messages
}

/// Tag chat-capable ids; the listing endpoint carries no capability data
fn model_info(id: String) -> ModelInfo {
    let chat = (id.starts_with("gpt-")
        || id.starts_with("chatgpt-")
        || id.starts_with("o1")
        || id.starts_with("o3")
        || id.starts_with("o4"))
        && !["instruct", "realtime", "audio", "transcribe", "tts", "image", "search"]
            .iter()
            .any(|marker| id.contains(marker));

    let capabilities = if chat {
        vec![CAPABILITY_CHAT_COMPLETIONS.to_string()]
    } else {
        Vec::new()
    };

    ModelInfo {
        name: id,
        display_name: None,
        capabilities,
    }
}

fn classify_api_error(message: &str) -> SoulError {
    let lower = message.to_lowercase();
    if lower.contains("api key") || lower.contains("unauthorized") || lower.contains("invalid_api_key") {
        SoulError::auth(message.to_string())
    } else {
        SoulError::generation(message.to_string())
    }
}

fn map_http_error(status: StatusCode, body: &str) -> SoulError {
    let detail = format!("HTTP {}: {}", status.as_u16(), body.trim());
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        SoulError::auth(detail)
    } else {
        SoulError::generation(detail)
    }
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}
