//! Gemini REST client
//!
//! Calls `generateContent` and the model listing endpoint directly. The API
//! key travels in the `x-goog-api-key` header, and transport errors are
//! stripped of their URL before they are reported.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{GenerationRequest, ModelInfo, TextGenerator, REQUEST_TIMEOUT};
use crate::core::{Provider, SoulError};
use crate::features::chat::{Role, Turn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Preferred Gemini models, best first
pub const GEMINI_MODEL_PRIORITY: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-pro",
    "gemini-pro",
];

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini HTTP API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SoulError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SoulError::generation(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at another endpoint (proxies, regional mirrors)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_model_page(&self, page_token: Option<&str>) -> Result<ListModelsResponse, SoulError> {
        let mut query = vec![("pageSize", "1000")];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                SoulError::generation(format!("Gemini model listing failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| {
                SoulError::generation(format!(
                    "Failed to parse Gemini model list: {}",
                    e.without_url()
                ))
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_GEMINI_MODEL
    }

    fn model_priority(&self) -> &'static [&'static str] {
        GEMINI_MODEL_PRIORITY
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, SoulError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_model_page(page_token.as_deref()).await?;
            models.extend(page.models.into_iter().map(ModelInfo::from));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Gemini reported {} models", models.len());
        Ok(models)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, SoulError> {
        let body = GenerateContentRequest::from_request(request);
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SoulError::generation(format!(
                        "Gemini request timed out after {} seconds",
                        REQUEST_TIMEOUT.as_secs()
                    ))
                } else {
                    SoulError::generation(format!("Gemini API request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                SoulError::generation(format!("Failed to parse Gemini response: {}", e.without_url()))
            })?;

        extract_text_response(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        let system_instruction = if request.system_instruction.trim().is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            })
        };

        GenerateContentRequest {
            system_instruction,
            contents: request.turns.iter().map(Content::from_turn).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl Content {
    fn from_turn(turn: &Turn) -> Self {
        Content {
            role: Some(gemini_role(turn.role())),
            parts: vec![Part {
                text: turn.content().to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Gemini calls the assistant side `model`
fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl From<GeminiModel> for ModelInfo {
    fn from(model: GeminiModel) -> Self {
        ModelInfo {
            name: model.name,
            display_name: model.display_name,
            capabilities: model.supported_generation_methods,
        }
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, SoulError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(SoulError::generation(format!("Gemini blocked the prompt ({reason})")));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| SoulError::generation("Gemini API returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(SoulError::generation(format!(
            "Gemini API returned no text (finish reason: {reason})"
        )));
    }

    Ok(text.trim().to_string())
}

fn map_http_error(status: StatusCode, body: &str) -> SoulError {
    let (status_text, message) = serde_json::from_str::<ErrorWrapper>(body)
        .map(|w| {
            (
                w.error.status.unwrap_or_default(),
                w.error.message.unwrap_or_else(|| body.to_string()),
            )
        })
        .unwrap_or_else(|_| (String::new(), body.to_string()));

    let detail = if status_text.is_empty() {
        format!("HTTP {}: {message}", status.as_u16())
    } else {
        format!("HTTP {} {status_text}: {message}", status.as_u16())
    };

    let unauthorized = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || message.contains("API key not valid")
        || status_text == "PERMISSION_DENIED"
        || status_text == "UNAUTHENTICATED";

    if unauthorized {
        SoulError::auth(detail)
    } else {
        SoulError::generation(detail)
    }
}
