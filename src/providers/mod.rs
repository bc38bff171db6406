//! # Text-generation providers
//!
//! Hosted model backends behind one trait. A session only ever talks to a
//! `dyn TextGenerator`; the concrete client is chosen from [`Config`] once at
//! startup.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Added OpenAI chat completions alongside Gemini
//! - 1.0.0: Gemini REST client

pub mod gemini;
pub mod openai_chat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Config, Provider, SoulError};
use crate::features::chat::Turn;

pub use gemini::GeminiClient;
pub use openai_chat::OpenAiClient;

/// Upper bound for a single provider call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Capability tag Gemini uses for text generation
pub const CAPABILITY_GENERATE_CONTENT: &str = "generateContent";
/// Capability tag assigned to OpenAI chat models
pub const CAPABILITY_CHAT_COMPLETIONS: &str = "chat.completions";

/// One outbound generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    /// Recent turns, oldest first, ending in the newest user turn
    pub turns: Vec<Turn>,
}

/// A model identifier as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
    pub capabilities: Vec<String>,
}

impl ModelInfo {
    pub fn new<I, S>(name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModelInfo {
            name: name.into(),
            display_name: None,
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    /// Identifier usable in a request (`models/` prefix stripped)
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn supports_generation(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| c == CAPABILITY_GENERATE_CONTENT || c == CAPABILITY_CHAT_COMPLETIONS)
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    /// Model used when resolution finds nothing better
    fn default_model(&self) -> &'static str;

    /// Preferred models, best first
    fn model_priority(&self) -> &'static [&'static str];

    async fn list_models(&self) -> Result<Vec<ModelInfo>, SoulError>;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, SoulError>;
}

/// Build the configured provider client. A missing API key is an auth error.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, SoulError> {
    let api_key = config.require_api_key()?;
    match config.provider {
        Provider::Gemini => Ok(Arc::new(GeminiClient::new(api_key)?)),
        Provider::OpenAi => Ok(Arc::new(OpenAiClient::new(api_key)?)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted generator for exercising sessions without a network

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, SoulError>>>,
        models: Result<Vec<ModelInfo>, SoulError>,
        failing_models: Vec<String>,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            ScriptedGenerator {
                replies: Mutex::new(VecDeque::new()),
                models: Ok(Vec::new()),
                failing_models: Vec::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn reply(self, text: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(text.to_string()));
            self
        }

        pub fn fail(self, err: SoulError) -> Self {
            self.replies.lock().unwrap().push_back(Err(err));
            self
        }

        pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
            self.models = Ok(models);
            self
        }

        pub fn with_model_error(mut self, err: SoulError) -> Self {
            self.models = Err(err);
            self
        }

        /// Requests for these models fail regardless of the script
        pub fn failing_for(mut self, models: &[&str]) -> Self {
            self.failing_models = models.iter().map(|m| m.to_string()).collect();
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<GenerationRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        fn default_model(&self) -> &'static str {
            "scripted-default"
        }

        fn model_priority(&self) -> &'static [&'static str] {
            &["scripted-best", "scripted-good"]
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, SoulError> {
            self.models.clone()
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, SoulError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.failing_models.iter().any(|m| *m == request.model) {
                return Err(SoulError::generation(format!("{} is not available", request.model)));
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("pong".to_string()))
        }
    }
}
