//! Environment configuration
//!
//! Everything is read from the process environment (after `.env` has been
//! loaded by the binary). API keys missing from the environment are looked up
//! in the secrets store, the way the hosted deployment ships them.

use anyhow::{anyhow, Result};
use log::warn;
use std::fmt;
use std::path::PathBuf;

use super::{SecretsStore, SoulError};
use crate::features::chat::{ChatSession, DEFAULT_HISTORY_WINDOW};
use crate::features::personas::{PersonaConfig, PromptBuilder, Relationship};

pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_SHEET_NAME: &str = "SOUL_User_Database";
pub const DEFAULT_USER_LABEL: &str = "Guest";

/// Hosted text-generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Provider::Gemini),
            "openai" | "open_ai" => Some(Provider::OpenAi),
            _ => None,
        }
    }

    /// Variables holding this provider's API key, checked in order
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Provider::OpenAi => &["OPENAI_API_KEY"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::OpenAi => f.write_str("openai"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Skips model resolution when set
    pub model_override: Option<String>,
    pub history_window: usize,
    pub reply_language: Option<String>,
    pub max_paragraphs: Option<u32>,
    pub secrets_path: PathBuf,
    pub credentials_path: PathBuf,
    pub sheet_name: String,
    pub sheet_id: Option<String>,
    pub user_label: String,
    pub log_level: String,
    /// Persona used when no form is shown
    pub persona: PersonaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get("SOUL_PROVIDER") {
            Some(raw) => Provider::parse(&raw)
                .ok_or_else(|| anyhow!("SOUL_PROVIDER must be 'gemini' or 'openai', got '{raw}'"))?,
            None => Provider::default(),
        };

        let history_window = match get("SOUL_HISTORY_WINDOW") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| anyhow!("SOUL_HISTORY_WINDOW must be a positive integer: {e}"))?
                .max(1),
            None => DEFAULT_HISTORY_WINDOW,
        };

        let max_paragraphs = get("SOUL_MAX_PARAGRAPHS")
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|e| anyhow!("SOUL_MAX_PARAGRAPHS must be a number: {e}"))
            })
            .transpose()?;

        let secrets_path = PathBuf::from(
            get("SOUL_SECRETS_PATH").unwrap_or_else(|| DEFAULT_SECRETS_PATH.to_string()),
        );

        let api_key = provider
            .api_key_vars()
            .iter()
            .find_map(|&var| get(var))
            .or_else(|| api_key_from_secrets(provider, &secrets_path));

        let defaults = PersonaConfig::default();
        let persona = PersonaConfig::new(
            get("SOUL_PERSONA_NAME").unwrap_or_else(|| defaults.display_name().to_string()),
            get("SOUL_PERSONA_RELATIONSHIP")
                .map(|r| Relationship::parse(&r))
                .unwrap_or_else(|| defaults.relationship().clone()),
        )
        .with_traits(match get("SOUL_PERSONA_TRAITS") {
            Some(csv) => csv.split(',').map(str::to_string).collect::<Vec<_>>(),
            None => defaults.traits().to_vec(),
        })
        .with_speech_sample(
            get("SOUL_PERSONA_SAMPLE").unwrap_or_else(|| defaults.speech_sample().to_string()),
        );

        Ok(Config {
            provider,
            api_key,
            model_override: get("SOUL_MODEL"),
            history_window,
            reply_language: get("SOUL_REPLY_LANGUAGE"),
            max_paragraphs,
            secrets_path,
            credentials_path: PathBuf::from(
                get("SOUL_CREDENTIALS_PATH").unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
            ),
            sheet_name: get("SOUL_SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            sheet_id: get("SOUL_SHEET_ID"),
            user_label: get("SOUL_USER_LABEL").unwrap_or_else(|| DEFAULT_USER_LABEL.to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            persona,
        })
    }

    /// The API key, or the fatal auth error that stops session start
    pub fn require_api_key(&self) -> Result<&str, SoulError> {
        self.api_key.as_deref().ok_or_else(|| {
            SoulError::auth(format!(
                "{} is not set in the environment or in {}",
                self.provider.api_key_vars().join(" / "),
                self.secrets_path.display()
            ))
        })
    }

    /// Hand the OpenAI key to the `openai` crate, which only reads it from
    /// the environment. Must run before the async runtime starts threads.
    pub fn export_provider_env(&self) {
        if self.provider != Provider::OpenAi {
            return;
        }
        if let Some(key) = &self.api_key {
            std::env::set_var("OPENAI_API_KEY", key);
            std::env::set_var("OPENAI_KEY", key);
        }
    }

    /// Persona instruction with the configured reply options applied
    pub fn instruction_for(&self, persona: &PersonaConfig) -> String {
        PromptBuilder::new(persona)
            .with_language(self.reply_language.as_deref())
            .with_max_paragraphs(self.max_paragraphs)
            .build()
    }

    /// Fresh session for `persona` on an already resolved model
    pub fn new_session(&self, persona: PersonaConfig, model: impl Into<String>) -> ChatSession {
        let instruction = self.instruction_for(&persona);
        ChatSession::new(persona, model)
            .with_history_window(self.history_window)
            .with_instruction(instruction)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(provider: Provider, api_key: Option<&str>) -> Self {
        let lookup = |key: &str| match key {
            "SOUL_PROVIDER" => Some(provider.to_string()),
            "SOUL_SECRETS_PATH" => Some("/nonexistent/secrets.toml".to_string()),
            k if provider.api_key_vars().first() == Some(&k) => api_key.map(str::to_string),
            _ => None,
        };
        Self::from_lookup(lookup).expect("test config is valid")
    }
}

fn api_key_from_secrets(provider: Provider, path: &std::path::Path) -> Option<String> {
    match SecretsStore::load_optional(path) {
        Ok(Some(store)) => provider
            .api_key_vars()
            .iter()
            .find_map(|&var| store.get_str(var))
            .map(str::to_string),
        Ok(None) => None,
        Err(e) => {
            warn!("Ignoring secrets store while looking for an API key: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("SOUL_SECRETS_PATH", "/nonexistent/s.toml")])).unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert!(config.api_key.is_none());
        assert_eq!(config.history_window, DEFAULT_HISTORY_WINDOW);
        assert_eq!(config.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        assert_eq!(config.user_label, DEFAULT_USER_LABEL);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.persona, PersonaConfig::default());
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("SOUL_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SOUL_MODEL", "gpt-4o-mini"),
            ("SOUL_HISTORY_WINDOW", "8"),
            ("SOUL_PERSONA_NAME", "Ibu"),
            ("SOUL_PERSONA_RELATIONSHIP", "mother"),
            ("SOUL_PERSONA_TRAITS", "gentle, humorous"),
            ("SOUL_SHEET_ID", "abc123"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.model_override.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.history_window, 8);
        assert_eq!(config.persona.display_name(), "Ibu");
        assert_eq!(config.persona.relationship(), &Relationship::Mother);
        assert_eq!(config.persona.traits(), &["gentle", "humorous"]);
        assert_eq!(config.sheet_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("SOUL_PROVIDER", "llama")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("SOUL_HISTORY_WINDOW", "five")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("SOUL_MAX_PARAGRAPHS", "-1")])).is_err());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("SOUL_SECRETS_PATH", "/nonexistent/s.toml"),
            ("GOOGLE_API_KEY", "   "),
            ("SOUL_MODEL", ""),
        ]))
        .unwrap();
        assert!(config.api_key.is_none());
        assert!(config.model_override.is_none());
    }

    #[test]
    fn test_missing_key_is_auth_error() {
        let config = Config::for_tests(Provider::Gemini, None);
        let err = config.require_api_key().unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Auth);
        assert!(err.detail().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_api_key_from_secrets_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GEMINI_API_KEY = \"AIza-from-secrets\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = Config::from_lookup(lookup_from(&[("SOUL_SECRETS_PATH", path.as_str())])).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "AIza-from-secrets");

        let env_wins = Config::from_lookup(lookup_from(&[
            ("SOUL_SECRETS_PATH", path.as_str()),
            ("GOOGLE_API_KEY", "AIza-from-env"),
        ]))
        .unwrap();
        assert_eq!(env_wins.require_api_key().unwrap(), "AIza-from-env");
    }

    #[test]
    fn test_export_provider_env_for_openai() {
        Config::for_tests(Provider::Gemini, Some("AIza-not-exported")).export_provider_env();
        assert_ne!(std::env::var("OPENAI_KEY").ok().as_deref(), Some("AIza-not-exported"));

        Config::for_tests(Provider::OpenAi, Some("sk-exported")).export_provider_env();
        assert_eq!(std::env::var("OPENAI_API_KEY").unwrap(), "sk-exported");
        assert_eq!(std::env::var("OPENAI_KEY").unwrap(), "sk-exported");
    }

    #[test]
    fn test_new_session_applies_options() {
        let mut config = Config::for_tests(Provider::Gemini, Some("key"));
        config.history_window = 3;
        config.reply_language = Some("Indonesian".to_string());
        let session = config.new_session(PersonaConfig::default(), "gemini-2.5-flash");
        assert_eq!(session.history_window(), 3);
        assert!(session.instruction().contains("Always reply in Indonesian."));
        assert_eq!(session.model(), "gemini-2.5-flash");
    }
}
