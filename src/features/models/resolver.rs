//! Model resolution
//!
//! First-match selection over the provider's model list: walk the fixed
//! priority list, take the first entry the provider offers, else the first
//! capable model it reports, else the provider default.

use log::{info, warn};

use crate::core::SoulError;
use crate::providers::{ModelInfo, TextGenerator};

/// Capable model ids, `models/` prefix stripped, in reported order
pub fn generation_model_ids(candidates: &[ModelInfo]) -> Vec<&str> {
    candidates
        .iter()
        .filter(|m| m.supports_generation())
        .map(ModelInfo::id)
        .collect()
}

pub fn resolve_model(candidates: &[ModelInfo], priority: &[&str], default: &str) -> String {
    let available = generation_model_ids(candidates);

    priority
        .iter()
        .find(|wanted| available.contains(*wanted))
        .map(|m| m.to_string())
        .or_else(|| available.first().map(|m| m.to_string()))
        .unwrap_or_else(|| default.to_string())
}

/// Pick the model for a new session. Runs once per session; an explicit
/// override skips the provider round-trip. A rejected key stops session
/// start; any other listing failure falls back to the provider default.
pub async fn resolve_session_model<G>(
    generator: &G,
    override_model: Option<&str>,
) -> Result<String, SoulError>
where
    G: TextGenerator + ?Sized,
{
    if let Some(model) = override_model.map(str::trim).filter(|m| !m.is_empty()) {
        info!("Using configured model override: {model}");
        return Ok(model.to_string());
    }

    match generator.list_models().await {
        Ok(models) => {
            let model = resolve_model(&models, generator.model_priority(), generator.default_model());
            info!(
                "Resolved model {model} from {} candidates ({})",
                models.len(),
                generator.provider()
            );
            Ok(model)
        }
        Err(e) if !e.is_recoverable() => Err(e),
        Err(e) => {
            warn!(
                "Could not list {} models, falling back to {}: {e}",
                generator.provider(),
                generator.default_model()
            );
            Ok(generator.default_model().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::providers::testing::ScriptedGenerator;
    use crate::providers::CAPABILITY_GENERATE_CONTENT;

    const PRIORITY: &[&str] = &["gemini-2.5-flash", "gemini-1.5-flash", "gemini-pro"];

    fn capable(name: &str) -> ModelInfo {
        ModelInfo::new(name, [CAPABILITY_GENERATE_CONTENT])
    }

    #[test]
    fn test_priority_order_wins_over_list_order() {
        let candidates = vec![capable("models/gemini-pro"), capable("models/gemini-1.5-flash")];
        assert_eq!(resolve_model(&candidates, PRIORITY, "fallback"), "gemini-1.5-flash");
    }

    #[test]
    fn test_incapable_models_are_skipped() {
        let candidates = vec![
            ModelInfo::new("models/gemini-2.5-flash", ["countTokens"]),
            capable("models/gemini-pro"),
        ];
        assert_eq!(resolve_model(&candidates, PRIORITY, "fallback"), "gemini-pro");
    }

    #[test]
    fn test_no_overlap_takes_first_available() {
        let candidates = vec![
            ModelInfo::new("models/embedding-001", ["embedContent"]),
            capable("models/learnlm-2.0"),
            capable("models/gemma-3"),
        ];
        assert_eq!(resolve_model(&candidates, PRIORITY, "fallback"), "learnlm-2.0");
    }

    #[test]
    fn test_empty_list_uses_default() {
        assert_eq!(resolve_model(&[], PRIORITY, "fallback"), "fallback");
    }

    #[tokio::test]
    async fn test_resolve_session_model_override() {
        let generator = ScriptedGenerator::new().with_models(vec![capable("scripted-best")]);
        assert_eq!(resolve_session_model(&generator, Some(" custom ")).await.unwrap(), "custom");
        assert_eq!(resolve_session_model(&generator, Some("")).await.unwrap(), "scripted-best");
    }

    #[tokio::test]
    async fn test_rejected_key_stops_session_start() {
        let generator = ScriptedGenerator::new().with_model_error(SoulError::auth(
            "HTTP 400 INVALID_ARGUMENT: API key not valid",
        ));
        let err = resolve_session_model(&generator, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_listing_outage_falls_back_to_default() {
        let generator = ScriptedGenerator::new()
            .with_model_error(SoulError::generation("HTTP 503 UNAVAILABLE: try later"));
        assert_eq!(resolve_session_model(&generator, None).await.unwrap(), "scripted-default");
    }

    #[tokio::test]
    async fn test_resolve_session_model_from_list() {
        let generator = ScriptedGenerator::new()
            .with_models(vec![capable("models/other"), capable("models/scripted-good")]);
        assert_eq!(resolve_session_model(&generator, None).await.unwrap(), "scripted-good");
    }
}
