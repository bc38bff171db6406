//! # Diagnostics Feature
//!
//! Checks used by `soul-diagnose` when a deployment cannot talk to its model
//! or its spreadsheet.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Model probe and five-step storage check

pub mod storage;

use log::info;

use crate::core::SoulError;
use crate::features::models::{probe_models, ProbeReport};
use crate::providers::{ModelInfo, TextGenerator};

pub use storage::{check_storage, check_storage_with, StepOutcome, StorageReport, StorageStep};

/// Models the key can see, and the first one that actually answers
#[derive(Debug, Clone)]
pub struct ModelDiagnosis {
    pub listed: Vec<ModelInfo>,
    pub probe: ProbeReport,
}

impl ModelDiagnosis {
    pub fn generation_capable(&self) -> usize {
        self.listed.iter().filter(|m| m.supports_generation()).count()
    }
}

/// List the key's models then probe them. Listing failure is returned as-is;
/// an invalid key shows up here as an auth error.
pub async fn diagnose_models<G>(generator: &G) -> Result<ModelDiagnosis, SoulError>
where
    G: TextGenerator + ?Sized,
{
    let listed = generator.list_models().await?;
    info!(
        "{} lists {} models for this key",
        generator.provider(),
        listed.len()
    );
    let probe = probe_models(generator, &listed).await;
    Ok(ModelDiagnosis { listed, probe })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::ScriptedGenerator;
    use crate::providers::CAPABILITY_GENERATE_CONTENT;

    #[tokio::test]
    async fn test_diagnose_lists_then_probes() {
        let generator = ScriptedGenerator::new().with_models(vec![
            ModelInfo::new("models/embedding-001", ["embedContent"]),
            ModelInfo::new("models/scripted-good", [CAPABILITY_GENERATE_CONTENT]),
        ]);
        let diagnosis = diagnose_models(&generator).await.unwrap();
        assert_eq!(diagnosis.listed.len(), 2);
        assert_eq!(diagnosis.generation_capable(), 1);
        assert_eq!(diagnosis.probe.working_model(), Some("scripted-good"));
    }

    #[tokio::test]
    async fn test_listing_failure_is_returned() {
        let generator =
            ScriptedGenerator::new().with_model_error(SoulError::auth("API key not valid"));
        let err = diagnose_models(&generator).await.unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Auth);
        assert_eq!(generator.request_count(), 0);
    }
}
