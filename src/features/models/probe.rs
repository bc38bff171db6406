//! Model probe
//!
//! Diagnostic walk over the models a key can see: priority matches first,
//! then everything else that supports generation, pinging each until one
//! answers.

use log::{debug, info};

use super::resolver::generation_model_ids;
use crate::core::SoulError;
use crate::features::chat::Turn;
use crate::providers::{GenerationRequest, ModelInfo, TextGenerator};

const PING_INSTRUCTION: &str = "Reply with a single word.";
const PING_MESSAGE: &str = "Hello";

#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub model: String,
    pub outcome: Result<String, SoulError>,
}

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub attempts: Vec<ProbeAttempt>,
}

impl ProbeReport {
    /// First model that answered
    pub fn working_model(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.outcome.is_ok())
            .map(|a| a.model.as_str())
    }
}

/// Candidates in the order the probe tries them
pub fn probe_order(candidates: &[ModelInfo], priority: &[&str]) -> Vec<String> {
    let available = generation_model_ids(candidates);
    let mut order: Vec<String> = priority
        .iter()
        .filter(|p| available.contains(*p))
        .map(|p| p.to_string())
        .collect();

    for id in available {
        if !order.iter().any(|o| o == id) {
            order.push(id.to_string());
        }
    }
    order
}

/// Ping models in [`probe_order`] until one succeeds
pub async fn probe_models<G>(generator: &G, candidates: &[ModelInfo]) -> ProbeReport
where
    G: TextGenerator + ?Sized,
{
    let mut report = ProbeReport::default();

    for model in probe_order(candidates, generator.model_priority()) {
        debug!("Probing model {model}");
        let request = GenerationRequest {
            model: model.clone(),
            system_instruction: PING_INSTRUCTION.to_string(),
            turns: vec![Turn::user(PING_MESSAGE)],
        };
        let outcome = generator.generate(&request).await;
        let succeeded = outcome.is_ok();
        report.attempts.push(ProbeAttempt { model, outcome });
        if succeeded {
            break;
        }
    }

    match report.working_model() {
        Some(model) => info!("Probe found a working model: {model}"),
        None => info!("Probe found no working model after {} attempts", report.attempts.len()),
    }
    report
}
