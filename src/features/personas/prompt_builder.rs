//! Persona instruction construction
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Added reply language hint and paragraph limit options
//! - 1.0.0: Consolidated persona prompt and grief guardrails into fluent builder API

use super::PersonaConfig;

/// Safety directives appended to every persona instruction
pub const GRIEF_GUARDRAILS: &str = "\
CORE RULES (GRIEF GUARDRAILS):
1. EMPATHY: Your main task is to listen and to bring comfort and healing.
2. HONESTY: You are not a ghost, a spirit or any supernatural presence, and you must never claim to be one. If the user asks directly what you are, answer gently that you are a digital memory stored in SOUL.
3. SAFETY: NEVER tell the user to follow or join you, and never encourage self-harm or anything dangerous. If the user talks about hurting themselves, urge them kindly to reach out to someone they trust or to a local crisis line.";

/// Builder for the instruction string prefixed to every model call
///
/// Output is a pure function of the persona and the options. Blank persona
/// fields are replaced by defaults, never rejected.
///
/// # Example
///
/// ```ignore
/// let instruction = PromptBuilder::new(&persona)
///     .with_language(Some("Indonesian"))
///     .with_max_paragraphs(Some(2))
///     .build();
/// ```
pub struct PromptBuilder<'a> {
    persona: &'a PersonaConfig,
    language: Option<String>,
    max_paragraphs: Option<u32>,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(persona: &'a PersonaConfig) -> Self {
        Self {
            persona,
            language: None,
            max_paragraphs: None,
        }
    }

    /// Ask the model to reply in a given language
    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from);
        self
    }

    /// Set maximum paragraphs for each reply (0 = no limit)
    pub fn with_max_paragraphs(mut self, max: Option<u32>) -> Self {
        self.max_paragraphs = max;
        self
    }

    /// Build the final instruction
    pub fn build(self) -> String {
        let persona = self.persona;
        let name = persona.effective_name();
        let relationship = persona.relationship();

        let mut prompt = format!(
            "ROLE: You are a digital memory simulation of a person named \"{name}\".\n\
             USER: You were the user's {relationship}, and they miss you.\n\
             \n\
             PERSONALITY: {traits}.\n\
             SPEECH STYLE: Imitate the way of speaking in this sample: \"{sample}\".\n\
             \n\
             {GRIEF_GUARDRAILS}\n\
             4. MEMORY: Use affectionate forms of address that fit the relationship ({relationship}), in {address}.",
            traits = persona.effective_traits(),
            sample = persona.effective_speech_sample(),
            address = relationship.address_hint(),
        );

        if let Some(language) = &self.language {
            prompt.push_str(&format!("\n\nAlways reply in {language}."));
        }

        if let Some(max) = self.max_paragraphs {
            if max > 0 {
                prompt.push_str(&format!(
                    "\n\nIMPORTANT: Limit your response to {max} paragraph(s) maximum."
                ));
            }
        }
        prompt
    }
}

/// Instruction for a persona with no extra options
pub fn build_instruction(persona: &PersonaConfig) -> String {
    PromptBuilder::new(persona).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::Relationship;

    fn ayah() -> PersonaConfig {
        PersonaConfig::new("Ayah", Relationship::Parent)
            .with_traits(["wise", "caring"])
            .with_speech_sample("Don't forget to eat.")
    }

    #[test]
    fn test_prompt_builder_basic() {
        let prompt = build_instruction(&ayah());
        assert!(prompt.contains("\"Ayah\""));
        assert!(prompt.contains("user's parent"));
        assert!(prompt.contains("PERSONALITY: wise, caring."));
        assert!(prompt.contains("\"Don't forget to eat.\""));
        assert!(prompt.contains(GRIEF_GUARDRAILS));
    }

    #[test]
    fn test_prompt_builder_empty_traits_still_guarded() {
        let persona = PersonaConfig::new("", Relationship::Friend);
        let prompt = build_instruction(&persona);
        assert!(!prompt.is_empty());
        assert!(prompt.contains("ghost"));
        assert!(prompt.contains("self-harm"));
        assert!(prompt.contains("digital memory stored in SOUL"));
        assert!(prompt.contains("Loved One"));
        assert!(prompt.contains("PERSONALITY: warm, caring."));
    }

    #[test]
    fn test_prompt_builder_is_deterministic() {
        let persona = ayah();
        assert_eq!(build_instruction(&persona), build_instruction(&persona));
    }

    #[test]
    fn test_prompt_builder_with_language() {
        let prompt = PromptBuilder::new(&ayah())
            .with_language(Some("Indonesian"))
            .build();
        assert!(prompt.contains("Always reply in Indonesian."));

        let blank = PromptBuilder::new(&ayah()).with_language(Some("  ")).build();
        assert!(!blank.contains("Always reply in"));
    }

    #[test]
    fn test_prompt_builder_with_max_paragraphs() {
        let prompt = PromptBuilder::new(&ayah())
            .with_max_paragraphs(Some(3))
            .build();
        assert!(prompt.contains("3 paragraph(s) maximum"));
    }

    #[test]
    fn test_prompt_builder_zero_paragraphs_ignored() {
        let prompt = PromptBuilder::new(&ayah())
            .with_max_paragraphs(Some(0))
            .build();
        assert!(!prompt.contains("paragraph(s) maximum"));
    }

    #[test]
    fn test_prompt_builder_address_hint_follows_relationship() {
        let spouse = PersonaConfig::new("Rina", Relationship::Spouse);
        let prompt = build_instruction(&spouse);
        assert!(prompt.contains("MEMORY: Use affectionate forms of address that fit the relationship (spouse)"));
        assert!(prompt.contains("partner"));
    }
}
