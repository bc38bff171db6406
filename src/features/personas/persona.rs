//! # Feature: Persona Configuration
//!
//! The simulated identity a session speaks as: display name, relationship to
//! the user, personality traits and a speech-style sample. Supplied once from
//! the form (or configuration) and never mutated while a session is live.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added sibling relationship and free-form `Other` labels
//! - 1.0.0: Initial release with parent, spouse, friend and child relationships

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DISPLAY_NAME: &str = "Loved One";
pub const DEFAULT_TRAITS: &[&str] = &["warm", "caring"];
pub const DEFAULT_SPEECH_SAMPLE: &str =
    "Speak gently and naturally, the way someone close to the user would.";

/// Who the remembered person was to the user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    #[default]
    Parent,
    Father,
    Mother,
    Spouse,
    Friend,
    Child,
    Sibling,
    Other(String),
}

impl Relationship {
    /// Lenient parse; blank input falls back to the default
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Relationship::default(),
            "parent" => Relationship::Parent,
            "father" | "dad" => Relationship::Father,
            "mother" | "mom" | "mum" => Relationship::Mother,
            "spouse" | "partner" | "husband" | "wife" => Relationship::Spouse,
            "friend" | "best friend" => Relationship::Friend,
            "child" | "son" | "daughter" => Relationship::Child,
            "sibling" | "brother" | "sister" => Relationship::Sibling,
            _ => Relationship::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Relationship::Parent => "parent",
            Relationship::Father => "father",
            Relationship::Mother => "mother",
            Relationship::Spouse => "spouse",
            Relationship::Friend => "friend",
            Relationship::Child => "child",
            Relationship::Sibling => "sibling",
            Relationship::Other(label) => label,
        }
    }

    /// How the persona should address the user
    pub fn address_hint(&self) -> &'static str {
        match self {
            Relationship::Parent | Relationship::Father | Relationship::Mother => {
                "the tender, proud way a parent speaks to their child"
            }
            Relationship::Spouse => "the intimate, familiar way a partner speaks to their beloved",
            Relationship::Friend => "the easy, loyal way a close friend speaks",
            Relationship::Child => "the loving way a child speaks to their parent",
            Relationship::Sibling => "the teasing but devoted way a sibling speaks",
            Relationship::Other(_) => "a warm, familiar way that fits your shared history",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Relationship {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Relationship::parse(s))
    }
}

/// User-entered description of the simulated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaConfig {
    display_name: String,
    relationship: Relationship,
    traits: Vec<String>,
    speech_sample: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        PersonaConfig::new("Ayah", Relationship::Parent)
            .with_traits(["wise", "caring"])
            .with_speech_sample(
                "Don't forget to eat, okay? I'm so proud of you. And don't skip your prayers.",
            )
    }
}

impl PersonaConfig {
    pub fn new(display_name: impl Into<String>, relationship: Relationship) -> Self {
        PersonaConfig {
            display_name: display_name.into().trim().to_string(),
            relationship,
            traits: Vec::new(),
            speech_sample: String::new(),
        }
    }

    /// Replace the trait list. Blank entries are dropped and duplicates
    /// (case-insensitive) keep their first position.
    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.traits.clear();
        for raw in traits {
            let t = raw.as_ref().trim();
            if t.is_empty() {
                continue;
            }
            if !self.traits.iter().any(|existing| existing.eq_ignore_ascii_case(t)) {
                self.traits.push(t.to_string());
            }
        }
        self
    }

    /// Comma separated form of [`with_traits`](Self::with_traits)
    pub fn with_trait_list(self, csv: &str) -> Self {
        self.with_traits(csv.split(','))
    }

    pub fn with_speech_sample(mut self, sample: impl Into<String>) -> Self {
        self.speech_sample = sample.into().trim().to_string();
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn relationship(&self) -> &Relationship {
        &self.relationship
    }

    pub fn traits(&self) -> &[String] {
        &self.traits
    }

    pub fn speech_sample(&self) -> &str {
        &self.speech_sample
    }

    /// Display name, or the default when blank
    pub fn effective_name(&self) -> &str {
        if self.display_name.is_empty() {
            DEFAULT_DISPLAY_NAME
        } else {
            &self.display_name
        }
    }

    /// Comma-joined traits, or the defaults when none were given
    pub fn effective_traits(&self) -> String {
        if self.traits.is_empty() {
            DEFAULT_TRAITS.join(", ")
        } else {
            self.traits.join(", ")
        }
    }

    pub fn effective_speech_sample(&self) -> &str {
        if self.speech_sample.is_empty() {
            DEFAULT_SPEECH_SAMPLE
        } else {
            &self.speech_sample
        }
    }
}
