//! # Personas Feature
//!
//! Persona configuration and the instruction string built from it.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Shared form choices for the TUI and REPL
//! - 1.0.0: Initial release

pub mod choices;
pub mod persona;
pub mod prompt_builder;

pub use persona::{PersonaConfig, Relationship};
pub use prompt_builder::{build_instruction, PromptBuilder, GRIEF_GUARDRAILS};
