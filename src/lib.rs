//! SOUL: a persona chat client that answers as a digital memory of someone
//! the user has lost, with an optional spreadsheet archive of what was said.

// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Providers layer - hosted text-generation backends
pub mod providers;

// TUI layer - terminal user interface (optional feature)
#[cfg(feature = "tui")]
pub mod tui;

pub use crate::core::{Config, Provider, SoulError};
pub use crate::features::{ChatSession, MemoryArchive, PersonaConfig, Relationship};
pub use crate::providers::{build_generator, TextGenerator};
