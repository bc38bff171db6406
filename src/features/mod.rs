//! # Features
//!
//! Each submodule is one self-contained capability of the engine.

pub mod archive;
pub mod chat;
pub mod diagnostics;
pub mod models;
pub mod personas;

pub use archive::MemoryArchive;
pub use chat::{ChatSession, Role, SessionState, Transcript, Turn};
pub use models::{probe_models, resolve_model, resolve_session_model};
pub use personas::{build_instruction, PersonaConfig, PromptBuilder, Relationship};
