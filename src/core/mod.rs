//! # Core Module
//!
//! Configuration and the error kinds shared by every layer of the engine.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add secrets store shared by config and the archive credentials
//! - 1.1.0: Replace display-string errors with the closed `SoulError` enum
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod secrets;

// Re-export commonly used items
pub use config::{Config, Provider};
pub use error::{ErrorKind, SoulError};
pub use secrets::SecretsStore;
