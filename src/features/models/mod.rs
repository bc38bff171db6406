//! # Model Resolution Feature
//!
//! Picks the model identifier a session uses, and probes which models a key
//! may actually call.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Priority-list resolution with fallback, plus the diagnostic probe

pub mod probe;
pub mod resolver;

pub use probe::{probe_models, probe_order, ProbeAttempt, ProbeReport};
pub use resolver::{generation_model_ids, resolve_model, resolve_session_model};
