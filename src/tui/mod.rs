//! # TUI Module
//!
//! Terminal chat client: talk with the persona, edit it, save lines to the
//! archive.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true (`tui` cargo feature)
//!
//! ## Changelog
//! - 2.0.0: Provider calls moved onto tokio tasks; busy spinner while awaiting replies
//! - 1.0.0: Initial chat and persona screens

pub mod app;
pub mod event;
pub mod ui;

pub use app::{App, InputMode, PersonaField, PersonaForm, Screen};
pub use event::{Event, EventHandler};
