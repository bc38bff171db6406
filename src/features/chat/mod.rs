//! # Chat Feature
//!
//! Turn-taking chat loop: transcript plus the session state machine that
//! feeds a bounded window of it to the provider.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Split turns into begin/finish so the TUI can await replies off-thread
//! - 1.0.0: Initial release

pub mod session;
pub mod transcript;

pub use session::{ChatSession, SessionState, DEFAULT_HISTORY_WINDOW};
pub use transcript::{Role, Transcript, Turn};
