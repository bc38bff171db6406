//! Error kinds surfaced to front-ends
//!
//! Every failure the engine reports falls into one of three kinds, and each
//! kind has a fixed recovery policy:
//!
//! | Kind         | Where it comes from                    | Recovery                     |
//! |--------------|----------------------------------------|------------------------------|
//! | `Auth`       | missing/rejected API key or credential | fatal at session start       |
//! | `Generation` | text-generation call                   | inline error, session goes on|
//! | `Storage`    | spreadsheet archive                    | transient notice, no retry   |

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoulError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("storage failed: {0}")]
    Storage(String),
}

/// Tag-only view of [`SoulError`], handy for matching in front-ends and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Generation,
    Storage,
}

impl SoulError {
    pub fn auth(msg: impl Into<String>) -> Self {
        SoulError::Auth(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        SoulError::Generation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        SoulError::Storage(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SoulError::Auth(_) => ErrorKind::Auth,
            SoulError::Generation(_) => ErrorKind::Generation,
            SoulError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Message without the kind prefix, for inline display
    pub fn detail(&self) -> &str {
        match self {
            SoulError::Auth(m) | SoulError::Generation(m) | SoulError::Storage(m) => m,
        }
    }

    /// Whether the session can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SoulError::Auth(_))
    }
}
