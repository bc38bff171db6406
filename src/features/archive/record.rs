use chrono::{DateTime, Utc};

use crate::features::chat::ChatSession;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One archived line: when, who, which persona, what was said last
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRow {
    pub timestamp: DateTime<Utc>,
    pub user_label: String,
    pub persona_name: String,
    pub relationship: String,
    pub message: String,
}

impl ArchiveRow {
    /// Row for the session's latest turn, if there is one
    pub fn from_session(
        session: &ChatSession,
        user_label: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        let last = session.last_message()?;
        let persona = session.persona();
        Some(ArchiveRow {
            timestamp,
            user_label: user_label.to_string(),
            persona_name: persona.effective_name().to_string(),
            relationship: persona.relationship().label().to_string(),
            message: last.content().to_string(),
        })
    }

    /// Cells in column order
    pub fn to_values(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.user_label.clone(),
            self.persona_name.clone(),
            self.relationship.clone(),
            self.message.clone(),
        ]
    }
}
