//! # Memory Archive Feature
//!
//! Appends the latest chat line to a shared Google Sheet so families can keep
//! what was said. Credentials come from an ordered chain of sources.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true (nothing is archived unless the user saves)
//!
//! ## Changelog
//! - 1.1.0: Ordered credential chain replaces the hard-coded key file
//! - 1.0.0: Initial sheet append

pub mod credentials;
pub mod record;
pub mod sheets;

use chrono::Utc;
use log::{info, warn};

use crate::core::{Config, SoulError};
use crate::features::chat::ChatSession;

pub use credentials::{
    CredentialChain, CredentialProvider, KeyFileProvider, SecretsStoreProvider, ServiceAccountKey,
};
pub use record::ArchiveRow;
pub use sheets::SheetsClient;

/// Where and how rows are archived
pub struct MemoryArchive {
    chain: CredentialChain,
    sheet_name: String,
    sheet_id: Option<String>,
    user_label: String,
}

impl MemoryArchive {
    pub fn new(chain: CredentialChain, sheet_name: impl Into<String>) -> Self {
        Self {
            chain,
            sheet_name: sheet_name.into(),
            sheet_id: None,
            user_label: crate::core::config::DEFAULT_USER_LABEL.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let archive = Self::new(
            CredentialChain::standard(&config.secrets_path, &config.credentials_path),
            config.sheet_name.clone(),
        )
        .with_user_label(config.user_label.clone());
        match &config.sheet_id {
            Some(id) => archive.with_sheet_id(id.clone()),
            None => archive,
        }
    }

    pub fn with_sheet_id(mut self, id: impl Into<String>) -> Self {
        self.sheet_id = Some(id.into());
        self
    }

    pub fn with_user_label(mut self, label: impl Into<String>) -> Self {
        self.user_label = label.into();
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn credential_chain(&self) -> &CredentialChain {
        &self.chain
    }

    /// Log in and locate the target spreadsheet
    pub async fn connect(&self) -> Result<(SheetsClient, String), SoulError> {
        let key = self.chain.resolve()?;
        let client = SheetsClient::login(&key).await?;
        let id = match &self.sheet_id {
            Some(id) => id.clone(),
            None => client.find_spreadsheet(&self.sheet_name).await?,
        };
        Ok((client, id))
    }

    pub async fn append_row(&self, row: &ArchiveRow) -> Result<(), SoulError> {
        let (client, id) = self.connect().await?;
        client.append_row(&id, &row.to_values()).await
    }

    /// Archive the session's last line. Failures are logged and reported as
    /// `false`; nothing is retried.
    pub async fn save_last_message(&self, session: &ChatSession) -> bool {
        let Some(row) = ArchiveRow::from_session(session, &self.user_label, Utc::now()) else {
            warn!("Nothing to archive for session {}", session.id());
            return false;
        };
        match self.append_row(&row).await {
            Ok(()) => {
                info!("Archived last message of session {} to '{}'", session.id(), self.sheet_name);
                true
            }
            Err(e) => {
                warn!("Archiving failed: {e}");
                false
            }
        }
    }
}
