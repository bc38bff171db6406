//! Step-by-step spreadsheet check
//!
//! Mirrors what a person would check by hand: is the key file there, whose
//! key is it, can it log in, can it open the sheet, can it write.

use chrono::Utc;
use log::info;
use std::fmt;
use std::path::Path;

use crate::core::{Config, SoulError};
use crate::features::archive::record::TIMESTAMP_FORMAT;
use crate::features::archive::{CredentialProvider, KeyFileProvider, SheetsClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStep {
    KeyFile,
    ServiceAccount,
    Login,
    OpenSheet,
    WriteRow,
}

impl StorageStep {
    pub const ALL: [StorageStep; 5] = [
        StorageStep::KeyFile,
        StorageStep::ServiceAccount,
        StorageStep::Login,
        StorageStep::OpenSheet,
        StorageStep::WriteRow,
    ];
}

impl fmt::Display for StorageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StorageStep::KeyFile => "key file",
            StorageStep::ServiceAccount => "service account",
            StorageStep::Login => "login",
            StorageStep::OpenSheet => "open sheet",
            StorageStep::WriteRow => "write row",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: StorageStep,
    pub result: Result<String, SoulError>,
}

#[derive(Debug, Clone, Default)]
pub struct StorageReport {
    pub steps: Vec<StepOutcome>,
}

impl StorageReport {
    fn record(&mut self, step: StorageStep, result: Result<String, SoulError>) -> bool {
        let ok = result.is_ok();
        self.steps.push(StepOutcome { step, result });
        ok
    }

    pub fn passed(&self) -> bool {
        self.steps.len() == StorageStep::ALL.len() && self.steps.iter().all(|s| s.result.is_ok())
    }

    pub fn failed_step(&self) -> Option<StorageStep> {
        self.steps.iter().find(|s| s.result.is_err()).map(|s| s.step)
    }
}

/// Row written by the final step
pub fn test_row() -> Vec<String> {
    vec![
        Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        "DIAGNOSTIC".to_string(),
        "soul-diagnose".to_string(),
        "test".to_string(),
        "Connection check succeeded".to_string(),
    ]
}

/// Run the five steps against the configured key file, stopping at the first
/// failure
pub async fn check_storage(config: &Config) -> StorageReport {
    check_storage_with(
        &config.credentials_path,
        &config.sheet_name,
        config.sheet_id.as_deref(),
    )
    .await
}

pub async fn check_storage_with(
    key_file: &Path,
    sheet_name: &str,
    sheet_id: Option<&str>,
) -> StorageReport {
    let mut report = StorageReport::default();
    let provider = KeyFileProvider::new(key_file);

    let present = key_file.is_file();
    let found = if present {
        Ok(format!("found {}", key_file.display()))
    } else {
        Err(SoulError::auth(format!("{} does not exist", key_file.display())))
    };
    if !report.record(StorageStep::KeyFile, found) {
        return report;
    }

    let key = match provider.load() {
        Ok(Some(key)) => key,
        Ok(None) => {
            report.record(
                StorageStep::ServiceAccount,
                Err(SoulError::auth(format!("{} disappeared", key_file.display()))),
            );
            return report;
        }
        Err(e) => {
            report.record(StorageStep::ServiceAccount, Err(e));
            return report;
        }
    };
    report.record(
        StorageStep::ServiceAccount,
        Ok(format!(
            "{} (must be an editor of the spreadsheet)",
            key.client_email
        )),
    );

    let client = match SheetsClient::login(&key).await {
        Ok(client) => client,
        Err(e) => {
            report.record(StorageStep::Login, Err(e));
            return report;
        }
    };
    report.record(StorageStep::Login, Ok("access token issued".to_string()));

    let id = match sheet_id {
        Some(id) => Ok(id.to_string()),
        None => client.find_spreadsheet(sheet_name).await,
    };
    let id = match id {
        Ok(id) => {
            report.record(StorageStep::OpenSheet, Ok(format!("'{sheet_name}' ({id})")));
            id
        }
        Err(e) => {
            report.record(StorageStep::OpenSheet, Err(e));
            return report;
        }
    };

    let written = client
        .append_row(&id, &test_row())
        .await
        .map(|()| "test row appended".to_string());
    report.record(StorageStep::WriteRow, written);

    info!("Storage check finished | Passed: {}", report.passed());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use std::io::Write;

    #[tokio::test]
    async fn test_stops_when_key_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            check_storage_with(&dir.path().join("credentials.json"), "SOUL_User_Database", None)
                .await;
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.failed_step(), Some(StorageStep::KeyFile));
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_stops_when_key_file_is_corrupt() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let report = check_storage_with(file.path(), "SOUL_User_Database", None).await;
        assert_eq!(report.steps.len(), 2);
        assert!(report.steps[0].result.is_ok());
        let err = report.steps[1].result.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(report.failed_step(), Some(StorageStep::ServiceAccount));
    }

    #[test]
    fn test_row_shape() {
        let row = test_row();
        assert_eq!(row.len(), 5);
        assert_eq!(row[1], "DIAGNOSTIC");
    }

    #[test]
    fn test_step_labels() {
        let labels: Vec<String> = StorageStep::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            labels,
            vec!["key file", "service account", "login", "open sheet", "write row"]
        );
    }
}
