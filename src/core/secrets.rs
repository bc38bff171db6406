//! Embedded secret store
//!
//! A TOML file laid out like Streamlit's `secrets.toml`: top-level API keys
//! plus a `[gcp_service_account]` table for the spreadsheet archive.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::SoulError;

#[derive(Debug, Clone)]
pub struct SecretsStore {
    path: PathBuf,
    table: toml::Table,
}

impl SecretsStore {
    /// Load the store, failing if the file is missing or malformed
    pub fn load(path: &Path) -> Result<Self, SoulError> {
        Self::load_optional(path)?.ok_or_else(|| {
            SoulError::auth(format!("secrets store not found at {}", path.display()))
        })
    }

    /// Load the store; a missing file is `Ok(None)`
    pub fn load_optional(path: &Path) -> Result<Option<Self>, SoulError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents, path).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SoulError::auth(format!(
                "failed to read secrets store {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self, SoulError> {
        let table = contents.parse::<toml::Table>().map_err(|e| {
            SoulError::auth(format!("secrets store {} is not valid TOML: {e}", path.display()))
        })?;
        Ok(SecretsStore {
            path: path.to_path_buf(),
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blank top-level string value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.table
            .get(key)
            .and_then(toml::Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn table(&self, key: &str) -> Option<&toml::Table> {
        self.table.get(key).and_then(toml::Value::as_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
GOOGLE_API_KEY = "AIza-test"
EMPTY = "  "

[gcp_service_account]
client_email = "robot@soul.iam.gserviceaccount.com"
"#;

    #[test]
    fn test_parse_and_lookup() {
        let store = SecretsStore::parse(SAMPLE, Path::new("secrets.toml")).unwrap();
        assert_eq!(store.get_str("GOOGLE_API_KEY"), Some("AIza-test"));
        assert_eq!(store.get_str("EMPTY"), None);
        assert_eq!(store.get_str("MISSING"), None);
        let account = store.table("gcp_service_account").unwrap();
        assert_eq!(
            account.get("client_email").and_then(|v| v.as_str()),
            Some("robot@soul.iam.gserviceaccount.com")
        );
    }

    #[test]
    fn test_invalid_toml_is_auth_error() {
        let err = SecretsStore::parse("not = [valid", Path::new("x.toml")).unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Auth);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        assert!(SecretsStore::load_optional(&path).unwrap().is_none());
        assert!(SecretsStore::load(&path).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let store = SecretsStore::load(file.path()).unwrap();
        assert_eq!(store.path(), file.path());
        assert_eq!(store.get_str("GOOGLE_API_KEY"), Some("AIza-test"));
    }
}
