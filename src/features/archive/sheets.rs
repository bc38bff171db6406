//! Google Sheets client
//!
//! Signs an RS256 assertion with the service-account key, trades it for an
//! access token, then talks to the Drive and Sheets REST APIs.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::credentials::ServiceAccountKey;
use crate::core::SoulError;
use crate::providers::REQUEST_TIMEOUT;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signed JWT asking for the sheets and drive scopes
pub fn build_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String, SoulError> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: format!("{SHEETS_SCOPE} {DRIVE_SCOPE}"),
        aud: key.token_uri.clone(),
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SoulError::auth(format!("service account private key is unusable: {e}")))?;
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| SoulError::auth(format!("failed to sign service account assertion: {e}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Drive query matching a spreadsheet by exact name
pub fn spreadsheet_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

pub fn append_body(row: &[String]) -> serde_json::Value {
    json!({ "values": [row] })
}

/// Authorized handle on the Sheets and Drive APIs
pub struct SheetsClient {
    http: reqwest::Client,
    access_token: String,
}

impl SheetsClient {
    /// Exchange the service-account assertion for an access token
    pub async fn login(key: &ServiceAccountKey) -> Result<Self, SoulError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SoulError::storage(format!("failed to build HTTP client: {e}")))?;

        let assertion = build_assertion(key, Utc::now().timestamp())?;
        debug!("Requesting access token for {}", key.client_email);

        let response = http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SoulError::auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SoulError::auth(format!("token exchange rejected (HTTP {status}): {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SoulError::auth(format!("malformed token response: {e}")))?;

        info!("Logged in to Google APIs as {}", key.client_email);
        Ok(SheetsClient {
            http,
            access_token: token.access_token,
        })
    }

    /// Spreadsheet id for a name the service account can see
    pub async fn find_spreadsheet(&self, name: &str) -> Result<String, SoulError> {
        let query = spreadsheet_query(name);
        let response = self
            .http
            .get(DRIVE_FILES_URL)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
            ])
            .send()
            .await
            .map_err(|e| SoulError::storage(format!("spreadsheet lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SoulError::storage(format!(
                "spreadsheet lookup rejected (HTTP {status}): {body}"
            )));
        }

        let list: DriveFileList = response
            .json()
            .await
            .map_err(|e| SoulError::storage(format!("malformed Drive response: {e}")))?;

        list.files.into_iter().next().map(|f| f.id).ok_or_else(|| {
            SoulError::storage(format!(
                "spreadsheet '{name}' not found or not shared with the service account"
            ))
        })
    }

    /// Append one row after the last filled row of the first sheet
    pub async fn append_row(&self, spreadsheet_id: &str, row: &[String]) -> Result<(), SoulError> {
        let url = format!("{SHEETS_BASE_URL}/{spreadsheet_id}/values/A1:append");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&append_body(row))
            .send()
            .await
            .map_err(|e| SoulError::storage(format!("append request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SoulError::storage(format!("append rejected (HTTP {status}): {body}")));
        }
        debug!("Appended {} cells to {spreadsheet_id}", row.len());
        Ok(())
    }
}
