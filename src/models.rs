//! Data models for the Google Drive, Gmail and OAuth APIs.

use serde::{Deserialize, Serialize};

/// A sharing permission on a Drive file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub pending_owner: Option<bool>,
}

/// Response from the permissions.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionListResponse {
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// The `installed` / `web` section of an OAuth client secret file
/// downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientKey {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// OAuth client secret file. Desktop-app credentials use the `installed`
/// key; web-app credentials use `web`. Both are accepted.
#[derive(Debug, Deserialize)]
pub struct OAuthClientSecret {
    #[serde(default)]
    pub installed: Option<OAuthClientKey>,
    #[serde(default)]
    pub web: Option<OAuthClientKey>,
}

impl OAuthClientSecret {
    /// The client key, whichever section is present.
    pub fn key(self) -> Option<OAuthClientKey> {
        self.installed.or(self.web)
    }
}

/// Persisted token file: the client identity merged with the refresh
/// token obtained from the consent flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl AuthorizedUser {
    pub fn new(key: &OAuthClientKey, refresh_token: String) -> Self {
        Self {
            kind: "authorized_user".to_string(),
            client_id: key.client_id.clone(),
            client_secret: key.client_secret.clone(),
            refresh_token,
        }
    }
}

/// OAuth2 token endpoint response. `refresh_token` is only present on
/// the initial authorization-code exchange, not on refresh grants.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response from the Gmail messages.send endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}
