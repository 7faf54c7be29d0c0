//! OAuth authorized-user authentication for Google APIs.
//!
//! Credentials are loaded from a persisted token file when present;
//! otherwise an interactive browser consent flow runs once and the
//! resulting refresh token is saved for future runs.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use percent_encoding::percent_decode_str;
use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Result, TransferError};
use crate::models::{AuthorizedUser, OAuthClientKey, OAuthClientSecret, TokenResponse};

/// Google OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google OAuth2 consent page.
const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Scopes required for the transfer workflow: full Drive access plus
/// Gmail compose/send for the courtesy notification.
const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/gmail.compose",
    "https://www.googleapis.com/auth/gmail.send",
];

/// Page shown in the browser once the consent redirect lands.
const CONSENT_DONE_PAGE: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n\
     <html><body>Authorization received. You can close this tab.</body></html>";

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

/// Authenticator for Google APIs using a persisted authorized-user token.
#[derive(Clone)]
pub struct Authenticator {
    user: Arc<AuthorizedUser>,
    token_uri: String,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create a new authenticator from authorized-user credentials.
    pub fn new(user: AuthorizedUser) -> Self {
        Self {
            user: Arc::new(user),
            token_uri: TOKEN_URI.to_string(),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Override the token endpoint. Used by tests with a mock server.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// The persisted credentials backing this authenticator.
    pub fn user(&self) -> &AuthorizedUser {
        &self.user
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                // Add 60 second buffer before expiration
                let buffer = Duration::from_secs(60);
                if token.expires_at > SystemTime::now() + buffer {
                    return Ok(token.access_token.clone());
                }
            }
        }

        // Refresh the token
        let new_token = self.refresh_access_token().await?;

        // Cache the new token
        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    /// Exchange the long-lived refresh token for a short-lived access token.
    async fn refresh_access_token(&self) -> Result<CachedToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", &self.user.client_id),
            ("client_secret", &self.user.client_secret),
            ("refresh_token", &self.user.refresh_token),
        ];

        let response = self
            .client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::TokenExchangeError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        let expires_at = SystemTime::now() + Duration::from_secs(token_response.expires_in);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

/// Load saved credentials from the token file, or run the interactive
/// consent flow and persist the result.
///
/// # Arguments
/// * `credentials_path` - OAuth client secret JSON from the Cloud console
/// * `token_path` - Persisted authorized-user token, created on first run
pub async fn load_or_authenticate<P: AsRef<Path>, Q: AsRef<Path>>(
    credentials_path: P,
    token_path: Q,
) -> Result<Authenticator> {
    let token_path = token_path.as_ref();

    if let Some(user) = load_saved_credentials(token_path) {
        info!("Using saved credentials from {}", token_path.display());
        return Ok(Authenticator::new(user));
    }

    info!("No saved credentials found, starting interactive consent flow");
    let key = load_client_key(credentials_path.as_ref())?;
    let user = run_consent_flow(&key).await?;

    // Persist for future runs; a failed write only costs the next run
    // another consent round trip.
    match serde_json::to_string_pretty(&user) {
        Ok(payload) => {
            if let Err(e) = tokio::fs::write(token_path, payload).await {
                warn!("Could not save token to {}: {}", token_path.display(), e);
            } else {
                info!("Token saved to {}", token_path.display());
            }
        }
        Err(e) => warn!("Could not serialize token: {}", e),
    }

    Ok(Authenticator::new(user))
}

/// Read and parse the persisted token file. Any failure means the
/// interactive flow runs instead.
fn load_saved_credentials(token_path: &Path) -> Option<AuthorizedUser> {
    let content = std::fs::read_to_string(token_path).ok()?;
    let user: AuthorizedUser = serde_json::from_str(&content).ok()?;
    if user.kind != "authorized_user" {
        return None;
    }
    Some(user)
}

/// Read the OAuth client secret file.
fn load_client_key(path: &Path) -> Result<OAuthClientKey> {
    let content = std::fs::read_to_string(path)?;
    let secret: OAuthClientSecret = serde_json::from_str(&content)?;
    secret.key().ok_or_else(|| {
        TransferError::AuthenticationError(format!(
            "No 'installed' or 'web' client in {}",
            path.display()
        ))
    })
}

/// Drive the browser-based consent flow: listen on a loopback port, open
/// the consent page, wait for the redirect, then exchange the
/// authorization code for tokens.
async fn run_consent_flow(key: &OAuthClientKey) -> Result<AuthorizedUser> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());

    let consent_url = reqwest::Url::parse_with_params(
        AUTH_URI,
        &[
            ("client_id", key.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", &SCOPES.join(" ")),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| TransferError::AuthenticationError(format!("Bad consent URL: {}", e)))?
    .to_string();

    info!("Opening browser for consent");
    if open::that(&consent_url).is_err() {
        // Headless fallback: let the user follow the link themselves.
        println!("Open this URL in your browser:\n{}", consent_url);
    }

    let code = wait_for_redirect(&listener).await?;

    let token_uri = key.token_uri.as_deref().unwrap_or(TOKEN_URI);
    let params = [
        ("grant_type", "authorization_code"),
        ("code", &code),
        ("client_id", &key.client_id),
        ("client_secret", &key.client_secret),
        ("redirect_uri", &redirect_uri),
    ];

    let response = Client::new().post(token_uri).form(&params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TransferError::TokenExchangeError(format!(
            "Status {}: {}",
            status, body
        )));
    }

    let token_response: TokenResponse = response.json().await?;
    let refresh_token = token_response.refresh_token.ok_or_else(|| {
        TransferError::AuthenticationError(
            "Consent flow returned no refresh token".to_string(),
        )
    })?;

    Ok(AuthorizedUser::new(key, refresh_token))
}

/// Accept one connection on the loopback listener and pull the
/// authorization code out of the redirect request.
async fn wait_for_redirect(listener: &TcpListener) -> Result<String> {
    let (mut stream, _) = listener.accept().await?;

    // The redirect may arrive split across several segments; keep reading
    // until the end of the request headers.
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
        if raw.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        // Cap against a peer that never terminates its headers.
        if raw.len() > 64 * 1024 {
            break;
        }
    }
    let request = String::from_utf8_lossy(&raw).into_owned();

    // Best effort response either way so the browser tab is not left hanging.
    let _ = stream.write_all(CONSENT_DONE_PAGE.as_bytes()).await;

    parse_redirect_request(&request)
}

/// Extract the `code` query parameter from the redirect's request line.
fn parse_redirect_request(request: &str) -> Result<String> {
    let request_line = request.lines().next().unwrap_or_default();

    // "GET /?code=...&scope=... HTTP/1.1"
    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default();
    let query = target.split_once('?').map(|(_, q)| q).unwrap_or_default();

    let mut code = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("code", value)) => {
                code = Some(percent_decode_str(value).decode_utf8_lossy().into_owned());
            }
            Some(("error", value)) => {
                return Err(TransferError::ConsentAborted(value.to_string()));
            }
            _ => {}
        }
    }

    code.ok_or_else(|| {
        TransferError::ConsentAborted("redirect carried no authorization code".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redirect_with_code() {
        let request = "GET /?code=4%2F0Axyz-abc&scope=email HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n";
        assert_eq!(parse_redirect_request(request).unwrap(), "4/0Axyz-abc");
    }

    #[test]
    fn test_parse_redirect_denied() {
        let request = "GET /?error=access_denied HTTP/1.1\r\n\r\n";
        let err = parse_redirect_request(request).unwrap_err();
        assert!(matches!(err, TransferError::ConsentAborted(_)));
    }

    #[test]
    fn test_parse_redirect_missing_code() {
        let request = "GET / HTTP/1.1\r\n\r\n";
        assert!(parse_redirect_request(request).is_err());
    }

    #[tokio::test]
    async fn test_redirect_read_across_segments() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let browser = tokio::spawn(async move {
            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"GET /?code=4%2Fsplit").await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            stream
                .write_all(b"-code&scope=email HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n")
                .await
                .unwrap();
            let mut response = Vec::new();
            let _ = stream.read_to_end(&mut response).await;
            response
        });

        let code = wait_for_redirect(&listener).await.unwrap();
        assert_eq!(code, "4/split-code");

        let response = browser.await.unwrap();
        assert!(String::from_utf8_lossy(&response).contains("Authorization received"));
    }

    #[test]
    fn test_load_saved_credentials_rejects_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"type":"service_account","client_id":"a","client_secret":"b","refresh_token":"c"}"#,
        )
        .unwrap();

        assert!(load_saved_credentials(&path).is_none());
    }

    #[test]
    fn test_load_saved_credentials_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"type":"authorized_user","client_id":"a","client_secret":"b","refresh_token":"c"}"#,
        )
        .unwrap();

        let user = load_saved_credentials(&path).unwrap();
        assert_eq!(user.refresh_token, "c");
    }
}
