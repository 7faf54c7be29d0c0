//! Gmail API client for the courtesy transfer notification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::Client;
use serde_json::json;

use crate::auth::Authenticator;
use crate::error::{Result, TransferError};
use crate::models::{ApiErrorResponse, SentMessage};
use crate::url_parser::file_view_link;

/// Base URL for the Gmail API v1.
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Display name carried in the From header. The `me` alias leaves the
/// address itself to Gmail, which stamps the authenticated account.
const SENDER_NAME: &str = "Google Drive Transfer";

const SUBJECT: &str = "Accept Google Drive Ownership Transfer";

/// Compose the plain-text notification message, CRLF-separated per RFC 822.
pub fn build_transfer_notice(to: &str, file_id: &str) -> String {
    let body = format!(
        "Please accept the ownership transfer for the file: {}",
        file_view_link(file_id)
    );

    let lines = [
        format!("From: \"{}\" <me>", SENDER_NAME),
        format!("To: {}", to),
        "Content-Type: text/plain; charset=utf-8".to_string(),
        "MIME-Version: 1.0".to_string(),
        format!("Subject: {}", SUBJECT),
        String::new(),
        body,
    ];

    lines.join("\r\n")
}

/// Encode a raw message the way the send endpoint expects: base64url
/// without padding.
pub fn encode_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Client for sending mail as the authenticated user.
pub struct GmailClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl GmailClient {
    /// Create a new GmailClient.
    pub fn new(auth: Authenticator) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: GMAIL_API_BASE.to_string(),
        }
    }

    /// Override the API base URL. Used by tests with a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send the ownership-transfer notice to the recipient.
    pub async fn send_transfer_notice(&self, to: &str, file_id: &str) -> Result<SentMessage> {
        let raw = encode_message(&build_transfer_notice(to, file_id));
        self.send_raw(&raw).await
    }

    /// Send an already-encoded raw message via users/me/messages/send.
    async fn send_raw(&self, raw: &str) -> Result<SentMessage> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .post(format!("{}/users/me/messages/send", self.base_url))
            .bearer_auth(&token)
            .json(&json!({ "raw": raw }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
                return Err(TransferError::ApiError {
                    status: api_error.error.code,
                    message: api_error.error.message,
                });
            }
            return Err(TransferError::ApiError {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let sent: SentMessage = response.json().await?;
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_contains_view_link() {
        let message = build_transfer_notice("user@example.com", "F1");
        assert!(message.contains("https://drive.google.com/file/d/F1/view"));
        assert!(message.contains("To: user@example.com"));
        assert!(message.contains(SUBJECT));
    }

    #[test]
    fn test_notice_header_body_split() {
        let message = build_transfer_notice("user@example.com", "F1");
        let (headers, body) = message.split_once("\r\n\r\n").unwrap();
        assert!(headers.contains("MIME-Version: 1.0"));
        assert!(body.starts_with("Please accept the ownership transfer"));
    }

    #[test]
    fn test_notice_carries_sender_display_name() {
        let message = build_transfer_notice("user@example.com", "F1");
        let (headers, _) = message.split_once("\r\n\r\n").unwrap();
        assert!(headers.contains("From: \"Google Drive Transfer\""));
    }

    #[test]
    fn test_encoding_is_base64url_no_pad() {
        let message = build_transfer_notice("user@example.com", "a_very-long~id");
        let encoded = encode_message(&message);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));

        let decoded = URL_SAFE_NO_PAD.decode(encoded.as_bytes()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), message);
    }
}
