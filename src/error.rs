//! Error types for the drive_handover crate.

use thiserror::Error;

/// Errors that can occur while driving an ownership transfer.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeError(String),

    #[error("Consent flow aborted: {0}")]
    ConsentAborted(String),
}

/// Result type alias for TransferError.
pub type Result<T> = std::result::Result<T, TransferError>;
