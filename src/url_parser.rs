//! URL parser for extracting Google Drive file IDs from URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, TransferError};

/// Regex patterns for Google Drive file URLs.
static FILE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/file/d/([a-zA-Z0-9_-]+)")
        .expect("Invalid file URL regex")
});

static OPEN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)")
        .expect("Invalid open URL regex")
});

/// Valid Google Drive ID pattern (alphanumeric, underscore, hyphen).
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Extract a Google Drive file ID from a URL or validate a raw ID.
///
/// Supports the following formats:
/// - `https://drive.google.com/file/d/<ID>/view`
/// - `https://drive.google.com/open?id=<ID>`
/// - Raw ID string
///
/// # Examples
///
/// ```
/// use drive_handover::url_parser::extract_file_id;
///
/// let id = extract_file_id("https://drive.google.com/file/d/1abc123/view").unwrap();
/// assert_eq!(id, "1abc123");
///
/// let id = extract_file_id("1abc123").unwrap();
/// assert_eq!(id, "1abc123");
/// ```
pub fn extract_file_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    // Try file URL pattern
    if let Some(captures) = FILE_URL_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(id.as_str().to_string());
        }
    }

    // Try open URL pattern
    if let Some(captures) = OPEN_URL_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(id.as_str().to_string());
        }
    }

    // Check if it's a raw ID
    if ID_REGEX.is_match(trimmed) && !trimmed.is_empty() {
        return Ok(trimmed.to_string());
    }

    Err(TransferError::InvalidUrlOrId(url_or_id.to_string()))
}

/// Canonical browser link for a file, as sent to the new owner.
pub fn file_view_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}
