//! Google Drive API client for file permission operations.

use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::auth::Authenticator;
use crate::error::{Result, TransferError};
use crate::models::{ApiErrorResponse, Permission, PermissionListResponse};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Page size for permissions.list.
const PERMISSIONS_PAGE_SIZE: &str = "100";

/// Outcome of resolving the recipient's permission on a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPermission {
    /// The recipient already held a grant on the file; its id is reused.
    Existing(String),
    /// A fresh writer grant was created for the recipient.
    Created(String),
}

impl ResolvedPermission {
    /// The permission id regardless of how it was obtained.
    pub fn id(&self) -> &str {
        match self {
            ResolvedPermission::Existing(id) | ResolvedPermission::Created(id) => id,
        }
    }
}

/// Client for Drive permission operations on a single file.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a new DriveClient.
    pub fn new(auth: Authenticator) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    /// Override the API base URL. Used by tests with a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// List all permissions on a file, following pagination.
    pub async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>> {
        let token = self.auth.get_access_token().await?;
        let mut all_permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files/{}/permissions", self.base_url, file_id))
                .bearer_auth(&token)
                .query(&[
                    ("supportsAllDrives", "true"),
                    ("pageSize", PERMISSIONS_PAGE_SIZE),
                    ("fields", "*"),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
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

            let list_response: PermissionListResponse = response.json().await?;
            all_permissions.extend(list_response.permissions);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_permissions)
    }

    /// Create a writer permission for a user, letting Drive send its own
    /// share notification email.
    pub async fn create_permission(&self, file_id: &str, email: &str) -> Result<Permission> {
        let token = self.auth.get_access_token().await?;

        let body = json!({
            "role": "writer",
            "type": "user",
            "emailAddress": email,
        });

        let response = self
            .http
            .post(format!("{}/files/{}/permissions", self.base_url, file_id))
            .bearer_auth(&token)
            .query(&[
                ("supportsAllDrives", "true"),
                ("sendNotificationEmail", "true"),
            ])
            .json(&body)
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

        let permission: Permission = response.json().await?;
        Ok(permission)
    }

    /// Find the recipient's permission on the file, creating a writer
    /// grant when none exists. The email match against the service's
    /// records is exact.
    pub async fn resolve_recipient_permission(
        &self,
        file_id: &str,
        email: &str,
    ) -> Result<ResolvedPermission> {
        let permissions = self.list_permissions(file_id).await?;

        if let Some(existing) = permissions
            .iter()
            .find(|p| p.email_address.as_deref() == Some(email))
        {
            info!("Reusing existing permission {} for {}", existing.id, email);
            return Ok(ResolvedPermission::Existing(existing.id.clone()));
        }

        let created = self.create_permission(file_id, email).await?;
        info!("Created permission {} for {}", created.id, email);
        Ok(ResolvedPermission::Created(created.id))
    }

    /// Flag a permission as a pending ownership transfer. The role stays
    /// `writer`; Drive promotes it to owner only once the recipient
    /// accepts.
    pub async fn mark_pending_owner(&self, file_id: &str, permission_id: &str) -> Result<Permission> {
        let token = self.auth.get_access_token().await?;

        let body = json!({
            "role": "writer",
            "pendingOwner": true,
        });

        let response = self
            .http
            .patch(format!(
                "{}/files/{}/permissions/{}",
                self.base_url, file_id, permission_id
            ))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true")])
            .json(&body)
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

        let permission: Permission = response.json().await?;
        Ok(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_permission_id() {
        assert_eq!(ResolvedPermission::Existing("p1".to_string()).id(), "p1");
        assert_eq!(ResolvedPermission::Created("p2".to_string()).id(), "p2");
    }

    // HTTP behavior is covered in tests/drive_test.rs against a mock server.
}
