//! Ownership-transfer workflow: resolve the recipient's permission, flag
//! it as pending-owner, then send the courtesy notification.

use tracing::{info, warn};

use crate::drive::{DriveClient, ResolvedPermission};
use crate::error::Result;
use crate::gmail::GmailClient;

/// Outcome of one attempted workflow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Failed(String),
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

/// Per-step record of one transfer run. Resolution failures abort the
/// run outright, so a report always carries a resolved permission; the
/// two later steps are captured here instead of being silently swallowed.
/// `notification` is `None` when the step was never attempted because
/// the pending-owner update failed.
#[derive(Debug)]
pub struct TransferReport {
    pub file_id: String,
    pub recipient: String,
    pub resolution: ResolvedPermission,
    pub transfer_marked: StepOutcome,
    pub notification: Option<StepOutcome>,
}

impl TransferReport {
    /// The transfer itself succeeded. Notification delivery is
    /// independent and does not factor in.
    pub fn succeeded(&self) -> bool {
        self.transfer_marked.is_completed()
    }
}

/// Run the full workflow for one file and recipient.
///
/// Authentication and permission-resolution errors propagate. A failed
/// pending-owner update or notification is recorded in the report; the
/// notification is not attempted when the update fails, since there is
/// no transfer to announce.
pub async fn initiate_transfer(
    drive: &DriveClient,
    gmail: &GmailClient,
    file_id: &str,
    recipient: &str,
) -> Result<TransferReport> {
    let resolution = drive.resolve_recipient_permission(file_id, recipient).await?;
    let permission_id = resolution.id().to_string();

    let transfer_marked = match drive.mark_pending_owner(file_id, &permission_id).await {
        Ok(permission) => {
            info!(
                "Ownership transfer initiated for {}; role={} pendingOwner={}",
                recipient,
                permission.role.as_deref().unwrap_or("writer"),
                permission.pending_owner.unwrap_or(true),
            );
            StepOutcome::Completed
        }
        Err(e) => {
            warn!("Pending-owner update failed: {}", e);
            StepOutcome::Failed(e.to_string())
        }
    };

    let notification = if transfer_marked.is_completed() {
        Some(match gmail.send_transfer_notice(recipient, file_id).await {
            Ok(sent) => {
                info!("Notification sent (message id {})", sent.id);
                StepOutcome::Completed
            }
            Err(e) => {
                warn!("Notification failed: {}", e);
                StepOutcome::Failed(e.to_string())
            }
        })
    } else {
        None
    };

    Ok(TransferReport {
        file_id: file_id.to_string(),
        recipient: recipient.to_string(),
        resolution,
        transfer_marked,
        notification,
    })
}
