//! drive_handover - Initiate a Google Drive ownership transfer.
//!
//! This library provides functionality to:
//! - Load cached OAuth credentials or run a one-time browser consent flow
//! - Resolve (reuse or create) the recipient's sharing permission on a file
//! - Flag that permission as a pending ownership transfer
//! - Send a courtesy notification email through the Gmail API
//!
//! # Example
//!
//! ```no_run
//! use drive_handover::{auth, initiate_transfer, DriveClient, GmailClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let authenticator =
//!         auth::load_or_authenticate("credentials_desktop.json", "token.json").await?;
//!
//!     let drive = DriveClient::new(authenticator.clone());
//!     let gmail = GmailClient::new(authenticator);
//!
//!     let report = initiate_transfer(&drive, &gmail, "file-id", "new.owner@example.com").await?;
//!     println!("transfer marked: {:?}", report.transfer_marked);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod drive;
pub mod error;
pub mod gmail;
pub mod models;
pub mod transfer;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use drive::{DriveClient, ResolvedPermission};
pub use error::{Result, TransferError};
pub use gmail::GmailClient;
pub use transfer::{initiate_transfer, StepOutcome, TransferReport};
pub use url_parser::extract_file_id;
