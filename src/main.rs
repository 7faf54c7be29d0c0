//! drive_handover CLI - Transfer ownership of a Google Drive file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use drive_handover::{
    auth, extract_file_id, initiate_transfer, DriveClient, GmailClient, ResolvedPermission,
    StepOutcome,
};

/// Initiate a Google Drive ownership transfer and notify the recipient.
///
/// The recipient must still accept the transfer from their own account;
/// this tool only starts the handshake.
#[derive(Parser)]
#[command(name = "drive_handover")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File URL or ID to transfer.
    file: String,

    /// Email address of the new owner.
    #[arg(long, short = 't')]
    to: String,

    /// Path to the OAuth client secret JSON (Desktop app credentials).
    #[arg(long, env = "GOOGLE_OAUTH_CREDENTIALS", default_value = "credentials_desktop.json")]
    credentials: PathBuf,

    /// Path where the authorized-user token is cached.
    #[arg(long, env = "GOOGLE_OAUTH_TOKEN", default_value = "token.json")]
    token: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let file_id = extract_file_id(&cli.file)
        .with_context(|| format!("Invalid file URL or ID: {}", cli.file))?;

    let authenticator = auth::load_or_authenticate(&cli.credentials, &cli.token)
        .await
        .with_context(|| format!("Failed to authenticate with {:?}", cli.credentials))?;

    let drive = DriveClient::new(authenticator.clone());
    let gmail = GmailClient::new(authenticator);

    let report = initiate_transfer(&drive, &gmail, &file_id, &cli.to)
        .await
        .with_context(|| format!("Failed to resolve permissions on file: {}", file_id))?;

    match &report.resolution {
        ResolvedPermission::Existing(id) => {
            println!("Reused existing permission {} for {}", id, report.recipient);
        }
        ResolvedPermission::Created(id) => {
            println!("Created writer permission {} for {}", id, report.recipient);
        }
    }

    match &report.transfer_marked {
        StepOutcome::Completed => {
            println!(
                "Ownership transfer initiated for {}. They will receive a notification from Google Drive.",
                report.recipient
            );
        }
        StepOutcome::Failed(reason) => {
            eprintln!("Pending-owner update failed: {}", reason);
        }
    }

    match &report.notification {
        Some(StepOutcome::Completed) => println!("Email notification sent."),
        Some(StepOutcome::Failed(reason)) => eprintln!("Email notification failed: {}", reason),
        None => {}
    }

    // Notification delivery is best effort and does not affect the exit
    // code; a failed transfer mark does.
    if report.succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
