//! OmniSora CLI: upload files and list recent uploads.
//!
//! Set OMNISORA_API_URL (or API_URL); OMNISORA_API_KEY is sent as X-API-Key when set.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use omnisora_api_client::ApiClient;
use omnisora_cli::{format_file_size, init_tracing, truncate_string, CliObserver, UploadSummary};
use omnisora_core::models::RecentUpload;
use omnisora_core::{ClientConfig, ErrorMetadata, FileHandle};
use omnisora_upload::UploadOrchestrator;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "omnisora", about = "OmniSora upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and print its share link
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Free-text description used for tagging
        #[arg(long, short)]
        description: Option<String>,
        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// List recent uploads
    Recent {
        /// Maximum number of items
        #[arg(long)]
        limit: Option<u32>,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn print_recent_table(uploads: &[RecentUpload]) {
    println!("\n=== Recent Uploads ===\n");

    if uploads.is_empty() {
        println!("No uploads found.");
        return;
    }

    println!(
        "{:<14} {:<30} {:>12} {:<30} {:>20}",
        "Hash", "Filename", "Size", "Tags", "Uploaded At"
    );
    println!("{}", "-".repeat(110));

    for upload in uploads {
        println!(
            "{:<14} {:<30} {:>12} {:<30} {:>20}",
            truncate_string(&upload.hash, 14),
            truncate_string(upload.filename.as_deref().unwrap_or("-"), 30),
            upload
                .size
                .map(format_file_size)
                .unwrap_or_else(|| "-".to_string()),
            truncate_string(&upload.tags.join(", "), 30),
            upload
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()
        .context("Invalid configuration. Check OMNISORA_API_URL (or API_URL)")?;
    let client = ApiClient::from_config(config.clone()).context("Failed to create API client")?;

    match cli.command {
        Commands::Upload {
            file,
            description,
            mime_type,
        } => {
            let handle = FileHandle::from_path(&file, mime_type)
                .await
                .with_context(|| format!("Cannot upload {}", file.display()))?;
            tracing::info!(
                file = %handle.name(),
                size = %format_file_size(handle.size()),
                "Selected file"
            );

            let orchestrator =
                UploadOrchestrator::new(Arc::new(client.clone()), Arc::new(client.storage_client()))
                    .with_threshold(config.large_upload_threshold_bytes)
                    .with_observer(Arc::new(CliObserver::new()));

            match orchestrator
                .handle_upload(handle, description.unwrap_or_default())
                .await
            {
                Ok(uploaded) => print_json(&UploadSummary::from(&uploaded))?,
                Err(err) => {
                    if let Some(action) = err.suggested_action() {
                        tracing::info!("{}", action);
                    }
                    return Err(anyhow::anyhow!(err.client_message()));
                }
            }
        }
        Commands::Recent { limit, format } => {
            let uploads = client.recent_uploads(limit).await;
            match format.as_str() {
                "json" => print_json(&uploads)?,
                _ => print_recent_table(&uploads),
            }
        }
    }

    Ok(())
}
