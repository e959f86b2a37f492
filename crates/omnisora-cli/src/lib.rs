use std::sync::atomic::{AtomicU64, Ordering};

use omnisora_core::UploadedFile;
use omnisora_upload::{AttemptState, UploadObserver};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size, base 1024, at most two decimals ("1.5 KB", "4.5 MB").
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// What `omnisora upload` prints on success.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub hash: String,
    pub tags: Vec<String>,
    pub download_url: String,
    pub shareable_url: String,
}

impl From<&UploadedFile> for UploadSummary {
    fn from(file: &UploadedFile) -> Self {
        Self {
            hash: file.hash.clone(),
            tags: file.tags.clone(),
            download_url: file.download_url.clone(),
            shareable_url: file.share_link().to_string(),
        }
    }
}

/// Logs state changes, and transfer progress every 10%.
#[derive(Debug, Default)]
pub struct CliObserver {
    reported_decile: AtomicU64,
}

impl CliObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UploadObserver for CliObserver {
    fn on_state(&self, state: &AttemptState) {
        match state {
            // Reported by the caller.
            AttemptState::Done | AttemptState::Failed(_) => {}
            _ => tracing::info!(state = %state, "Upload step"),
        }
    }

    fn on_progress(&self, percent: f64) {
        let decile = (percent / 10.0).floor() as u64;
        let previous = self.reported_decile.fetch_max(decile, Ordering::AcqRel);
        if decile > previous {
            tracing::info!("Uploading... {:.0}%", percent);
        }
    }
}

/// Log filter from `RUST_LOG`, defaulting to `info`. Read `.env` before calling.
pub fn tracing_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing for the CLI. Logs go to stderr; stdout carries command output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_filter())
        .with_writer(std::io::stderr)
        .init();
}
