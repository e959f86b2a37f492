//! Configuration module
//!
//! Client-side settings: backend location, the strategy threshold and the
//! per-step timeouts. Loaded from the environment (and a `.env` file if present).

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_API_URL, DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES};

const NEGOTIATE_TIMEOUT_SECS: u64 = 30;
const FINALIZE_TIMEOUT_SECS: u64 = 60;
const COMBINED_TIMEOUT_SECS: u64 = 300;
const TRANSFER_TIMEOUT_BASE_SECS: u64 = 60;
const TRANSFER_MIN_THROUGHPUT_KBPS: u64 = 256;

/// Upload client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Files of at least this many bytes use the direct-to-storage flow.
    pub large_upload_threshold_bytes: u64,
    pub negotiate_timeout_secs: u64,
    pub finalize_timeout_secs: u64,
    pub combined_timeout_secs: u64,
    pub transfer_timeout_base_secs: u64,
    pub transfer_min_throughput_kbps: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            large_upload_threshold_bytes: DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES,
            negotiate_timeout_secs: NEGOTIATE_TIMEOUT_SECS,
            finalize_timeout_secs: FINALIZE_TIMEOUT_SECS,
            combined_timeout_secs: COMBINED_TIMEOUT_SECS,
            transfer_timeout_base_secs: TRANSFER_TIMEOUT_BASE_SECS,
            transfer_min_throughput_kbps: TRANSFER_MIN_THROUGHPUT_KBPS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables take their defaults;
    /// set-but-unparseable numeric variables are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_u64 = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer", key)),
                None => Ok(default),
            }
        };

        let api_url = lookup("OMNISORA_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let config = ClientConfig {
            api_url,
            api_key: lookup("OMNISORA_API_KEY").filter(|k| !k.trim().is_empty()),
            large_upload_threshold_bytes: parse_u64(
                "LARGE_UPLOAD_THRESHOLD_BYTES",
                DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES,
            )?,
            negotiate_timeout_secs: parse_u64("NEGOTIATE_TIMEOUT_SECS", NEGOTIATE_TIMEOUT_SECS)?,
            finalize_timeout_secs: parse_u64("FINALIZE_TIMEOUT_SECS", FINALIZE_TIMEOUT_SECS)?,
            combined_timeout_secs: parse_u64("COMBINED_TIMEOUT_SECS", COMBINED_TIMEOUT_SECS)?,
            transfer_timeout_base_secs: parse_u64(
                "TRANSFER_TIMEOUT_BASE_SECS",
                TRANSFER_TIMEOUT_BASE_SECS,
            )?,
            transfer_min_throughput_kbps: parse_u64(
                "TRANSFER_MIN_THROUGHPUT_KBPS",
                TRANSFER_MIN_THROUGHPUT_KBPS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "OMNISORA_API_URL must start with http:// or https:// (got '{}')",
                self.api_url
            ));
        }
        if self.large_upload_threshold_bytes == 0 {
            return Err(anyhow::anyhow!(
                "LARGE_UPLOAD_THRESHOLD_BYTES must be greater than zero"
            ));
        }

        let timeouts = [
            ("NEGOTIATE_TIMEOUT_SECS", self.negotiate_timeout_secs),
            ("FINALIZE_TIMEOUT_SECS", self.finalize_timeout_secs),
            ("COMBINED_TIMEOUT_SECS", self.combined_timeout_secs),
            ("TRANSFER_TIMEOUT_BASE_SECS", self.transfer_timeout_base_secs),
            ("TRANSFER_MIN_THROUGHPUT_KBPS", self.transfer_min_throughput_kbps),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(anyhow::anyhow!("{} must be greater than zero", name));
        }

        Ok(())
    }

    pub fn negotiate_timeout(&self) -> Duration {
        Duration::from_secs(self.negotiate_timeout_secs)
    }

    pub fn finalize_timeout(&self) -> Duration {
        Duration::from_secs(self.finalize_timeout_secs)
    }

    pub fn combined_timeout(&self) -> Duration {
        Duration::from_secs(self.combined_timeout_secs)
    }

    /// Timeout for a storage transfer of `size` bytes: base plus the time needed at
    /// the minimum acceptable throughput.
    pub fn transfer_timeout(&self, size: u64) -> Duration {
        let bytes_per_sec = self.transfer_min_throughput_kbps.saturating_mul(1024).max(1);
        let scaled = size.div_ceil(bytes_per_sec);
        Duration::from_secs(self.transfer_timeout_base_secs.saturating_add(scaled))
    }
}
