use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::SHORT_ID_LEN;
use crate::error::{UploadError, UploadResult};

/// Content digests of one file, computed once over the same buffer.
///
/// `primary` is the content identity; `integrity` is handed to the storage provider
/// for server-side verification and is not shown to users.
#[derive(Clone, PartialEq, Eq)]
pub struct Digests {
    primary: String,
    integrity: String,
}

impl Digests {
    /// Build from hex strings. Both are normalized to lowercase.
    pub fn from_hex(primary: &str, integrity: &str) -> UploadResult<Self> {
        for (label, value) in [("primary", primary), ("integrity", integrity)] {
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(UploadError::DigestComputation(format!(
                    "{} digest is not a hex string",
                    label
                )));
            }
        }
        if primary.len() < SHORT_ID_LEN {
            return Err(UploadError::DigestComputation(format!(
                "primary digest shorter than {} characters",
                SHORT_ID_LEN
            )));
        }

        Ok(Self {
            primary: primary.to_ascii_lowercase(),
            integrity: integrity.to_ascii_lowercase(),
        })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn integrity(&self) -> &str {
        &self.integrity
    }

    pub fn short_id(&self) -> ShortId {
        ShortId(self.primary[..SHORT_ID_LEN].to_string())
    }
}

impl fmt::Debug for Digests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digests")
            .field("primary", &self.primary)
            .finish_non_exhaustive()
    }
}

/// The first 12 hex characters of the primary digest.
///
/// Not collision-checked locally; uniqueness is left to the backend's naming scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
