use std::fmt;

use serde::{Deserialize, Serialize};

/// Single-use credential for one direct write to object storage.
///
/// Not `Clone`: the storage transfer takes it by value.
pub struct UploadAuthorization {
    pub upload_url: String,
    pub authorization_token: String,
    /// Target object name chosen by the backend. Opaque to the client.
    pub storage_file_name: String,
    pub bucket_id: String,
}

impl fmt::Debug for UploadAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadAuthorization")
            .field("upload_url", &self.upload_url)
            .field("authorization_token", &"<redacted>")
            .field("storage_file_name", &self.storage_file_name)
            .field("bucket_id", &self.bucket_id)
            .finish()
    }
}

/// Storage identifiers that survive the transfer and go into the finalize request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    pub storage_file_name: String,
    pub bucket_id: String,
}

impl UploadAuthorization {
    pub fn target(&self) -> StorageTarget {
        StorageTarget {
            storage_file_name: self.storage_file_name.clone(),
            bucket_id: self.bucket_id.clone(),
        }
    }
}

/// Storage provider's confirmation that the object was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReceipt {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub content_sha1: Option<String>,
}

/// Normalized terminal success of an upload, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub hash: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub download_url: String,
    /// The backend may omit this; see [`UploadedFile::share_link`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shareable_url: Option<String>,
}

impl UploadedFile {
    /// Link to hand to users: `shareable_url` when present, else `download_url`.
    pub fn share_link(&self) -> &str {
        self.shareable_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.download_url)
    }
}
