//! Request and response bodies exchanged with the backend and the storage provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::upload::{UploadAuthorization, UploadedFile};

/// Response of `POST /api/upload`.
///
/// A `200` with `success: false` is still a failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedUploadResponse {
    #[serde(default)]
    pub success: bool,
    pub hash: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub download_url: Option<String>,
    pub shareable_url: Option<String>,
    pub error: Option<String>,
}

impl CombinedUploadResponse {
    /// Normalize into an [`UploadedFile`], or return the backend's message (if any).
    pub fn into_uploaded(self) -> Result<UploadedFile, Option<String>> {
        if !self.success {
            return Err(self.error);
        }
        match (self.hash, self.download_url) {
            (Some(hash), Some(download_url)) => Ok(UploadedFile {
                hash,
                tags: self.tags,
                download_url,
                shareable_url: self.shareable_url,
            }),
            _ => Err(Some("Upload response is missing hash or downloadUrl".to_string())),
        }
    }
}

/// Body of `POST /api/get-upload-url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    pub file_name: String,
    /// ShortId of the content.
    pub hash: String,
}

/// Response of `POST /api/get-upload-url`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub authorization_token: String,
    #[serde(rename = "b2FileName")]
    pub storage_file_name: String,
    pub bucket_id: String,
}

impl From<UploadUrlResponse> for UploadAuthorization {
    fn from(resp: UploadUrlResponse) -> Self {
        UploadAuthorization {
            upload_url: resp.upload_url,
            authorization_token: resp.authorization_token,
            storage_file_name: resp.storage_file_name,
            bucket_id: resp.bucket_id,
        }
    }
}

/// Body of `POST /api/finalize-upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeUploadRequest {
    pub hash: String,
    pub description: String,
    pub original_filename: String,
    pub size: u64,
    /// The file's own MIME type, possibly empty.
    pub mimetype: String,
    pub bucket_id: String,
    #[serde(rename = "b2FileName")]
    pub storage_file_name: String,
    #[serde(rename = "b2FileId")]
    pub storage_file_id: String,
}

/// Response of `POST /api/finalize-upload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeUploadResponse {
    pub hash: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub download_url: String,
    pub shareable_url: Option<String>,
}

impl From<FinalizeUploadResponse> for UploadedFile {
    fn from(resp: FinalizeUploadResponse) -> Self {
        UploadedFile {
            hash: resp.hash,
            tags: resp.tags,
            download_url: resp.download_url,
            shareable_url: resp.shareable_url,
        }
    }
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
pub struct BackendErrorBody {
    pub error: Option<String>,
}

/// Error body returned by the storage provider.
#[derive(Debug, Default, Deserialize)]
pub struct StorageErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub status: Option<u16>,
}

/// One entry of `GET /api/recent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentUpload {
    pub hash: String,
    #[serde(default, alias = "originalFilename")]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub download_url: Option<String>,
    #[serde(default)]
    pub shareable_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
