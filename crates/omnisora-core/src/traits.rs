//! Collaborator traits
//!
//! The orchestrator drives an upload through these seams. The HTTP implementations
//! live in `omnisora-api-client`; tests substitute in-memory ones.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::UploadResult;
use crate::models::{
    FileHandle, FinalizeUploadRequest, StorageReceipt, UploadAuthorization, UploadUrlRequest,
    UploadedFile,
};

/// Bytes handed to the storage provider so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Percentage in `[0, 100]`. An empty transfer counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        let ratio = self.bytes_sent as f64 / self.total_bytes as f64;
        (ratio * 100.0).clamp(0.0, 100.0)
    }
}

/// Receives byte-level progress while a transfer streams.
///
/// Called from inside the request body stream; implementations must be cheap and
/// must not touch anything but their own progress state.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, progress: &TransferProgress);
}

/// A no-op progress callback.
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _progress: &TransferProgress) {}
}

/// Backend endpoints the upload flow calls.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// SMALL path: send bytes and description in one request. The backend stores,
    /// records and tags the file as one unit.
    async fn upload_combined(
        &self,
        file: &FileHandle,
        data: Bytes,
        description: &str,
    ) -> UploadResult<UploadedFile>;

    /// LARGE path: obtain a single-use authorization to write one object.
    async fn request_upload_authorization(
        &self,
        request: &UploadUrlRequest,
    ) -> UploadResult<UploadAuthorization>;

    /// LARGE path: record an object the storage provider has confirmed.
    async fn finalize_upload(&self, request: &FinalizeUploadRequest)
        -> UploadResult<UploadedFile>;
}

/// One direct write to object storage.
#[derive(Debug)]
pub struct StorageTransferRequest {
    /// Consumed by the transfer; never reused.
    pub authorization: UploadAuthorization,
    pub data: Bytes,
    /// Hex integrity digest asserted to the provider.
    pub integrity_digest: String,
    pub content_type: String,
    pub size: u64,
}

/// Direct writes to the object-storage provider.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Perform exactly one upload call. No internal retry.
    async fn transfer(
        &self,
        request: StorageTransferRequest,
        progress: Arc<dyn ProgressCallback>,
    ) -> UploadResult<StorageReceipt>;
}
