//! Data models for the upload client
//!
//! Types describing one upload attempt (file, digests, authorization, receipt,
//! result) and the bodies exchanged with the backend and the storage provider.

pub mod digest;
pub mod file;
pub mod upload;
pub mod wire;

pub use digest::{Digests, ShortId};
pub use file::FileHandle;
pub use upload::{StorageReceipt, StorageTarget, UploadAuthorization, UploadedFile};
pub use wire::{
    BackendErrorBody, CombinedUploadResponse, FinalizeUploadRequest, FinalizeUploadResponse,
    RecentUpload, StorageErrorBody, UploadUrlRequest, UploadUrlResponse,
};
