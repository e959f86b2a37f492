//! OmniSora Core Library
//!
//! This crate provides the domain models, error types, configuration and collaborator
//! traits shared by the upload orchestrator, the HTTP client and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ErrorMetadata, LogLevel, UploadError, UploadResult};
pub use models::{
    Digests, FileHandle, ShortId, StorageReceipt, StorageTarget, UploadAuthorization,
    UploadedFile,
};
pub use traits::{
    NoOpProgress, ObjectStorage, ProgressCallback, StorageTransferRequest, TransferProgress,
    UploadBackend,
};
