//! Error types module
//!
//! Every failure of an upload attempt is expressed as an `UploadError`. Each variant
//! corresponds to the step that raised it, so callers can tell "nothing was stored"
//! apart from "the object is in storage but has no catalog entry".

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a denied authorization
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error reporting - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORAGE_TRANSFER_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the attempt from file selection fixes the failure.
    ///
    /// A `FinalizationFailed` inconsistency is recovered by reconciling the stored
    /// object (see `suggested_action`), not by retrying, so it reports `false`.
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (the collaborator's own text when it supplied one)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Digest computation failed: {0}")]
    DigestComputation(String),

    #[error("Upload authorization denied (status {status}): {message}")]
    AuthorizationDenied { status: u16, message: String },

    #[error("Upload authorization unavailable: {0}")]
    NegotiationUnavailable(String),

    #[error("Storage transfer failed: {message}")]
    StorageTransferFailed {
        status: Option<u16>,
        message: String,
    },

    /// The object exists in storage but the backend did not record it.
    #[error("Finalization failed for {storage_file_name} ({storage_file_id}): {message}")]
    FinalizationFailed {
        status: Option<u16>,
        message: String,
        bucket_id: String,
        storage_file_name: String,
        storage_file_id: String,
    },

    #[error("Upload failed: {message}")]
    CombinedTransferFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("An upload attempt is already in progress")]
    AttemptInProgress,
}

impl From<io::Error> for UploadError {
    fn from(err: io::Error) -> Self {
        UploadError::FileRead(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        UploadError::DigestComputation(_) => (
            "DIGEST_COMPUTATION_ERROR",
            true,
            Some("Select the file again and retry"),
            LogLevel::Error,
        ),
        UploadError::AuthorizationDenied { .. } => (
            "AUTHORIZATION_DENIED",
            false,
            Some("Check account limits and the file name"),
            LogLevel::Warn,
        ),
        UploadError::NegotiationUnavailable(_) => (
            "NEGOTIATION_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        UploadError::StorageTransferFailed { .. } => (
            "STORAGE_TRANSFER_FAILED",
            true,
            Some("Retry the upload; a fresh authorization will be requested"),
            LogLevel::Error,
        ),
        // Reconciled out of band; a retry re-uploads the bytes and orphans the first copy.
        UploadError::FinalizationFailed { .. } => (
            "FINALIZATION_FAILED",
            false,
            Some("Contact support with the storage file id to reconcile the upload"),
            LogLevel::Error,
        ),
        UploadError::CombinedTransferFailed { .. } => (
            "COMBINED_TRANSFER_FAILED",
            true,
            Some("Retry the upload"),
            LogLevel::Warn,
        ),
        UploadError::Network(_) => (
            "NETWORK_ERROR",
            true,
            Some("Check connectivity and retry"),
            LogLevel::Warn,
        ),
        UploadError::FileRead(_) => (
            "FILE_READ_ERROR",
            true,
            Some("Check the file still exists and is readable"),
            LogLevel::Warn,
        ),
        UploadError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the file and description"),
            LogLevel::Debug,
        ),
        UploadError::AttemptInProgress => (
            "ATTEMPT_IN_PROGRESS",
            true,
            Some("Wait for the current upload to finish"),
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::AuthorizationDenied { message, .. }
            | UploadError::StorageTransferFailed { message, .. }
            | UploadError::FinalizationFailed { message, .. }
            | UploadError::CombinedTransferFailed { message, .. } => message.clone(),
            UploadError::DigestComputation(msg)
            | UploadError::NegotiationUnavailable(msg)
            | UploadError::Network(msg)
            | UploadError::FileRead(msg)
            | UploadError::InvalidInput(msg) => msg.clone(),
            UploadError::AttemptInProgress => self.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).3
    }
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_is_collaborator_text() {
        let err = UploadError::AuthorizationDenied {
            status: 403,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.client_message(), "quota exceeded");
        assert_eq!(err.error_code(), "AUTHORIZATION_DENIED");
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn finalization_failure_needs_reconciliation_not_retry() {
        let err = UploadError::FinalizationFailed {
            status: Some(500),
            message: "Failed to finalize upload".to_string(),
            bucket_id: "bucket".to_string(),
            storage_file_name: "deadbeefcafe_movie.mp4".to_string(),
            storage_file_id: "b2-1".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(err
            .suggested_action()
            .is_some_and(|action| action.contains("storage file id")));
        assert_eq!(err.log_level(), LogLevel::Error);
        assert!(err.to_string().contains("b2-1"));
    }

    #[test]
    fn io_error_maps_to_file_read() {
        let err: UploadError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, UploadError::FileRead(_)));
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }

    #[test]
    fn storage_transfer_failure_suggests_fresh_authorization() {
        let err = UploadError::StorageTransferFailed {
            status: None,
            message: "connection reset".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(err
            .suggested_action()
            .is_some_and(|action| action.contains("fresh authorization")));
    }
}
