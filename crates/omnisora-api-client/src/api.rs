//! Backend endpoints used by the upload flow.
//!
//! Each call maps transport, status and decode failures onto the error variant of
//! the step it belongs to, keeping the backend's own `error` text when it sent one.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use omnisora_core::constants::{
    FINALIZE_UPLOAD_PATH, GET_UPLOAD_URL_PATH, RECENT_UPLOADS_PATH, UPLOAD_PATH,
};
use omnisora_core::models::{
    BackendErrorBody, CombinedUploadResponse, FinalizeUploadRequest, FinalizeUploadResponse,
    RecentUpload, UploadUrlRequest, UploadUrlResponse,
};
use omnisora_core::{
    FileHandle, UploadAuthorization, UploadBackend, UploadError, UploadResult, UploadedFile,
};

use crate::{ApiClient, ResponseFailure};

const COMBINED_FALLBACK_MESSAGE: &str = "Upload failed";
const NEGOTIATE_FALLBACK_MESSAGE: &str = "Failed to get upload URL";
const FINALIZE_FALLBACK_MESSAGE: &str = "Failed to finalize upload";
const RECENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Extract the `error` field from a backend error body, if there is one.
pub(crate) fn backend_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<BackendErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
}

impl ApiClient {
    /// Most recent uploads, newest first. Listing is informational: failures are
    /// logged and produce an empty list.
    pub async fn recent_uploads(&self, limit: Option<u32>) -> Vec<RecentUpload> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(l) = limit {
            query.push(("limit", l.to_string()));
        }

        match self
            .get::<Vec<RecentUpload>>(RECENT_UPLOADS_PATH, &query, RECENT_TIMEOUT)
            .await
        {
            Ok(mut uploads) => {
                if let Some(l) = limit {
                    uploads.truncate(l as usize);
                }
                uploads
            }
            Err(failure) => {
                tracing::warn!(failure = ?failure, "Failed to fetch recent uploads");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl UploadBackend for ApiClient {
    #[tracing::instrument(skip(self, file, data, description), fields(file_name = %file.name(), size = file.size()))]
    async fn upload_combined(
        &self,
        file: &FileHandle,
        data: Bytes,
        description: &str,
    ) -> UploadResult<UploadedFile> {
        let length = data.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(data, length)
            .file_name(file.name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| UploadError::InvalidInput(format!("Invalid MIME type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("description", description.to_string());

        let result = self
            .post_multipart::<CombinedUploadResponse>(
                UPLOAD_PATH,
                form,
                self.config().combined_timeout(),
            )
            .await;

        match result {
            Ok(response) => response.into_uploaded().map_err(|message| {
                UploadError::CombinedTransferFailed {
                    status: None,
                    message: message.unwrap_or_else(|| COMBINED_FALLBACK_MESSAGE.to_string()),
                }
            }),
            Err(ResponseFailure::Transport(message)) => Err(UploadError::Network(message)),
            Err(ResponseFailure::Status { status, body }) => {
                Err(UploadError::CombinedTransferFailed {
                    status: Some(status),
                    message: backend_error_message(&body)
                        .unwrap_or_else(|| COMBINED_FALLBACK_MESSAGE.to_string()),
                })
            }
            Err(ResponseFailure::Decode { status, message }) => {
                Err(UploadError::CombinedTransferFailed {
                    status: Some(status),
                    message,
                })
            }
        }
    }

    #[tracing::instrument(skip(self, request), fields(short_id = %request.hash))]
    async fn request_upload_authorization(
        &self,
        request: &UploadUrlRequest,
    ) -> UploadResult<UploadAuthorization> {
        let result = self
            .post_json::<UploadUrlResponse, _>(
                GET_UPLOAD_URL_PATH,
                request,
                self.config().negotiate_timeout(),
            )
            .await;

        match result {
            Ok(response) => Ok(response.into()),
            Err(ResponseFailure::Transport(message)) => {
                Err(UploadError::NegotiationUnavailable(message))
            }
            Err(ResponseFailure::Status { status, body }) => Err(UploadError::AuthorizationDenied {
                status,
                message: backend_error_message(&body)
                    .unwrap_or_else(|| NEGOTIATE_FALLBACK_MESSAGE.to_string()),
            }),
            Err(ResponseFailure::Decode { message, .. }) => {
                Err(UploadError::NegotiationUnavailable(message))
            }
        }
    }

    #[tracing::instrument(skip(self, request), fields(short_id = %request.hash, storage_file_id = %request.storage_file_id))]
    async fn finalize_upload(&self, request: &FinalizeUploadRequest) -> UploadResult<UploadedFile> {
        let result = self
            .post_json::<FinalizeUploadResponse, _>(
                FINALIZE_UPLOAD_PATH,
                request,
                self.config().finalize_timeout(),
            )
            .await;

        let (status, message) = match result {
            Ok(response) => return Ok(response.into()),
            Err(ResponseFailure::Transport(message)) => (None, message),
            Err(ResponseFailure::Status { status, body }) => (
                Some(status),
                backend_error_message(&body)
                    .unwrap_or_else(|| FINALIZE_FALLBACK_MESSAGE.to_string()),
            ),
            Err(ResponseFailure::Decode { status, message }) => (Some(status), message),
        };

        Err(UploadError::FinalizationFailed {
            status,
            message,
            bucket_id: request.bucket_id.clone(),
            storage_file_name: request.storage_file_name.clone(),
            storage_file_id: request.storage_file_id.clone(),
        })
    }
}
