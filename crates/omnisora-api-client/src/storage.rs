//! Direct transfer to the object-storage provider.
//!
//! One POST to the negotiated upload URL. The body is streamed in fixed-size slices of
//! the in-memory buffer so progress can be reported as it is handed to the connection.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use omnisora_core::constants::{HEADER_CONTENT_SHA1, HEADER_FILE_NAME};
use omnisora_core::models::StorageErrorBody;
use omnisora_core::{
    ClientConfig, ObjectStorage, ProgressCallback, StorageReceipt, StorageTransferRequest,
    TransferProgress, UploadError, UploadResult,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;

use crate::{send_json, ResponseFailure};

const TRANSFER_FALLBACK_MESSAGE: &str = "Storage upload failed";
const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// Characters left literal in the storage file-name header.
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode an object name for the `X-Bz-File-Name` header.
pub fn encode_file_name(name: &str) -> String {
    utf8_percent_encode(name, FILE_NAME_ENCODE_SET).to_string()
}

/// Extract the `message` field from a storage-provider error body, if there is one.
pub(crate) fn storage_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<StorageErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|msg| !msg.trim().is_empty())
}

/// Split `data` into zero-copy slices, reporting cumulative bytes as each is yielded.
fn progress_stream(
    data: Bytes,
    progress: Arc<dyn ProgressCallback>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total_bytes = data.len() as u64;
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(TRANSFER_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + TRANSFER_CHUNK_SIZE).min(data.len())))
        .collect();

    futures::stream::iter(chunks).scan(0u64, move |bytes_sent, chunk| {
        *bytes_sent += chunk.len() as u64;
        progress.on_progress(&TransferProgress {
            bytes_sent: *bytes_sent,
            total_bytes,
        });
        futures::future::ready(Some(Ok::<Bytes, std::io::Error>(chunk)))
    })
}

/// Client for direct uploads to the storage provider.
#[derive(Clone, Debug)]
pub struct StorageClient {
    client: Client,
    config: ClientConfig,
}

impl StorageClient {
    pub fn new(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    #[tracing::instrument(
        skip(self, request, progress),
        fields(storage_file_name = %request.authorization.storage_file_name, size = request.size)
    )]
    async fn transfer(
        &self,
        request: StorageTransferRequest,
        progress: Arc<dyn ProgressCallback>,
    ) -> UploadResult<StorageReceipt> {
        let StorageTransferRequest {
            authorization,
            data,
            integrity_digest,
            content_type,
            size,
        } = request;

        if data.len() as u64 != size {
            return Err(UploadError::InvalidInput(format!(
                "Declared size {} does not match {} bytes of content",
                size,
                data.len()
            )));
        }

        let body = reqwest::Body::wrap_stream(progress_stream(data, progress));
        let http_request = self
            .client
            .post(&authorization.upload_url)
            .timeout(self.config.transfer_timeout(size))
            .header(AUTHORIZATION, authorization.authorization_token.as_str())
            .header(
                HEADER_FILE_NAME,
                encode_file_name(&authorization.storage_file_name),
            )
            .header(CONTENT_TYPE, content_type.as_str())
            .header(CONTENT_LENGTH, size)
            .header(HEADER_CONTENT_SHA1, integrity_digest.as_str())
            .body(body);

        match send_json::<StorageReceipt>(http_request).await {
            Ok(receipt) => Ok(receipt),
            Err(ResponseFailure::Transport(message)) => Err(UploadError::StorageTransferFailed {
                status: None,
                message,
            }),
            Err(ResponseFailure::Status { status, body }) => {
                Err(UploadError::StorageTransferFailed {
                    status: Some(status),
                    message: storage_error_message(&body)
                        .unwrap_or_else(|| TRANSFER_FALLBACK_MESSAGE.to_string()),
                })
            }
            Err(ResponseFailure::Decode { status, message }) => {
                Err(UploadError::StorageTransferFailed {
                    status: Some(status),
                    message,
                })
            }
        }
    }
}
