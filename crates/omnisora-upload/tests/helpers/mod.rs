//! In-memory collaborators for orchestrator tests.
//!
//! Every mock appends to one shared call log so tests can assert the exact order
//! of backend and storage calls.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use omnisora_core::models::{FinalizeUploadRequest, UploadUrlRequest};
use omnisora_core::{
    Digests, FileHandle, ObjectStorage, ProgressCallback, StorageReceipt, StorageTransferRequest,
    TransferProgress, UploadAuthorization, UploadBackend, UploadError, UploadResult, UploadedFile,
};
use omnisora_upload::{AttemptState, ContentDigester, UploadEvent};
use tokio::sync::{mpsc, Notify};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Combined {
        file_name: String,
        description: String,
        size: usize,
    },
    Authorize {
        file_name: String,
        hash: String,
    },
    Transfer {
        authorization_token: String,
        storage_file_name: String,
        integrity_digest: String,
        content_type: String,
        size: u64,
    },
    Finalize(FinalizeUploadRequest),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}

pub fn uploaded(hash: &str, tags: &[&str], download_url: &str) -> UploadedFile {
    UploadedFile {
        hash: hash.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        download_url: download_url.to_string(),
        shareable_url: None,
    }
}

pub fn receipt(file_id: &str) -> StorageReceipt {
    StorageReceipt {
        file_id: file_id.to_string(),
        file_name: None,
        content_length: None,
        content_sha1: None,
    }
}

pub fn memory_file(name: &str, mime_type: &str, size: usize) -> FileHandle {
    FileHandle::from_bytes(name, mime_type, Bytes::from(vec![0u8; size]))
}

/// Backend with scripted responses. Each successful authorization gets a fresh token.
pub struct MockBackend {
    log: CallLog,
    combined: Mutex<VecDeque<UploadResult<UploadedFile>>>,
    authorize_failures: Mutex<VecDeque<UploadError>>,
    finalize: Mutex<VecDeque<UploadResult<UploadedFile>>>,
    issued: Mutex<u32>,
}

impl MockBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            combined: Mutex::new(VecDeque::new()),
            authorize_failures: Mutex::new(VecDeque::new()),
            finalize: Mutex::new(VecDeque::new()),
            issued: Mutex::new(0),
        }
    }

    pub fn with_combined(self, result: UploadResult<UploadedFile>) -> Self {
        self.combined.lock().unwrap().push_back(result);
        self
    }

    pub fn with_authorize_failure(self, err: UploadError) -> Self {
        self.authorize_failures.lock().unwrap().push_back(err);
        self
    }

    pub fn with_finalize(self, result: UploadResult<UploadedFile>) -> Self {
        self.finalize.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl UploadBackend for MockBackend {
    async fn upload_combined(
        &self,
        file: &FileHandle,
        data: Bytes,
        description: &str,
    ) -> UploadResult<UploadedFile> {
        self.log.lock().unwrap().push(Call::Combined {
            file_name: file.name().to_string(),
            description: description.to_string(),
            size: data.len(),
        });
        self.combined
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected combined upload")
    }

    async fn request_upload_authorization(
        &self,
        request: &UploadUrlRequest,
    ) -> UploadResult<UploadAuthorization> {
        self.log.lock().unwrap().push(Call::Authorize {
            file_name: request.file_name.clone(),
            hash: request.hash.clone(),
        });
        if let Some(err) = self.authorize_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let mut issued = self.issued.lock().unwrap();
        *issued += 1;
        Ok(UploadAuthorization {
            upload_url: format!("https://storage.example/upload/{}", issued),
            authorization_token: format!("tok-{}", issued),
            storage_file_name: format!("{}_{}", request.hash, request.file_name),
            bucket_id: "bucket-1".to_string(),
        })
    }

    async fn finalize_upload(&self, request: &FinalizeUploadRequest) -> UploadResult<UploadedFile> {
        self.log
            .lock()
            .unwrap()
            .push(Call::Finalize(request.clone()));
        self.finalize
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected finalize")
    }
}

/// Pauses a transfer until released.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Storage with scripted results; reports progress in quarters before answering.
pub struct MockStorage {
    log: CallLog,
    results: Mutex<VecDeque<UploadResult<StorageReceipt>>>,
    gate: Option<Gate>,
}

impl MockStorage {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            results: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    pub fn with_result(self, result: UploadResult<StorageReceipt>) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn transfer(
        &self,
        request: StorageTransferRequest,
        progress: Arc<dyn ProgressCallback>,
    ) -> UploadResult<StorageReceipt> {
        self.log.lock().unwrap().push(Call::Transfer {
            authorization_token: request.authorization.authorization_token.clone(),
            storage_file_name: request.authorization.storage_file_name.clone(),
            integrity_digest: request.integrity_digest.clone(),
            content_type: request.content_type.clone(),
            size: request.size,
        });

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        for quarter in 1..=4u64 {
            progress.on_progress(&TransferProgress {
                bytes_sent: request.size * quarter / 4,
                total_bytes: request.size,
            });
        }

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected transfer")
    }
}

/// Returns the same digests for any input.
pub struct FixedDigester {
    pub primary: String,
    pub integrity: String,
}

impl FixedDigester {
    pub fn deadbeef() -> Self {
        Self {
            primary: "deadbeefcafe0000111122223333444455556666777788889999aaaabbbbcccc".to_string(),
            integrity: "0123456789abcdef0123456789abcdef01234567".to_string(),
        }
    }
}

#[async_trait]
impl ContentDigester for FixedDigester {
    async fn digest(&self, _data: Bytes) -> UploadResult<Digests> {
        Digests::from_hex(&self.primary, &self.integrity)
    }
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<UploadEvent>) -> Vec<UploadEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn states(events: &[UploadEvent]) -> Vec<AttemptState> {
    events
        .iter()
        .filter_map(|e| match e {
            UploadEvent::State(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

pub fn progress_values(events: &[UploadEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            UploadEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}
