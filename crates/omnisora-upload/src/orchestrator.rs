//! Upload orchestrator
//!
//! Drives one attempt at a time through the state machine in [`crate::state`]:
//! small files go in one combined request; large files are digested, authorized,
//! written directly to storage and then finalized. Every step waits for the previous
//! one's validated response, and every failure ends the attempt. Nothing is retried.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use omnisora_core::constants::DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES;
use omnisora_core::models::{FinalizeUploadRequest, UploadUrlRequest};
use omnisora_core::{
    ErrorMetadata, FileHandle, LogLevel, ObjectStorage, StorageTransferRequest,
    UploadBackend, UploadError, UploadResult, UploadedFile,
};
use tracing::field::{display, Empty};
use tracing::Span;

use crate::attempt::UploadAttempt;
use crate::digest::{ContentDigester, Sha256Sha1Digester};
use crate::observer::{NoOpObserver, UploadObserver};
use crate::progress::ProgressTracker;
use crate::state::{AttemptState, AttemptStateMachine, InvalidTransition};
use crate::strategy::UploadStrategy;

const CANCELLED_REASON: &str = "cancelled";

/// Shared state machine plus the observer told about every change.
#[derive(Clone)]
struct StateHandle {
    machine: Arc<Mutex<AttemptStateMachine>>,
    observer: Arc<dyn UploadObserver>,
}

impl StateHandle {
    fn lock(&self) -> MutexGuard<'_, AttemptStateMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, next: AttemptState) -> Result<(), InvalidTransition> {
        self.lock().transition(next.clone())?;
        tracing::debug!(state = %next, "Upload state changed");
        self.observer.on_state(&next);
        Ok(())
    }

    fn fail(&self, reason: &str) {
        let changed = self.lock().fail(reason);
        if changed {
            self.observer
                .on_state(&AttemptState::Failed(reason.to_string()));
            self.observer.on_failure(reason);
        }
    }
}

/// Marks the attempt cancelled if the upload future is dropped before it finishes.
struct CancelGuard {
    state: StateHandle,
    armed: bool,
}

impl CancelGuard {
    fn arm(state: StateHandle) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Upload attempt cancelled");
            self.state.fail(CANCELLED_REASON);
        }
    }
}

/// Client-side driver of a single upload attempt.
pub struct UploadOrchestrator {
    backend: Arc<dyn UploadBackend>,
    storage: Arc<dyn ObjectStorage>,
    digester: Arc<dyn ContentDigester>,
    large_upload_threshold_bytes: u64,
    state: StateHandle,
    in_flight: tokio::sync::Mutex<()>,
}

impl UploadOrchestrator {
    pub fn new(backend: Arc<dyn UploadBackend>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            backend,
            storage,
            digester: Arc::new(Sha256Sha1Digester),
            large_upload_threshold_bytes: DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES,
            state: StateHandle {
                machine: Arc::new(Mutex::new(AttemptStateMachine::new())),
                observer: Arc::new(NoOpObserver),
            },
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Files of at least this many bytes take the direct-to-storage path.
    pub fn with_threshold(mut self, bytes: u64) -> Self {
        self.large_upload_threshold_bytes = bytes;
        self
    }

    pub fn with_digester(mut self, digester: Arc<dyn ContentDigester>) -> Self {
        self.digester = digester;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.state.observer = observer;
        self
    }

    pub fn large_upload_threshold_bytes(&self) -> u64 {
        self.large_upload_threshold_bytes
    }

    pub fn strategy_for(&self, size: u64) -> UploadStrategy {
        UploadStrategy::select(size, self.large_upload_threshold_bytes)
    }

    pub fn state(&self) -> AttemptState {
        self.state.lock().state().clone()
    }

    /// Discard a finished attempt and return to `Idle`.
    ///
    /// Fails with [`UploadError::AttemptInProgress`] while an upload is running.
    pub fn reset(&self) -> UploadResult<()> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| UploadError::AttemptInProgress)?;
        self.state.lock().reset();
        self.state.observer.on_state(&AttemptState::Idle);
        Ok(())
    }

    /// Upload `file` with its description.
    ///
    /// A previous finished attempt is discarded first. A call made while another
    /// upload is running is rejected with [`UploadError::AttemptInProgress`] and
    /// leaves the running attempt untouched. Dropping the returned future cancels
    /// the attempt; any authorization already issued is abandoned with it.
    #[tracing::instrument(
        skip(self, file, description),
        fields(
            file_name = %file.name(),
            size = file.size(),
            attempt_id = Empty,
            strategy = Empty,
            short_id = Empty,
        )
    )]
    pub async fn handle_upload(
        &self,
        file: FileHandle,
        description: String,
    ) -> UploadResult<UploadedFile> {
        let _in_flight = self.in_flight.try_lock().map_err(|_| {
            tracing::warn!("Rejected upload: another attempt is in progress");
            UploadError::AttemptInProgress
        })?;

        {
            let mut machine = self.state.lock();
            if machine.state().is_terminal() {
                machine.reset();
            }
        }

        let mut guard = CancelGuard::arm(self.state.clone());
        let result = self.run_attempt(file, description).await;
        guard.disarm();

        match &result {
            Ok(uploaded) => {
                tracing::info!(hash = %uploaded.hash, "Upload complete");
                self.state.observer.on_success(uploaded);
            }
            Err(err) => self.report_failure(err),
        }

        result
    }

    async fn run_attempt(
        &self,
        file: FileHandle,
        description: String,
    ) -> UploadResult<UploadedFile> {
        self.state.advance(AttemptState::SelectingFile)?;
        let attempt = UploadAttempt::new(file, description)?;
        Span::current().record("attempt_id", display(attempt.id));

        let strategy = self.strategy_for(attempt.file.size());
        Span::current().record("strategy", strategy.as_str());
        self.state.advance(AttemptState::StrategyChosen(strategy))?;
        tracing::info!("Upload strategy chosen");

        match strategy {
            UploadStrategy::Small => self.upload_small(attempt).await,
            UploadStrategy::Large => self.upload_large(attempt).await,
        }
    }

    async fn upload_small(&self, attempt: UploadAttempt) -> UploadResult<UploadedFile> {
        self.state.advance(AttemptState::Transferring)?;
        let data = attempt.file.read_all().await?;

        let uploaded = self
            .backend
            .upload_combined(&attempt.file, data, &attempt.description)
            .await?;

        self.state.advance(AttemptState::Done)?;
        Ok(uploaded)
    }

    async fn upload_large(&self, mut attempt: UploadAttempt) -> UploadResult<UploadedFile> {
        self.state.advance(AttemptState::Digesting)?;
        let data = attempt.file.read_all().await.map_err(|err| match err {
            UploadError::FileRead(message) => UploadError::DigestComputation(message),
            other => other,
        })?;
        let digests = self.digester.digest(data.clone()).await?;
        let short_id = digests.short_id();
        let integrity_digest = digests.integrity().to_string();
        attempt.digests = Some(digests);
        Span::current().record("short_id", short_id.as_str());

        self.state.advance(AttemptState::Authorizing)?;
        let authorization = self
            .backend
            .request_upload_authorization(&UploadUrlRequest {
                file_name: attempt.file.name().to_string(),
                hash: short_id.to_string(),
            })
            .await?;
        tracing::info!(
            storage_file_name = %authorization.storage_file_name,
            bucket_id = %authorization.bucket_id,
            "Upload authorized"
        );
        attempt.authorize(authorization);

        self.state.advance(AttemptState::Transferring)?;
        let size = data.len() as u64;
        let tracker = Arc::new(ProgressTracker::new(size, self.state.observer.clone()));
        let receipt = self
            .storage
            .transfer(
                StorageTransferRequest {
                    authorization: attempt.take_authorization()?,
                    data,
                    integrity_digest,
                    content_type: attempt.file.content_type().to_string(),
                    size,
                },
                tracker.clone(),
            )
            .await?;
        tracker.complete();
        tracing::info!(storage_file_id = %receipt.file_id, "Storage transfer complete");
        attempt.receipt = Some(receipt);

        self.state.advance(AttemptState::Finalizing)?;
        let request = finalize_request(&attempt)?;
        let uploaded = self.backend.finalize_upload(&request).await?;

        self.state.advance(AttemptState::Done)?;
        Ok(uploaded)
    }

    fn report_failure(&self, err: &UploadError) {
        match err.log_level() {
            LogLevel::Error => {
                tracing::error!(error = %err, code = err.error_code(), "Upload failed")
            }
            LogLevel::Warn => {
                tracing::warn!(error = %err, code = err.error_code(), "Upload failed")
            }
            LogLevel::Debug => {
                tracing::debug!(error = %err, code = err.error_code(), "Upload failed")
            }
        }

        if let UploadError::FinalizationFailed {
            bucket_id,
            storage_file_name,
            storage_file_id,
            ..
        } = err
        {
            tracing::error!(
                %bucket_id,
                %storage_file_name,
                %storage_file_id,
                "Object is in storage but was not recorded; reconcile manually"
            );
        }

        self.state.fail(&err.client_message());
    }
}

fn finalize_request(attempt: &UploadAttempt) -> UploadResult<FinalizeUploadRequest> {
    let (Some(short_id), Some(target), Some(receipt)) =
        (attempt.short_id(), &attempt.target, &attempt.receipt)
    else {
        return Err(UploadError::InvalidInput(
            "Finalize requires digests and a storage receipt".to_string(),
        ));
    };

    Ok(FinalizeUploadRequest {
        hash: short_id.to_string(),
        description: attempt.description.clone(),
        original_filename: attempt.file.name().to_string(),
        size: attempt.file.size(),
        mimetype: attempt.file.mime_type().to_string(),
        bucket_id: target.bucket_id.clone(),
        storage_file_name: target.storage_file_name.clone(),
        storage_file_id: receipt.file_id.clone(),
    })
}
