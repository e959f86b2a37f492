//! Observers of an upload attempt.
//!
//! The orchestrator reports coarse state changes, transfer progress (direct-to-storage
//! uploads only), and exactly one terminal signal per attempt.

use omnisora_core::UploadedFile;
use tokio::sync::mpsc;

use crate::state::AttemptState;

/// Receives the observable signals of an attempt. All methods default to no-ops.
///
/// Called inline from the upload task; implementations should return quickly.
pub trait UploadObserver: Send + Sync {
    fn on_state(&self, _state: &AttemptState) {}

    /// Percentage in `[0, 100]`, non-decreasing within one attempt.
    fn on_progress(&self, _percent: f64) {}

    fn on_success(&self, _file: &UploadedFile) {}

    /// `message` is the user-visible reason.
    fn on_failure(&self, _message: &str) {}
}

/// Ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl UploadObserver for NoOpObserver {}

/// One observable signal, as delivered by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    State(AttemptState),
    Progress(f64),
    Succeeded(UploadedFile),
    Failed(String),
}

/// Forwards every signal into an unbounded channel.
///
/// Sends to a closed receiver are dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<UploadEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UploadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: UploadEvent) {
        let _ = self.tx.send(event);
    }
}

impl UploadObserver for ChannelObserver {
    fn on_state(&self, state: &AttemptState) {
        self.send(UploadEvent::State(state.clone()));
    }

    fn on_progress(&self, percent: f64) {
        self.send(UploadEvent::Progress(percent));
    }

    fn on_success(&self, file: &UploadedFile) {
        self.send(UploadEvent::Succeeded(file.clone()));
    }

    fn on_failure(&self, message: &str) {
        self.send(UploadEvent::Failed(message.to_string()));
    }
}
