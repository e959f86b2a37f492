use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use omnisora_core::{ProgressCallback, TransferProgress};

use crate::observer::UploadObserver;

/// Turns byte counts from the storage transfer into observer percentages.
///
/// Only the highest byte count seen so far is reported, so the percentage never
/// goes down even if the transport reports out of order. Values are clamped to
/// `[0, 100]`.
pub struct ProgressTracker {
    total_bytes: u64,
    max_sent: AtomicU64,
    observer: Arc<dyn UploadObserver>,
}

impl ProgressTracker {
    pub fn new(total_bytes: u64, observer: Arc<dyn UploadObserver>) -> Self {
        Self {
            total_bytes,
            max_sent: AtomicU64::new(0),
            observer,
        }
    }

    /// Highest percentage reported so far.
    pub fn percent(&self) -> f64 {
        TransferProgress {
            bytes_sent: self.max_sent.load(Ordering::Acquire),
            total_bytes: self.total_bytes,
        }
        .percent()
    }

    /// Report 100% once the provider has confirmed the object.
    pub fn complete(&self) {
        self.max_sent.fetch_max(self.total_bytes, Ordering::AcqRel);
        self.observer.on_progress(100.0);
    }
}

impl ProgressCallback for ProgressTracker {
    fn on_progress(&self, progress: &TransferProgress) {
        let sent = progress.bytes_sent.min(self.total_bytes);
        let previous = self.max_sent.fetch_max(sent, Ordering::AcqRel);
        if sent < previous {
            return;
        }
        self.observer.on_progress(self.percent());
    }
}
