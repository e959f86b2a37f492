//! OmniSora Upload
//!
//! Client-side orchestration of one upload attempt: content digests, size-based
//! strategy selection, and the state machine that drives either the combined
//! transfer (small files) or negotiate → direct transfer → finalize (large files).

pub mod attempt;
pub mod digest;
pub mod observer;
pub mod orchestrator;
pub mod progress;
pub mod state;
pub mod strategy;

pub use digest::{compute_digests, ContentDigester, Sha256Sha1Digester};
pub use observer::{ChannelObserver, NoOpObserver, UploadEvent, UploadObserver};
pub use orchestrator::UploadOrchestrator;
pub use progress::ProgressTracker;
pub use state::{AttemptState, AttemptStateMachine, InvalidTransition};
pub use strategy::UploadStrategy;
