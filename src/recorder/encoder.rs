//! Encoder boundary
//!
//! The encoder is an external process the recorder can only launch, ask to
//! cancel, and hear back from through a one-shot exit callback.

use super::state::SessionStatus;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors that can occur during recording
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Already recording to {}", .0.display())]
    AlreadyRecording(PathBuf),

    #[error("Not recording")]
    NotRecording,

    #[error("Failed to start recording: {0}")]
    RecordingLaunchFailed(String),

    #[error("Recording file is empty or missing: {}", .0.display())]
    RecordingEmptyOrMissing(PathBuf),

    #[error("Invalid recording transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Recorder is not running")]
    ManagerUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;

/// What to record and where
#[derive(Debug, Clone)]
pub struct EncoderJob {
    pub input_url: String,
    pub output_path: PathBuf,
    /// Safety cap on a single file
    pub max_duration: Duration,
}

/// How the encoder process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum EncoderOutcome {
    Success,
    Cancelled,
    Failed { code: Option<i32> },
}

/// Invoked exactly once, from the encoder's own task, when it terminates
pub type ExitCallback = Box<dyn FnOnce(EncoderOutcome) + Send + 'static>;

/// Cancellation side of a running encoder.
///
/// Cancelling only requests termination; confirmation arrives later through
/// the [`ExitCallback`]. Dropping the handle counts as a cancel request.
#[derive(Debug)]
pub struct EncoderHandle {
    cancel: Option<oneshot::Sender<()>>,
}

impl EncoderHandle {
    pub fn new(cancel: oneshot::Sender<()>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    /// `true` if the request reached a still-running encoder
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Launches encoder runs
pub trait Encoder: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Start encoding `job` without waiting for frames to flow.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// `RecordingLaunchFailed` when the process cannot be started.
    fn launch(&self, job: EncoderJob, on_exit: ExitCallback) -> RecordingResult<EncoderHandle>;
}
