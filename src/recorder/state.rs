//! Recording state management
//!
//! Defines the session state machine and the single recording session the
//! manager owns.

use super::encoder::{EncoderHandle, EncoderOutcome, RecordingError, RecordingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Lifecycle of one encoder run
///
/// ```text
/// Idle -> Starting -> Active -> Stopping -> Finalized | Failed
/// Starting -> Failed              (launch failed)
/// Active -> Finalized | Failed    (encoder exited on its own)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Starting,
    Active,
    Stopping,
    Finalized,
    Failed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionStatus {
    /// Holds the recorder: no other session may start
    pub fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Active | Self::Stopping)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }

    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Idle, Starting)
                | (Starting, Active)
                | (Starting, Failed)
                | (Active, Stopping)
                | (Active, Finalized)
                | (Active, Failed)
                | (Stopping, Finalized)
                | (Stopping, Failed)
        )
    }
}

/// One encoder run against one stream URL, producing one file.
///
/// Never reused: once terminal it is dropped and a fresh session is created
/// for the next recording.
pub struct RecordingSession {
    id: Uuid,
    stream_url: String,
    output_path: PathBuf,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    started: Instant,
    encoder: Option<EncoderHandle>,
    completion: Option<oneshot::Receiver<EncoderOutcome>>,
}

impl RecordingSession {
    pub fn new(stream_url: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            stream_url: stream_url.into(),
            output_path,
            status: SessionStatus::Idle,
            started_at: Utc::now(),
            started: Instant::now(),
            encoder: None,
            completion: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn transition(&mut self, next: SessionStatus) -> RecordingResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(RecordingError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::debug!("Session {}: {:?} -> {:?}", self.id, self.status, next);
        self.status = next;
        Ok(())
    }

    /// Keep the encoder's cancel handle and its completion signal
    pub fn attach_encoder(
        &mut self,
        handle: EncoderHandle,
        completion: oneshot::Receiver<EncoderOutcome>,
    ) {
        self.encoder = Some(handle);
        self.completion = Some(completion);
    }

    /// Request cancellation; `false` if the encoder was already gone
    pub fn cancel_encoder(&mut self) -> bool {
        self.encoder.as_mut().is_some_and(EncoderHandle::cancel)
    }

    pub fn take_completion(&mut self) -> Option<oneshot::Receiver<EncoderOutcome>> {
        self.completion.take()
    }

    pub fn snapshot(&self) -> RecorderStatus {
        RecorderStatus {
            status: self.status,
            session_id: Some(self.id),
            output_path: Some(self.output_path.to_string_lossy().to_string()),
            started_at: Some(self.started_at),
            elapsed_ms: if self.status.is_live() {
                self.elapsed_ms()
            } else {
                0
            },
        }
    }
}

/// Recorder state as reported to the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderStatus {
    pub status: SessionStatus,
    pub session_id: Option<Uuid>,
    pub output_path: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    /// Zero when idle
    pub elapsed_ms: u64,
}

impl RecorderStatus {
    pub fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            session_id: None,
            output_path: None,
            started_at: None,
            elapsed_ms: 0,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.status.is_live()
    }
}
