//! In-process encoder double for recorder tests

use super::encoder::{
    Encoder, EncoderHandle, EncoderJob, EncoderOutcome, ExitCallback, RecordingError,
    RecordingResult,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Writes a fragment at launch, exits when cancelled
    WritesThenWaits,
    /// Creates an empty file, exits when cancelled
    WritesNothing,
    /// Writes a fragment and exits before launch returns
    ExitsImmediately,
    /// Creates an empty file and fails before launch returns
    ExitsEmpty,
    /// Creates an empty file and exits cleanly before launch returns
    FinishesEmpty,
    /// Writes a fragment and never reports an exit
    IgnoresCancel,
}

pub struct FakeEncoder {
    behavior: FakeBehavior,
    fail_launch: AtomicBool,
    launches: AtomicUsize,
}

impl FakeEncoder {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            fail_launch: AtomicBool::new(false),
            launches: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_launch(&self, fail: bool) {
        self.fail_launch.store(fail, Ordering::SeqCst);
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl Encoder for FakeEncoder {
    fn name(&self) -> &str {
        "fake"
    }

    fn launch(&self, job: EncoderJob, on_exit: ExitCallback) -> RecordingResult<EncoderHandle> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(RecordingError::RecordingLaunchFailed(
                "fake launch failure".to_string(),
            ));
        }

        let payload: &[u8] = match self.behavior {
            FakeBehavior::WritesNothing
            | FakeBehavior::ExitsEmpty
            | FakeBehavior::FinishesEmpty => b"",
            _ => &[0u8; 4096],
        };
        std::fs::write(&job.output_path, payload)?;

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        match self.behavior {
            FakeBehavior::WritesThenWaits | FakeBehavior::WritesNothing => {
                tokio::spawn(async move {
                    let _ = cancel_rx.await;
                    on_exit(EncoderOutcome::Cancelled);
                });
            }
            FakeBehavior::ExitsImmediately | FakeBehavior::ExitsEmpty => {
                drop(cancel_rx);
                on_exit(EncoderOutcome::Failed { code: Some(1) });
            }
            FakeBehavior::FinishesEmpty => {
                drop(cancel_rx);
                on_exit(EncoderOutcome::Success);
            }
            FakeBehavior::IgnoresCancel => {
                tokio::spawn(async move {
                    let _on_exit = on_exit;
                    let _ = cancel_rx.await;
                    std::future::pending::<()>().await;
                });
            }
        }

        Ok(EncoderHandle::new(cancel_tx))
    }
}
