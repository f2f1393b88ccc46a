//! Output verification
//!
//! The encoder may still be flushing when its exit is observed, so the file
//! size is polled until it stops changing before deciding whether the
//! recording produced anything.

use super::encoder::{RecordingError, RecordingResult};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Poll `path` until two consecutive readings agree or `timeout` passes.
///
/// Returns the last observed size, `None` if the file never appeared.
pub async fn wait_for_stable_size(path: &Path, poll: Duration, timeout: Duration) -> Option<u64> {
    let deadline = Instant::now() + timeout;
    let mut last: Option<u64> = None;

    loop {
        let current = tokio::fs::metadata(path).await.ok().map(|m| m.len());
        if current.is_some() && current == last {
            return current;
        }
        last = current;

        if Instant::now() >= deadline {
            return last;
        }
        tokio::time::sleep(poll).await;
    }
}

/// Size of a finished recording, or `RecordingEmptyOrMissing`.
///
/// Zero-byte leftovers are removed so they never show up in the library.
pub async fn verify_output(path: &Path, poll: Duration, timeout: Duration) -> RecordingResult<u64> {
    match wait_for_stable_size(path, poll, timeout).await {
        Some(size) if size > 0 => {
            tracing::info!("Recording verified: {:?} ({} bytes)", path, size);
            Ok(size)
        }
        Some(_) => {
            tracing::warn!("Recording is empty, removing {:?}", path);
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!("Failed to remove empty recording {:?}: {}", path, e);
            }
            Err(RecordingError::RecordingEmptyOrMissing(path.to_path_buf()))
        }
        None => {
            tracing::warn!("Recording file was never created: {:?}", path);
            Err(RecordingError::RecordingEmptyOrMissing(path.to_path_buf()))
        }
    }
}
