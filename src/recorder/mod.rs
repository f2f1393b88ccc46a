//! Stream recording
//!
//! - `state`: the session state machine
//! - `encoder`: the encoder boundary and recording errors
//! - `ffmpeg`: the ffmpeg-backed encoder
//! - `manager`: the actor owning the single live session
//! - `verify`: output checks once an encoder has exited
//! - `auto_record`: start-on-playing policy
//! - `library`: finished recordings on disk

pub mod auto_record;
pub mod encoder;
pub mod ffmpeg;
pub mod library;
pub mod manager;
pub mod state;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use auto_record::{AutoRecordPolicy, PlaybackEvent};
pub use encoder::{
    Encoder, EncoderHandle, EncoderJob, EncoderOutcome, ExitCallback, RecordingError,
    RecordingResult,
};
pub use ffmpeg::FfmpegEncoder;
pub use library::RecordingEntry;
pub use manager::{RecorderOptions, RecordingEvent, RecordingManager, RecordingManagerHandle};
pub use state::{RecorderStatus, RecordingSession, SessionStatus};
