//! Recording manager
//!
//! A single actor task owns the one live [`RecordingSession`]. Callers talk to
//! it through a cloneable [`RecordingManagerHandle`], so start/stop/status are
//! serialized without locks and encoder exits arrive on the same loop.

use super::encoder::{
    Encoder, EncoderJob, EncoderOutcome, ExitCallback, RecordingError, RecordingResult,
};
use super::state::{RecorderStatus, RecordingSession, SessionStatus};
use super::verify::verify_output;
use crate::config::AppConfig;
use chrono::Local;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

/// Knobs the manager needs from the application config
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    pub recordings_dir: PathBuf,
    pub max_duration: Duration,
    /// How long `stop` waits for the encoder to confirm exit
    pub stop_timeout: Duration,
    pub settle_poll: Duration,
    pub settle_timeout: Duration,
}

impl From<&AppConfig> for RecorderOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            recordings_dir: config.recordings_dir(),
            max_duration: Duration::from_secs(config.recording.max_duration_secs),
            stop_timeout: config.recording.stop_timeout(),
            settle_poll: config.recording.settle_poll(),
            settle_timeout: config.recording.settle_timeout(),
        }
    }
}

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RecordingEvent {
    #[serde(rename_all = "camelCase")]
    Started { session_id: Uuid, path: PathBuf },
    #[serde(rename_all = "camelCase")]
    Finalized {
        path: PathBuf,
        size_bytes: u64,
        duration_ms: u64,
    },
    Failed { path: PathBuf, reason: String },
}

enum ManagerCommand {
    Start {
        stream_url: String,
        exclusive: bool,
        reply: oneshot::Sender<RecordingResult<PathBuf>>,
    },
    Stop {
        reply: oneshot::Sender<RecordingResult<PathBuf>>,
    },
    Status {
        reply: oneshot::Sender<RecorderStatus>,
    },
}

struct EncoderExit {
    session_id: Uuid,
    outcome: EncoderOutcome,
}

/// Owns the current session and the encoder that feeds it
pub struct RecordingManager {
    encoder: Arc<dyn Encoder>,
    options: RecorderOptions,
    cmd_rx: mpsc::Receiver<ManagerCommand>,
    exit_tx: mpsc::UnboundedSender<EncoderExit>,
    exit_rx: mpsc::UnboundedReceiver<EncoderExit>,
    events: broadcast::Sender<RecordingEvent>,
    session: Option<RecordingSession>,
    /// Paths handed out in this process, so retries never reuse a name
    issued_paths: HashSet<PathBuf>,
}

impl RecordingManager {
    /// Spawn the actor on the current runtime and return its handle.
    ///
    /// The actor stops, cancelling any live encoder, once every handle has
    /// been dropped.
    pub fn spawn(encoder: Arc<dyn Encoder>, options: RecorderOptions) -> RecordingManagerHandle {
        let (tx, cmd_rx) = mpsc::channel(32);
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(64);

        tracing::info!(
            "Recording manager using {} encoder, output in {:?}",
            encoder.name(),
            options.recordings_dir
        );

        let manager = Self {
            encoder,
            options,
            cmd_rx,
            exit_tx,
            exit_rx,
            events: events.clone(),
            session: None,
            issued_paths: HashSet::new(),
        };
        tokio::spawn(manager.run());

        RecordingManagerHandle { tx, events }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                Some(exit) = self.exit_rx.recv() => {
                    self.handle_encoder_exit(exit).await;
                }
            }
        }

        if let Some(mut session) = self.session.take() {
            tracing::warn!("Recorder shutting down with a live session, cancelling encoder");
            session.cancel_encoder();
        }
        tracing::debug!("Recording manager stopped");
    }

    async fn handle_command(&mut self, cmd: ManagerCommand) {
        match cmd {
            ManagerCommand::Start {
                stream_url,
                exclusive,
                reply,
            } => {
                let result = self.start(stream_url, exclusive).await;
                let _ = reply.send(result);
            }
            ManagerCommand::Stop { reply } => {
                let result = self.stop().await;
                let _ = reply.send(result);
            }
            ManagerCommand::Status { reply } => {
                let status = self
                    .session
                    .as_ref()
                    .map(RecordingSession::snapshot)
                    .unwrap_or_else(RecorderStatus::idle);
                let _ = reply.send(status);
            }
        }
    }

    async fn start(&mut self, stream_url: String, exclusive: bool) -> RecordingResult<PathBuf> {
        if let Some(session) = self.session.as_ref().filter(|s| s.status().is_live()) {
            let path = session.output_path().to_path_buf();
            if exclusive {
                return Err(RecordingError::AlreadyRecording(path));
            }
            tracing::warn!("Already recording to {:?}, ignoring start", path);
            return Ok(path);
        }

        if stream_url.trim().is_empty() {
            return Err(RecordingError::RecordingLaunchFailed(
                "Stream URL is empty".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.options.recordings_dir)
            .await
            .map_err(|e| {
                RecordingError::RecordingLaunchFailed(format!(
                    "Failed to create recordings directory: {}",
                    e
                ))
            })?;

        let output_path = self.next_output_path();
        let mut session = RecordingSession::new(stream_url, output_path.clone());
        session.transition(SessionStatus::Starting)?;

        let session_id = session.id();
        let (done_tx, done_rx) = oneshot::channel();
        let exit_tx = self.exit_tx.clone();
        let on_exit: ExitCallback = Box::new(move |outcome| {
            let _ = done_tx.send(outcome);
            let _ = exit_tx.send(EncoderExit {
                session_id,
                outcome,
            });
        });

        let job = EncoderJob {
            input_url: session.stream_url().to_string(),
            output_path: output_path.clone(),
            max_duration: self.options.max_duration,
        };

        match self.encoder.launch(job, on_exit) {
            Ok(handle) => {
                session.attach_encoder(handle, done_rx);
                session.transition(SessionStatus::Active)?;
                tracing::info!("Recording started: {:?}", output_path);
                let _ = self.events.send(RecordingEvent::Started {
                    session_id,
                    path: output_path.clone(),
                });
                self.session = Some(session);
                Ok(output_path)
            }
            Err(e) => {
                let _ = session.transition(SessionStatus::Failed);
                tracing::error!("Failed to launch {} encoder: {}", self.encoder.name(), e);
                let _ = self.events.send(RecordingEvent::Failed {
                    path: output_path,
                    reason: e.to_string(),
                });
                Err(match e {
                    RecordingError::RecordingLaunchFailed(_) => e,
                    other => RecordingError::RecordingLaunchFailed(other.to_string()),
                })
            }
        }
    }

    async fn stop(&mut self) -> RecordingResult<PathBuf> {
        let Some(mut session) = self.session.take() else {
            return Err(RecordingError::NotRecording);
        };

        session.transition(SessionStatus::Stopping)?;
        tracing::info!("Stopping recording: {:?}", session.output_path());

        let completion = session.take_completion();
        if !session.cancel_encoder() {
            tracing::debug!("Encoder had already exited");
        }

        if let Some(completion) = completion {
            match tokio::time::timeout(self.options.stop_timeout, completion).await {
                Ok(Ok(outcome)) => tracing::debug!("Encoder exited: {:?}", outcome),
                Ok(Err(_)) => tracing::warn!("Encoder went away without reporting its exit"),
                Err(_) => tracing::warn!(
                    "Encoder did not exit within {:?}, verifying output anyway",
                    self.options.stop_timeout
                ),
            }
        }

        self.finalize(session).await
    }

    /// The encoder stopped without being asked
    async fn handle_encoder_exit(&mut self, exit: EncoderExit) {
        let is_current = self
            .session
            .as_ref()
            .is_some_and(|s| s.id() == exit.session_id && s.status() == SessionStatus::Active);
        if !is_current {
            tracing::debug!("Ignoring exit of stale session {}", exit.session_id);
            return;
        }

        let Some(mut session) = self.session.take() else {
            return;
        };

        if exit.outcome == EncoderOutcome::Success {
            // Reached the duration cap
            tracing::info!("Encoder finished: {:?}", session.output_path());
            if let Err(e) = self.finalize(session).await {
                tracing::error!("Recording ended without usable output: {}", e);
            }
            return;
        }

        tracing::error!("Encoder exited unexpectedly: {:?}", exit.outcome);
        let _ = session.transition(SessionStatus::Failed);
        let path = session.output_path().to_path_buf();

        // A non-empty fragment is still playable and stays in the library
        let kept =
            verify_output(&path, self.options.settle_poll, self.options.settle_timeout).await;
        if let Ok(size) = kept {
            tracing::warn!("Keeping partial recording {:?} ({} bytes)", path, size);
        }

        let _ = self.events.send(RecordingEvent::Failed {
            path,
            reason: format!("Encoder exited unexpectedly: {:?}", exit.outcome),
        });
    }

    async fn finalize(&mut self, mut session: RecordingSession) -> RecordingResult<PathBuf> {
        let path = session.output_path().to_path_buf();
        let duration_ms = session.elapsed_ms();

        match verify_output(&path, self.options.settle_poll, self.options.settle_timeout).await {
            Ok(size_bytes) => {
                session.transition(SessionStatus::Finalized)?;
                tracing::info!("Recording saved: {:?} ({} bytes)", path, size_bytes);
                let _ = self.events.send(RecordingEvent::Finalized {
                    path: path.clone(),
                    size_bytes,
                    duration_ms,
                });
                Ok(path)
            }
            Err(e) => {
                let _ = session.transition(SessionStatus::Failed);
                let _ = self.events.send(RecordingEvent::Failed {
                    path,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn next_output_path(&mut self) -> PathBuf {
        let stem = format!("recording_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let dir = &self.options.recordings_dir;

        let mut candidate = dir.join(format!("{}.mp4", stem));
        let mut suffix = 2;
        while self.issued_paths.contains(&candidate) || candidate.exists() {
            candidate = dir.join(format!("{}_{}.mp4", stem, suffix));
            suffix += 1;
        }

        self.issued_paths.insert(candidate.clone());
        candidate
    }
}

/// Handle for communicating with the [`RecordingManager`]
#[derive(Clone)]
pub struct RecordingManagerHandle {
    tx: mpsc::Sender<ManagerCommand>,
    events: broadcast::Sender<RecordingEvent>,
}

impl RecordingManagerHandle {
    /// Start recording `stream_url`.
    ///
    /// Idempotent: while a session is live this returns its output path and
    /// launches nothing.
    pub async fn start(&self, stream_url: impl Into<String>) -> RecordingResult<PathBuf> {
        let stream_url = stream_url.into();
        self.request(|reply| ManagerCommand::Start {
            stream_url,
            exclusive: false,
            reply,
        })
        .await?
    }

    /// Like [`start`](Self::start) but fails with `AlreadyRecording` when a
    /// session is live
    pub async fn start_exclusive(&self, stream_url: impl Into<String>) -> RecordingResult<PathBuf> {
        let stream_url = stream_url.into();
        self.request(|reply| ManagerCommand::Start {
            stream_url,
            exclusive: true,
            reply,
        })
        .await?
    }

    /// Stop the live session and return the verified output file
    pub async fn stop(&self) -> RecordingResult<PathBuf> {
        self.request(|reply| ManagerCommand::Stop { reply }).await?
    }

    pub async fn status(&self) -> RecordingResult<RecorderStatus> {
        self.request(|reply| ManagerCommand::Status { reply }).await
    }

    pub async fn is_recording(&self) -> bool {
        self.status()
            .await
            .map(|status| status.is_recording())
            .unwrap_or(false)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.events.subscribe()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ManagerCommand,
    ) -> RecordingResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| RecordingError::ManagerUnavailable)?;
        rx.await.map_err(|_| RecordingError::ManagerUnavailable)
    }
}
