//! Command handlers
//!
//! The operations a frontend can invoke. Every handler takes the shared
//! [`AppState`] and reports failures as an [`ErrorResponse`] with a stable
//! code.

pub mod camera;
pub mod discovery;
pub mod recording;

use crate::api::CamApiClient;
use crate::config::AppConfig;
use crate::discovery::HostDiscoveryService;
use crate::recorder::{
    AutoRecordPolicy, Encoder, FfmpegEncoder, RecorderOptions, RecordingManager,
    RecordingManagerHandle,
};
use crate::storage::LocalStore;
use crate::utils::{AppResult, ErrorResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Result type returned by every command
pub type CommandResult<T> = Result<T, ErrorResponse>;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<LocalStore>,
    pub discovery: HostDiscoveryService,
    pub recorder: RecordingManagerHandle,
    pub api: CamApiClient,
    /// Held across the start call so two `Playing` events cannot both fire
    pub(crate) auto_record: Mutex<AutoRecordPolicy>,
}

impl AppState {
    /// Build the production state: OS interfaces, ffmpeg, the store under
    /// `data_dir`. Spawns the recorder actor, so call it inside a runtime.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let store = LocalStore::open(config.store_path())?;
        let discovery = HostDiscoveryService::from_config(&config);
        let encoder = Arc::new(FfmpegEncoder::from_settings(&config.recording));
        Self::with_parts(config, store, discovery, encoder)
    }

    pub fn with_parts(
        config: AppConfig,
        store: LocalStore,
        discovery: HostDiscoveryService,
        encoder: Arc<dyn Encoder>,
    ) -> AppResult<Self> {
        let api = CamApiClient::new(
            &store.server_url(),
            store.stream_credentials(),
            Duration::from_millis(config.api.request_timeout_ms),
        )?;
        let recorder = RecordingManager::spawn(encoder, RecorderOptions::from(&config));
        let auto_record =
            Mutex::new(AutoRecordPolicy::new(config.recording.auto_record_on_playing));

        Ok(Self {
            config,
            store: Arc::new(store),
            discovery,
            recorder,
            api,
            auto_record,
        })
    }

    /// Best-effort history entry; a failed write is logged, never surfaced
    pub(crate) fn record_history(&self, action: &str, details: Option<&str>) {
        use crate::discovery::CameraRegistry;

        if let Err(e) = self.store.add_history(action, details) {
            tracing::warn!("Failed to record {} in history: {}", action, e);
        }
    }
}
