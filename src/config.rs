//! Application configuration
//!
//! Loaded from `$CAMSTREAM_CONFIG`, or `config.json` under the XDG config
//! directory. A default file is written on first run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Well-known port of the camera's HTTP service
pub const CAMERA_PORT: u16 = 5000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Root for the key-value store and the recordings directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_camera_port")]
    pub camera_port: u16,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub recording: RecordingSettings,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_host_range_low")]
    pub host_range_low: u8,

    #[serde(default = "default_host_range_high")]
    pub host_range_high: u8,

    #[serde(default = "default_per_host_timeout_ms")]
    pub per_host_timeout_ms: u64,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Wall-clock ceiling for one subnet scan
    #[serde(default = "default_scan_ceiling_ms")]
    pub scan_ceiling_ms: u64,

    #[serde(default = "default_pairing_attempts")]
    pub pairing_attempts: u32,

    #[serde(default = "default_pairing_retry_delay_ms")]
    pub pairing_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingSettings {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_input_frame_rate")]
    pub input_frame_rate: u32,

    #[serde(default = "default_output_frame_rate")]
    pub output_frame_rate: u32,

    #[serde(default = "default_crf")]
    pub crf: u8,

    #[serde(default = "default_preset")]
    pub preset: String,

    /// Safety cap on a single file
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    #[serde(default = "default_settle_poll_ms")]
    pub settle_poll_ms: u64,

    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,

    /// Start recording once the player reports the stream is live
    #[serde(default = "default_auto_record")]
    pub auto_record_on_playing: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(dir).join("camstream");
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local").join("share").join("camstream"),
        Err(_) => PathBuf::from("camstream-data"),
    }
}

fn default_camera_port() -> u16 {
    CAMERA_PORT
}

fn default_host_range_low() -> u8 {
    2
}

fn default_host_range_high() -> u8 {
    50
}

fn default_per_host_timeout_ms() -> u64 {
    600
}

fn default_max_concurrency() -> usize {
    25
}

fn default_scan_ceiling_ms() -> u64 {
    15_000
}

fn default_pairing_attempts() -> u32 {
    3
}

fn default_pairing_retry_delay_ms() -> u64 {
    2_000
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_input_frame_rate() -> u32 {
    15
}

fn default_output_frame_rate() -> u32 {
    30
}

fn default_crf() -> u8 {
    23
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_max_duration_secs() -> u64 {
    86_400
}

fn default_stop_timeout_ms() -> u64 {
    4_000
}

fn default_settle_poll_ms() -> u64 {
    200
}

fn default_settle_timeout_ms() -> u64 {
    3_000
}

fn default_auto_record() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            camera_port: default_camera_port(),
            discovery: DiscoveryConfig::default(),
            recording: RecordingSettings::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host_range_low: default_host_range_low(),
            host_range_high: default_host_range_high(),
            per_host_timeout_ms: default_per_host_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            scan_ceiling_ms: default_scan_ceiling_ms(),
            pairing_attempts: default_pairing_attempts(),
            pairing_retry_delay_ms: default_pairing_retry_delay_ms(),
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            input_frame_rate: default_input_frame_rate(),
            output_frame_rate: default_output_frame_rate(),
            crf: default_crf(),
            preset: default_preset(),
            max_duration_secs: default_max_duration_secs(),
            stop_timeout_ms: default_stop_timeout_ms(),
            settle_poll_ms: default_settle_poll_ms(),
            settle_timeout_ms: default_settle_timeout_ms(),
            auto_record_on_playing: default_auto_record(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!(
                "Config file not found at {:?}, creating default config",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("CAMSTREAM_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(dir)
        } else {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            PathBuf::from(home).join(".config")
        };

        Ok(config_dir.join("camstream").join("config.json"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let discovery = &self.discovery;
        if discovery.host_range_low > discovery.host_range_high {
            return Err(anyhow::anyhow!(
                "host_range_low ({}) must not exceed host_range_high ({})",
                discovery.host_range_low,
                discovery.host_range_high
            ));
        }

        if discovery.max_concurrency == 0 {
            return Err(anyhow::anyhow!("max_concurrency must be at least 1"));
        }

        if discovery.pairing_attempts == 0 {
            return Err(anyhow::anyhow!("pairing_attempts must be at least 1"));
        }

        if self.recording.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("ffmpeg_path cannot be empty"));
        }

        Ok(())
    }

    /// Directory that finished recordings are written to
    pub fn recordings_dir(&self) -> PathBuf {
        self.data_dir.join("recordings")
    }

    /// Path of the key-value store file
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

impl DiscoveryConfig {
    pub fn per_host_timeout(&self) -> Duration {
        Duration::from_millis(self.per_host_timeout_ms)
    }

    pub fn scan_ceiling(&self) -> Duration {
        Duration::from_millis(self.scan_ceiling_ms)
    }

    pub fn pairing_retry_delay(&self) -> Duration {
        Duration::from_millis(self.pairing_retry_delay_ms)
    }
}

impl RecordingSettings {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}
