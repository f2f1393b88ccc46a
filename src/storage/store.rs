//! JSON-file backed key-value store
//!
//! The whole store is one JSON object kept in memory and written through to
//! disk on every change (temp file + rename, so a crash never leaves a
//! half-written file behind).

use super::history::{self, HistoryEntry};
use super::StoreError;
use crate::discovery::CameraRegistry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://192.168.1.9:5000";
const DEFAULT_STREAM_USERNAME: &str = "admin";
const DEFAULT_STREAM_PASSWORD: &str = "admin123";

/// Basic-auth credentials for the camera stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCredentials {
    pub username: String,
    pub password: String,
}

impl Default for StreamCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_STREAM_USERNAME.to_string(),
            password: DEFAULT_STREAM_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    server_url: Option<String>,
    #[serde(default)]
    camera_ip: Option<String>,
    #[serde(default)]
    stream_credentials: Option<StreamCredentials>,
    #[serde(default)]
    face_blur_enabled: bool,
    #[serde(default)]
    qr_safety_enabled: bool,
    #[serde(default)]
    tts_enabled: Option<bool>,
    #[serde(default)]
    device_registered: bool,
    #[serde(default)]
    push_token: Option<String>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

pub struct LocalStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl LocalStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// An unreadable file is moved aside to `<path>.bak` and replaced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let data = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(e) => {
                    let backup = path.with_extension("json.bak");
                    tracing::warn!(
                        "Store {:?} is corrupt ({}), moving it to {:?}",
                        path,
                        e,
                        backup
                    );
                    std::fs::rename(&path, &backup)?;
                    StoreData::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Opened store at {:?}", path);
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> T {
        f(&self.data.read())
    }

    /// Apply `f` and persist while still holding the write lock
    fn update(&self, f: impl FnOnce(&mut StoreData)) -> Result<(), StoreError> {
        let mut data = self.data.write();
        f(&mut data);
        self.persist(&data)
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    // Auth

    pub fn token(&self) -> Option<String> {
        self.read(|d| d.token.clone())
    }

    pub fn save_token(&self, token: &str) -> Result<(), StoreError> {
        self.update(|d| d.token = Some(token.to_string()))
    }

    pub fn remove_token(&self) -> Result<(), StoreError> {
        self.update(|d| d.token = None)
    }

    pub fn server_url(&self) -> String {
        self.read(|d| d.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn save_server_url(&self, url: &str) -> Result<(), StoreError> {
        self.update(|d| d.server_url = Some(url.trim_end_matches('/').to_string()))
    }

    // Camera

    pub fn camera_ip(&self) -> Option<String> {
        self.read(|d| d.camera_ip.clone())
    }

    pub fn stream_credentials(&self) -> StreamCredentials {
        self.read(|d| d.stream_credentials.clone()).unwrap_or_default()
    }

    pub fn save_stream_credentials(
        &self,
        credentials: StreamCredentials,
    ) -> Result<(), StoreError> {
        self.update(|d| d.stream_credentials = Some(credentials))
    }

    /// MJPEG endpoint of the paired camera on `port`, `None` until one is
    /// paired
    pub fn build_stream_url(&self, port: u16) -> Option<String> {
        let ip = self.camera_ip()?;
        let credentials = self.stream_credentials();
        Some(format!(
            "http://{}:{}@{}:{}/video_feed",
            urlencoding::encode(&credentials.username),
            urlencoding::encode(&credentials.password),
            ip,
            port
        ))
    }

    // Modules

    pub fn face_blur_enabled(&self) -> bool {
        self.read(|d| d.face_blur_enabled)
    }

    pub fn save_face_blur_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.update(|d| d.face_blur_enabled = enabled)
    }

    pub fn qr_safety_enabled(&self) -> bool {
        self.read(|d| d.qr_safety_enabled)
    }

    pub fn save_qr_safety_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.update(|d| d.qr_safety_enabled = enabled)
    }

    pub fn tts_enabled(&self) -> bool {
        self.read(|d| d.tts_enabled).unwrap_or(true)
    }

    pub fn save_tts_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.update(|d| d.tts_enabled = Some(enabled))
    }

    // Notifications

    pub fn device_registered(&self) -> bool {
        self.read(|d| d.device_registered)
    }

    pub fn save_device_registered(&self, registered: bool) -> Result<(), StoreError> {
        self.update(|d| d.device_registered = registered)
    }

    pub fn push_token(&self) -> Option<String> {
        self.read(|d| d.push_token.clone())
    }

    pub fn save_push_token(&self, token: &str) -> Result<(), StoreError> {
        self.update(|d| d.push_token = Some(token.to_string()))
    }

    // History

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.read(|d| d.history.clone())
    }

    pub fn clear_history(&self) -> Result<(), StoreError> {
        self.update(|d| d.history.clear())
    }

    /// Forget everything, including the paired camera
    pub fn clear_all(&self) -> Result<(), StoreError> {
        tracing::info!("Clearing local store");
        self.update(|d| *d = StoreData::default())
    }
}

impl CameraRegistry for LocalStore {
    fn save_camera_ip(&self, ip: &str) -> Result<(), StoreError> {
        tracing::info!("Saving camera IP {}", ip);
        self.update(|d| d.camera_ip = Some(ip.to_string()))
    }

    fn add_history(&self, action: &str, details: Option<&str>) -> Result<(), StoreError> {
        let entry = HistoryEntry::new(action, details.map(str::to_string));
        self.update(|d| history::push_front(&mut d.history, entry))
    }
}
