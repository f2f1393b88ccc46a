//! Camera HTTP API payloads

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub ap_mode: AccessPointStatus,
    pub led_pattern: String,
    pub retry_count: u32,
    pub state: String,
    pub wifi: WifiStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPointStatus {
    pub ip: String,
    pub password: String,
    pub running: bool,
    pub setup_url: Option<String>,
    pub ssid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiStatus {
    pub connected: bool,
    pub interface: String,
    pub ip: String,
    #[serde(default)]
    pub saved_network: Vec<SavedNetwork>,
    pub ssid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedNetwork {
    pub has_password: bool,
    pub saved_at: String,
    pub ssid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub flip_h: bool,
    pub flip_v: bool,
    pub fps: u32,
    pub height: u32,
    pub rotation: u32,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub disk_percent: f64,
    pub disk_total_gb: f64,
    pub disk_used_gb: f64,
    pub memory_percent: f64,
    pub memory_total_mb: f64,
    pub memory_used_mb: f64,
    pub temperature: f64,
    pub uptime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Camera-side processing modules that can be toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraModule {
    FaceBlur,
    QrSafety,
}

impl CameraModule {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::FaceBlur => "face_blur",
            Self::QrSafety => "qr_safety",
        }
    }
}

/// Push registration for this device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub device_id: String,
    pub device_name: String,
    pub fcm_token: String,
    pub platform: String,
}
