//! Camera HTTP API client

pub mod client;
pub mod types;

pub use client::CamApiClient;
pub use types::{
    CameraModule, CameraSettings, DeviceRegistration, LoginResponse, ModuleResponse,
    NetworkStatus, SystemStats,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Camera API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type ApiResult<T> = Result<T, ApiError>;
