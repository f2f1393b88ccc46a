//! Error types and handling
//!
//! Common error types used across the application.

use crate::api::ApiError;
use crate::discovery::DiscoveryError;
use crate::recorder::RecordingError;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Camera not paired")]
    CameraNotPaired,
}

/// Error response for frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Discovery(e) => match e {
                DiscoveryError::NoNetworkAvailable => "NO_NETWORK",
                DiscoveryError::HostNotFound => "HOST_NOT_FOUND",
                DiscoveryError::Interfaces(_) => "INTERFACE_ERROR",
            },
            AppError::Recording(e) => match e {
                RecordingError::AlreadyRecording(_) => "ALREADY_RECORDING",
                RecordingError::NotRecording => "NOT_RECORDING",
                RecordingError::RecordingLaunchFailed(_) => "RECORDING_LAUNCH_FAILED",
                RecordingError::RecordingEmptyOrMissing(_) => "RECORDING_EMPTY",
                RecordingError::InvalidTransition { .. } => "RECORDING_STATE_ERROR",
                RecordingError::ManagerUnavailable => "RECORDER_UNAVAILABLE",
                RecordingError::Io(_) => "IO_ERROR",
            },
            AppError::Api(e) => match e {
                ApiError::NotAuthenticated => "NOT_AUTHENTICATED",
                _ => "API_ERROR",
            },
            AppError::Store(_) => "STORAGE_ERROR",
            AppError::CameraNotPaired => "CAMERA_NOT_PAIRED",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

macro_rules! impl_error_response_from {
    ($($source:ty),*) => {
        $(
            impl From<$source> for ErrorResponse {
                fn from(error: $source) -> Self {
                    AppError::from(error).into()
                }
            }
        )*
    };
}

impl_error_response_from!(DiscoveryError, RecordingError, ApiError, StoreError);

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
