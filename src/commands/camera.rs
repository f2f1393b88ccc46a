//! Camera API commands

use super::{AppState, CommandResult};
use crate::api::{
    CameraModule, CameraSettings, DeviceRegistration, LoginResponse, NetworkStatus, SystemStats,
};
use crate::storage::StreamCredentials;

/// Log in to the camera and remember the session and credentials
pub async fn login(
    state: &AppState,
    username: &str,
    password: &str,
) -> CommandResult<LoginResponse> {
    let response = state.api.login(username, password).await?;
    state.store.save_token(&response.token)?;
    state.store.save_stream_credentials(StreamCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })?;
    state.record_history("login", Some(username));
    Ok(response)
}

pub async fn logout(state: &AppState) -> CommandResult<()> {
    state.store.remove_token()?;
    state.record_history("logout", None);
    Ok(())
}

pub async fn get_network_status(state: &AppState) -> CommandResult<NetworkStatus> {
    Ok(state.api.network_status().await?)
}

pub async fn get_camera_settings(state: &AppState) -> CommandResult<CameraSettings> {
    Ok(state.api.camera_settings().await?)
}

pub async fn update_camera_settings(
    state: &AppState,
    settings: CameraSettings,
) -> CommandResult<CameraSettings> {
    Ok(state.api.update_camera_settings(&settings).await?)
}

pub async fn get_system_stats(state: &AppState) -> CommandResult<SystemStats> {
    Ok(state.api.system_stats().await?)
}

/// Toggle a camera module and keep the local flag in sync on success
pub async fn set_camera_module(
    state: &AppState,
    module: CameraModule,
    enable: bool,
) -> CommandResult<bool> {
    let response = state.api.set_module(module, enable).await?;
    if response.success {
        match module {
            CameraModule::FaceBlur => state.store.save_face_blur_enabled(enable)?,
            CameraModule::QrSafety => state.store.save_qr_safety_enabled(enable)?,
        }
        let action = format!(
            "{}_{}",
            module.path_segment(),
            if enable { "enabled" } else { "disabled" }
        );
        state.record_history(&action, response.message.as_deref());
    }
    Ok(response.success)
}

/// Register this device for camera alerts with the stored push token.
///
/// Returns `false` when no push token has been saved yet.
pub async fn register_device(
    state: &AppState,
    device_id: &str,
    device_name: &str,
    platform: &str,
) -> CommandResult<bool> {
    let Some(fcm_token) = state.store.push_token() else {
        tracing::warn!("No push token available, skipping device registration");
        return Ok(false);
    };

    let registration = DeviceRegistration {
        device_id: device_id.to_string(),
        device_name: device_name.to_string(),
        fcm_token,
        platform: platform.to_string(),
    };
    state.api.register_notifications(&registration).await?;
    state.store.save_device_registered(true)?;
    Ok(true)
}

/// Save a refreshed push token and re-register if the device was registered
pub async fn update_push_token(
    state: &AppState,
    token: &str,
    device_id: &str,
    device_name: &str,
    platform: &str,
) -> CommandResult<bool> {
    state.store.save_push_token(token)?;
    if !state.store.device_registered() {
        return Ok(false);
    }
    register_device(state, device_id, device_name, platform).await
}

pub async fn unregister_device(state: &AppState) -> CommandResult<()> {
    if let Some(token) = state.store.push_token() {
        state.api.unregister_notifications(&token).await?;
    }
    state.store.save_device_registered(false)?;
    Ok(())
}

pub async fn set_tts_enabled(state: &AppState, enabled: bool) -> CommandResult<()> {
    Ok(state.store.save_tts_enabled(enabled)?)
}
