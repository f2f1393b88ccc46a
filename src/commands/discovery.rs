//! Camera discovery and pairing commands

use super::{AppState, CommandResult};
use crate::discovery::{CameraLocator, DiscoveryResult, HotspotCredentials, PairingProtocol};

/// Scan the local subnets once
pub async fn find_camera(state: &AppState) -> CommandResult<DiscoveryResult> {
    Ok(state.discovery.find_cam_device().await)
}

/// Run the retrying pairing flow and point the API client at the camera.
///
/// The camera's base URL is saved too, so the next [`AppState`] starts out
/// talking to it.
pub async fn pair_camera(state: &AppState) -> CommandResult<String> {
    let discovery = &state.config.discovery;
    let protocol = PairingProtocol::new(
        &state.discovery,
        discovery.pairing_attempts,
        discovery.pairing_retry_delay(),
    );

    let ip = protocol.pair(state.store.as_ref()).await?;
    let base_url = format!("http://{}:{}", ip, state.config.camera_port);
    state.store.save_server_url(&base_url)?;
    state.api.set_base_url(&base_url);
    Ok(ip.to_string())
}

/// The phone's own address on its first usable interface
pub async fn get_phone_ip(state: &AppState) -> CommandResult<Option<String>> {
    let addresses = state.discovery.phone_addresses()?;
    Ok(addresses.first().map(|a| a.ip_address.to_string()))
}

pub fn hotspot_credentials(pin: &str) -> HotspotCredentials {
    HotspotCredentials::from_pin(pin)
}
