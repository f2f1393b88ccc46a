//! Camera discovery across all local subnets

use super::interfaces::{
    candidate_subnets, InterfaceSource, NetworkInterfaceAddress, SystemInterfaces,
};
use super::prober::{HttpPortProbe, ProbeConfig, SubnetProber};
use super::DiscoveryError;
use crate::config::AppConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Message shown when the device has no usable network at all
pub const NO_NETWORK_MESSAGE: &str = "No network found. Is hotspot enabled?";

/// Outcome of one discovery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub found: bool,
    pub host_ip: Option<String>,
    pub error_message: Option<String>,
}

impl DiscoveryResult {
    pub fn found(ip: Ipv4Addr) -> Self {
        Self {
            found: true,
            host_ip: Some(ip.to_string()),
            error_message: None,
        }
    }

    /// Every subnet was scanned and nothing answered
    pub fn not_found() -> Self {
        Self {
            found: false,
            host_ip: None,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            found: false,
            host_ip: None,
            error_message: Some(message.into()),
        }
    }
}

impl From<Result<Ipv4Addr, DiscoveryError>> for DiscoveryResult {
    fn from(result: Result<Ipv4Addr, DiscoveryError>) -> Self {
        match result {
            Ok(ip) => Self::found(ip),
            Err(DiscoveryError::HostNotFound) => Self::not_found(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Anything that can run a single "find the camera" attempt
#[async_trait]
pub trait CameraLocator: Send + Sync {
    async fn locate(&self) -> Result<Ipv4Addr, DiscoveryError>;

    /// Frontend-facing form of [`locate`](Self::locate)
    async fn find_cam_device(&self) -> DiscoveryResult {
        self.locate().await.into()
    }
}

/// Scans every local subnet in turn for the camera's HTTP port
pub struct HostDiscoveryService {
    interfaces: Arc<dyn InterfaceSource>,
    prober: SubnetProber,
}

impl HostDiscoveryService {
    pub fn new(interfaces: Arc<dyn InterfaceSource>, prober: SubnetProber) -> Self {
        Self { interfaces, prober }
    }

    /// OS interfaces and the HTTP port probe, tuned from config
    pub fn from_config(config: &AppConfig) -> Self {
        let probe_config = ProbeConfig::from((&config.discovery, config.camera_port));
        Self::new(
            Arc::new(SystemInterfaces),
            SubnetProber::new(Arc::new(HttpPortProbe), probe_config),
        )
    }

    /// The device's own usable IPv4 addresses
    pub fn phone_addresses(&self) -> Result<Vec<NetworkInterfaceAddress>, DiscoveryError> {
        self.interfaces.addresses()
    }
}

#[async_trait]
impl CameraLocator for HostDiscoveryService {
    async fn locate(&self) -> Result<Ipv4Addr, DiscoveryError> {
        tracing::info!("Finding cam device");

        let addresses = self.interfaces.addresses().map_err(|e| {
            tracing::error!("Failed to enumerate interfaces: {}", e);
            e
        })?;

        let subnets = candidate_subnets(&addresses);
        tracing::debug!("Subnets to scan: {:?}", subnets);

        if subnets.is_empty() {
            tracing::warn!("No usable network interface");
            return Err(DiscoveryError::NoNetworkAvailable);
        }

        for subnet in &subnets {
            if let Some(ip) = self.prober.probe(subnet).await {
                tracing::info!("Found cam at {}", ip);
                return Ok(ip);
            }
            tracing::debug!("Nothing on {}.x", subnet);
        }

        tracing::info!("Cam not found on {} subnet(s)", subnets.len());
        Err(DiscoveryError::HostNotFound)
    }
}
