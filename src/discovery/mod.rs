//! Camera discovery
//!
//! Locates the camera on the phone's hotspot (or any attached /24) by probing
//! each local subnet for the camera's HTTP port:
//! - `interfaces`: local IPv4 addresses and their subnet prefixes
//! - `prober`: bounded concurrent scan of one subnet
//! - `service`: scan across all subnets
//! - `pairing`: the retrying pairing flow built on top

pub mod interfaces;
pub mod pairing;
pub mod prober;
pub mod service;

pub use interfaces::{InterfaceSource, NetworkInterfaceAddress, StaticInterfaces, SystemInterfaces};
pub use pairing::{CameraRegistry, HotspotCredentials, PairingProtocol};
pub use prober::{HostProbe, HttpPortProbe, ProbeConfig, SubnetProber};
pub use service::{CameraLocator, DiscoveryResult, HostDiscoveryService};

use thiserror::Error;

/// Errors that can end a discovery attempt
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No network found. Is hotspot enabled?")]
    NoNetworkAvailable,

    #[error("Camera not found on the local network")]
    HostNotFound,

    #[error("Interface error: {0}")]
    Interfaces(String),
}
