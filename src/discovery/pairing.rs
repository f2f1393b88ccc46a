//! Hotspot pairing
//!
//! The phone opens a hotspot with credentials derived from the camera's PIN,
//! the camera joins it, and discovery is retried a few times while the camera
//! associates: attempt → wait → attempt → wait → attempt → give up.

use super::service::CameraLocator;
use super::DiscoveryError;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Password every camera expects on the pairing hotspot
pub const HOTSPOT_PASSWORD: &str = "12345678";

/// Hotspot the user has to create for the camera to join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotCredentials {
    pub ssid: String,
    pub password: String,
}

impl HotspotCredentials {
    pub fn from_pin(pin: &str) -> Self {
        Self {
            ssid: format!("CAM{}", pin.trim()),
            password: HOTSPOT_PASSWORD.to_string(),
        }
    }
}

/// Where a successful pairing is remembered
pub trait CameraRegistry: Send + Sync {
    fn save_camera_ip(&self, ip: &str) -> Result<(), StoreError>;
    fn add_history(&self, action: &str, details: Option<&str>) -> Result<(), StoreError>;
}

/// Bounded retry loop around a [`CameraLocator`]
pub struct PairingProtocol<'a> {
    locator: &'a dyn CameraLocator,
    attempts: u32,
    retry_delay: Duration,
}

impl<'a> PairingProtocol<'a> {
    pub fn new(locator: &'a dyn CameraLocator, attempts: u32, retry_delay: Duration) -> Self {
        Self {
            locator,
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    /// Run the pairing attempts and persist the camera address on success.
    ///
    /// `NoNetworkAvailable` ends the protocol immediately since waiting will
    /// not bring a hotspot up.
    pub async fn pair(&self, registry: &dyn CameraRegistry) -> Result<Ipv4Addr, DiscoveryError> {
        let mut last_error = DiscoveryError::HostNotFound;

        for attempt in 1..=self.attempts {
            tracing::info!("Finding cam device (attempt {}/{})", attempt, self.attempts);

            match self.locator.locate().await {
                Ok(ip) => {
                    let ip_text = ip.to_string();
                    if let Err(e) = registry.save_camera_ip(&ip_text) {
                        tracing::warn!("Failed to persist camera IP: {}", e);
                    }
                    let details = format!("Camera found at {}", ip_text);
                    if let Err(e) = registry.add_history("camera_paired", Some(&details)) {
                        tracing::warn!("Failed to record pairing in history: {}", e);
                    }
                    return Ok(ip);
                }
                Err(DiscoveryError::NoNetworkAvailable) => {
                    tracing::warn!("No network available, giving up on pairing");
                    return Err(DiscoveryError::NoNetworkAvailable);
                }
                Err(e) => {
                    tracing::debug!("Attempt {} failed: {}", attempt, e);
                    last_error = e;
                }
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        tracing::warn!("Camera not found after {} attempts", self.attempts);
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    struct ScriptedLocator {
        results: Mutex<VecDeque<Result<Ipv4Addr, DiscoveryError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedLocator {
        fn new(results: Vec<Result<Ipv4Addr, DiscoveryError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CameraLocator for ScriptedLocator {
        async fn locate(&self) -> Result<Ipv4Addr, DiscoveryError> {
            self.calls.lock().push(Instant::now());
            self.results
                .lock()
                .pop_front()
                .unwrap_or(Err(DiscoveryError::HostNotFound))
        }
    }

    #[derive(Default)]
    struct MemoryRegistry {
        camera_ip: Mutex<Option<String>>,
        history: Mutex<Vec<String>>,
    }

    impl CameraRegistry for MemoryRegistry {
        fn save_camera_ip(&self, ip: &str) -> Result<(), StoreError> {
            *self.camera_ip.lock() = Some(ip.to_string());
            Ok(())
        }

        fn add_history(&self, action: &str, _details: Option<&str>) -> Result<(), StoreError> {
            self.history.lock().push(action.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_hotspot_credentials_from_pin() {
        let creds = HotspotCredentials::from_pin("4821");
        assert_eq!(creds.ssid, "CAM4821");
        assert_eq!(creds.password, "12345678");
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_attempts_with_delays() {
        let locator = ScriptedLocator::new(vec![]);
        let registry = MemoryRegistry::default();
        let protocol = PairingProtocol::new(&locator, 3, Duration::from_secs(2));

        let started = Instant::now();
        let result = protocol.pair(&registry).await;

        assert!(matches!(result, Err(DiscoveryError::HostNotFound)));
        let calls = locator.calls.lock();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(2));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(2));
        assert_eq!(started.elapsed(), Duration::from_secs(4));
        assert!(registry.camera_ip.lock().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_attempt_success_is_persisted() {
        let locator = ScriptedLocator::new(vec![
            Err(DiscoveryError::HostNotFound),
            Ok(Ipv4Addr::new(192, 168, 43, 37)),
        ]);
        let registry = MemoryRegistry::default();
        let protocol = PairingProtocol::new(&locator, 3, Duration::from_secs(2));

        let ip = protocol.pair(&registry).await.unwrap();

        assert_eq!(ip, Ipv4Addr::new(192, 168, 43, 37));
        assert_eq!(locator.calls.lock().len(), 2);
        assert_eq!(registry.camera_ip.lock().as_deref(), Some("192.168.43.37"));
        assert_eq!(registry.history.lock().as_slice(), ["camera_paired".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_network_is_not_retried() {
        let locator = ScriptedLocator::new(vec![Err(DiscoveryError::NoNetworkAvailable)]);
        let registry = MemoryRegistry::default();
        let protocol = PairingProtocol::new(&locator, 3, Duration::from_secs(2));

        let result = protocol.pair(&registry).await;

        assert!(matches!(result, Err(DiscoveryError::NoNetworkAvailable)));
        assert_eq!(locator.calls.lock().len(), 1);
    }
}
