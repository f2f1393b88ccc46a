//! Subnet probing
//!
//! Scans a bounded host range of one /24 subnet for a listening TCP service
//! and returns the first host that answers.

use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Checks whether a single address has the service listening
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// `true` if something answered on `addr` within `timeout`.
    ///
    /// Refused connections and timeouts are expected and reported as `false`,
    /// never as errors.
    async fn probe(&self, addr: SocketAddrV4, timeout: Duration) -> bool;
}

/// TCP connect followed by a minimal HTTP request.
///
/// An accepted connection is enough to count the host as present; the HTTP
/// status, if one arrives in time, is only logged. Error statuses count too.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpPortProbe;

#[async_trait]
impl HostProbe for HttpPortProbe {
    async fn probe(&self, addr: SocketAddrV4, timeout: Duration) -> bool {
        let mut stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::trace!("{} → {}", addr, e);
                return false;
            }
            Err(_) => {
                tracing::trace!("{} → timeout", addr);
                return false;
            }
        };

        let request = format!(
            "GET / HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
            addr
        );

        let exchange = async {
            stream.write_all(request.as_bytes()).await?;
            let mut buffer = [0u8; 64];
            let n = stream.read(&mut buffer).await?;
            Ok::<String, std::io::Error>(String::from_utf8_lossy(&buffer[..n]).into_owned())
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(response)) => {
                let status_line = response.lines().next().unwrap_or_default();
                tracing::debug!("{} → {}", addr, status_line);
            }
            Ok(Err(e)) => tracing::debug!("{} accepted connection, then {}", addr, e),
            Err(_) => tracing::debug!("{} accepted connection, no response", addr),
        }

        let _ = stream.shutdown().await;
        true
    }
}

/// Parameters of a single subnet scan
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub port: u16,
    pub host_range_low: u8,
    pub host_range_high: u8,
    pub per_host_timeout: Duration,
    pub max_concurrency: usize,
    /// Hard ceiling on the whole scan, independent of range size
    pub scan_ceiling: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: crate::config::CAMERA_PORT,
            host_range_low: 2,
            host_range_high: 50,
            per_host_timeout: Duration::from_millis(600),
            max_concurrency: 25,
            scan_ceiling: Duration::from_secs(15),
        }
    }
}

impl From<(&crate::config::DiscoveryConfig, u16)> for ProbeConfig {
    fn from((config, port): (&crate::config::DiscoveryConfig, u16)) -> Self {
        Self {
            port,
            host_range_low: config.host_range_low,
            host_range_high: config.host_range_high,
            per_host_timeout: config.per_host_timeout(),
            max_concurrency: config.max_concurrency,
            scan_ceiling: config.scan_ceiling(),
        }
    }
}

/// Addresses to try in `prefix`, skipping `.0`, `.1` and `.255`
pub fn candidate_hosts(prefix: &str, low: u8, high: u8) -> Vec<Ipv4Addr> {
    let octets = match prefix
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<Vec<u8>, _>>()
    {
        Ok(octets) => octets,
        Err(_) => {
            tracing::warn!("Ignoring malformed subnet prefix {:?}", prefix);
            return Vec::new();
        }
    };
    let [a, b, c] = match octets.as_slice() {
        [a, b, c] => [*a, *b, *c],
        _ => {
            tracing::warn!("Ignoring malformed subnet prefix {:?}", prefix);
            return Vec::new();
        }
    };

    (low.max(2)..=high.min(254))
        .map(|host| Ipv4Addr::new(a, b, c, host))
        .collect()
}

/// Concurrent scanner over one subnet
pub struct SubnetProber {
    probe: Arc<dyn HostProbe>,
    config: ProbeConfig,
}

impl SubnetProber {
    pub fn new(probe: Arc<dyn HostProbe>, config: ProbeConfig) -> Self {
        Self { probe, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Scan `subnet_prefix` and return the first responding host.
    ///
    /// Probes run on a bounded pool. Once a host answers the remaining probes
    /// are aborted; probes already past their check may still finish, but the
    /// first recorded address is never replaced. Returns `None` when nothing
    /// answers before the scan ceiling.
    pub async fn probe(&self, subnet_prefix: &str) -> Option<Ipv4Addr> {
        let hosts = candidate_hosts(
            subnet_prefix,
            self.config.host_range_low,
            self.config.host_range_high,
        );
        if hosts.is_empty() {
            return None;
        }

        tracing::info!(
            "Scanning {} hosts in {}.x for port {}",
            hosts.len(),
            subnet_prefix,
            self.config.port
        );

        let found: Arc<OnceLock<Ipv4Addr>> = Arc::new(OnceLock::new());
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut probes = JoinSet::new();

        for ip in hosts {
            let probe = Arc::clone(&self.probe);
            let found = Arc::clone(&found);
            let permits = Arc::clone(&permits);
            let addr = SocketAddrV4::new(ip, self.config.port);
            let timeout = self.config.per_host_timeout;

            probes.spawn(async move {
                if found.get().is_some() {
                    return;
                }
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                if found.get().is_some() {
                    return;
                }
                if probe.probe(addr, timeout).await && found.set(ip).is_ok() {
                    tracing::debug!("First responder: {}", ip);
                }
            });
        }

        let drain = async {
            while let Some(joined) = probes.join_next().await {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::warn!("Probe task panicked: {}", e);
                    }
                }
                if found.get().is_some() {
                    break;
                }
            }
        };

        if tokio::time::timeout(self.config.scan_ceiling, drain).await.is_err() {
            tracing::debug!(
                "Scan of {}.x hit the {:?} ceiling",
                subnet_prefix,
                self.config.scan_ceiling
            );
        }
        probes.abort_all();

        found.get().copied()
    }
}
