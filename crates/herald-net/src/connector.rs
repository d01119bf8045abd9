//! Failover connection establishment across the configured endpoints.
//!
//! [`Connector::connect`] walks the endpoint list in order and, for each
//! endpoint, every resolved address in resolver order. Each candidate gets a
//! single attempt bounded by [`ConnectorConfig::connect_timeout`]. The first
//! stream that connects wins; nothing is ranked or retried.
//!
//! Winning streams get `TCP_NODELAY` and keepalive probes timed off the
//! heartbeat interval, so a silently vanished list server is noticed even
//! while the reporter has nothing to write.

use std::net::SocketAddr;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;

use crate::endpoint::{Endpoint, Resolve, ResolveError, SystemResolver, resolve};

/// Kernels count keepalive timers in whole seconds.
const MIN_KEEPALIVE: Duration = Duration::from_secs(1);

/// Configuration for [`Connector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Upper bound for one connect attempt (and for one DNS lookup). Default: 5 s.
    pub connect_timeout: Duration,
    /// Silence on the connection before the first keepalive probe. Default: 20 s.
    pub keepalive_idle: Duration,
    /// Gap between unanswered keepalive probes. Default: 10 s.
    pub keepalive_interval: Duration,
}

impl ConnectorConfig {
    /// Probe after two missed heartbeats, then once per heartbeat.
    pub fn for_heartbeat(connect_timeout: Duration, heartbeat_interval: Duration) -> Self {
        Self {
            connect_timeout,
            keepalive_idle: (heartbeat_interval * 2).max(MIN_KEEPALIVE),
            keepalive_interval: heartbeat_interval.max(MIN_KEEPALIVE),
        }
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self::for_heartbeat(Duration::from_secs(5), Duration::from_secs(10))
    }
}

/// Options for an established reporting stream.
fn tune_stream(stream: &TcpStream, config: &ConnectorConfig) -> std::io::Result<()> {
    stream.set_nodelay(true)?;

    let keepalive = TcpKeepalive::new().with_time(config.keepalive_idle);
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "macos",
        target_os = "windows"
    ))]
    let keepalive = keepalive.with_interval(config.keepalive_interval);

    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}

/// An established reporting connection.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    endpoint: Endpoint,
    peer: SocketAddr,
}

impl Connection {
    /// Wrap an already-connected stream.
    pub fn new(stream: TcpStream, endpoint: Endpoint, peer: SocketAddr) -> Self {
        Self {
            stream,
            endpoint,
            peer,
        }
    }

    /// The configured endpoint this connection was made through.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The concrete address that accepted the connection.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Give up the wrapper and take the stream.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}

/// Tries endpoints in order and returns the first live connection.
pub struct Connector<R = SystemResolver> {
    endpoints: Vec<String>,
    config: ConnectorConfig,
    resolver: R,
}

impl Connector<SystemResolver> {
    /// Create a connector that resolves names through the OS resolver.
    pub fn new(endpoints: Vec<String>, config: ConnectorConfig) -> Self {
        Self::with_resolver(endpoints, config, SystemResolver)
    }
}

impl<R: Resolve> Connector<R> {
    /// Create a connector with a custom resolver.
    pub fn with_resolver(endpoints: Vec<String>, config: ConnectorConfig, resolver: R) -> Self {
        Self {
            endpoints,
            config,
            resolver,
        }
    }

    /// The endpoint strings, in the order they are tried.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Connect to the first reachable candidate.
    ///
    /// Returns `None` once every endpoint and every candidate has failed. That
    /// is not an error: the caller backs off and calls again.
    pub async fn connect(&self) -> Option<Connection> {
        for raw in &self.endpoints {
            let endpoint = match Endpoint::parse(raw) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    tracing::warn!("Error connecting to {raw}: {e}");
                    continue;
                }
            };

            let candidates = match self.candidates(&endpoint).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("Error connecting to {endpoint}: {e}");
                    continue;
                }
            };

            if candidates.is_empty() {
                tracing::debug!("{endpoint} resolved to no addresses");
            }

            for addr in candidates {
                if let Some(stream) = self.attempt(&endpoint, addr).await {
                    tracing::info!("Connected to {endpoint} ({addr})");
                    return Some(Connection::new(stream, endpoint, addr));
                }
            }
        }

        None
    }

    async fn candidates(&self, endpoint: &Endpoint) -> Result<Vec<SocketAddr>, ResolveError> {
        tokio::time::timeout(
            self.config.connect_timeout,
            resolve(endpoint, &self.resolver),
        )
        .await
        .map_err(|_| ResolveError::Timeout(endpoint.host().to_string()))?
    }

    async fn attempt(&self, endpoint: &Endpoint, addr: SocketAddr) -> Option<TcpStream> {
        match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                if let Err(e) = tune_stream(&stream, &self.config) {
                    tracing::debug!("Could not apply socket options for {endpoint} ({addr}): {e}");
                }
                Some(stream)
            }
            Ok(Err(e)) => {
                tracing::debug!("Failed to connect to {endpoint} ({addr}): {e}");
                None
            }
            Err(_) => {
                tracing::debug!(
                    "Failed to connect to {endpoint} ({addr}): no answer within {:?}",
                    self.config.connect_timeout
                );
                None
            }
        }
    }
}
