//! Endpoint parsing and address resolution.
//!
//! Configured endpoints are strings in one of three shapes:
//!
//! - `host.example.org:9001` (DNS name, resolved on every attempt)
//! - `203.0.113.7:9001` (IPv4 literal)
//! - `[2001:db8::1]:9001` (bracketed IPv6 literal)
//!
//! Resolution yields every address the name maps to, in the order the
//! resolver returned them. Each one is an independent connect candidate.

use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Errors raised while parsing or resolving an endpoint. None of these are
/// fatal: the connector logs them and moves on to the next endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No `:port` suffix was found.
    #[error("endpoint '{0}' has no port")]
    MissingPort(String),

    /// An opening `[` without a closing `]`.
    #[error("endpoint '{0}' has an unterminated IPv6 bracket")]
    UnclosedBracket(String),

    /// The address part is empty.
    #[error("endpoint '{0}' has no address")]
    EmptyHost(String),

    /// The port is not an integer in 1..=65535.
    #[error("endpoint '{endpoint}' has invalid port '{port}'")]
    InvalidPort {
        /// The full endpoint string.
        endpoint: String,
        /// The offending port text.
        port: String,
    },

    /// DNS lookup failed.
    #[error("failed to resolve '{host}': {source}")]
    Dns {
        /// Host name that was looked up.
        host: String,
        /// Underlying resolver error.
        #[source]
        source: std::io::Error,
    },

    /// DNS lookup did not finish in time.
    #[error("timed out resolving '{0}'")]
    Timeout(String),
}

/// A parsed `address:port` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    raw: String,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parse an endpoint string.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let raw = raw.trim();
        let (host, port_text) = if raw.contains('[') || raw.contains("]:") {
            let start = raw.find('[').map_or(0, |i| i + 1);
            let end = raw
                .rfind(']')
                .filter(|&end| end >= start)
                .ok_or_else(|| ResolveError::UnclosedBracket(raw.to_string()))?;
            let port_text = raw[end + 1..]
                .strip_prefix(':')
                .ok_or_else(|| ResolveError::MissingPort(raw.to_string()))?;
            (&raw[start..end], port_text)
        } else {
            let split = raw
                .rfind(':')
                .ok_or_else(|| ResolveError::MissingPort(raw.to_string()))?;
            (&raw[..split], &raw[split + 1..])
        };

        if host.is_empty() {
            return Err(ResolveError::EmptyHost(raw.to_string()));
        }

        let port = match port_text.parse::<u16>() {
            Ok(port) if port != 0 => port,
            _ => {
                return Err(ResolveError::InvalidPort {
                    endpoint: raw.to_string(),
                    port: port_text.to_string(),
                });
            }
        };

        Ok(Self {
            raw: raw.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// The address part: an IP literal or a DNS name, without brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The endpoint exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The IP literal, if the address part is one.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

impl FromStr for Endpoint {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Name resolution used by the connector.
pub trait Resolve: Send + Sync {
    /// Look up every address for `host`, in resolver order.
    fn lookup(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = std::io::Result<Vec<SocketAddr>>> + Send;
}

/// Resolver backed by the operating system (`getaddrinfo` via Tokio).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn lookup(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = std::io::Result<Vec<SocketAddr>>> + Send {
        let host = host.to_string();
        async move {
            let addrs = tokio::net::lookup_host((host.as_str(), port)).await?;
            Ok(addrs.collect())
        }
    }
}

/// Turn an endpoint into its ordered list of connect candidates.
///
/// IP literals are used as-is; names go through `resolver`. An empty list is
/// a valid result and simply means there is nothing to try.
pub async fn resolve<R: Resolve>(
    endpoint: &Endpoint,
    resolver: &R,
) -> Result<Vec<SocketAddr>, ResolveError> {
    if let Some(ip) = endpoint.ip_literal() {
        return Ok(vec![SocketAddr::new(ip, endpoint.port())]);
    }

    resolver
        .lookup(endpoint.host(), endpoint.port())
        .await
        .map_err(|source| ResolveError::Dns {
            host: endpoint.host().to_string(),
            source,
        })
}
