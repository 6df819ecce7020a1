//! Runtime configuration for the source server.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use rpcsensor_models::DEFAULT_PORT;

/// Push cadences for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Interval between sensor / override / generic pushes.
    pub high_rate_interval: Duration,
    /// Interval between traffic pushes.
    pub low_rate_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            high_rate_interval: Duration::from_millis(33),
            low_rate_interval: Duration::from_millis(500),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Cadences applied to every session.
    pub session: SessionConfig,
    /// Sleep between two passes over all sessions.
    pub idle_sleep: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            session: SessionConfig::default(),
            idle_sleep: Duration::from_millis(10),
        }
    }
}
