//! UDP listener configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Where and how the sensor receives datagrams.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ListenerConfig {
    /// Address to bind (all interfaces by default).
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// UDP port; the standard SNMP agent port by default.
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Receive buffer size. Longer datagrams are truncated by the socket.
    #[validate(range(min = 1, max = 65535))]
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    /// Pause after a socket receive error before receiving again
    /// (milliseconds).
    #[validate(range(max = 60000))]
    #[serde(default = "default_recv_error_backoff_ms")]
    pub recv_error_backoff_ms: u64,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    161
}

fn default_max_datagram_size() -> usize {
    65_507
}

fn default_recv_error_backoff_ms() -> u64 {
    1000
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_datagram_size: default_max_datagram_size(),
            recv_error_backoff_ms: default_recv_error_backoff_ms(),
        }
    }
}
