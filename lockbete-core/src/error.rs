use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Failures writing an evidence record. Never fatal to the receive loop.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write evidence to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Evidence writer failed: {0}")]
    Writer(#[from] std::io::Error),

    #[error("Failed to serialize evidence record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures at the datagram transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The only fatal transport condition: the socket could not be set up.
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket receive error: {0}")]
    Recv(#[source] std::io::Error),

    #[error("Failed to send to {peer}: {source}")]
    Send {
        peer: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The transport will deliver no further datagrams.
    #[error("Transport closed")]
    Closed,
}
