//! Inbound datagram event.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;

/// One received datagram, as handed over by the transport
#[derive(Clone, Debug)]
pub struct RequestEvent {
    /// Instant of receipt, not of logging
    pub timestamp: DateTime<Utc>,

    /// Origin of the datagram (attacker controlled)
    pub peer: SocketAddr,

    /// Raw, untrusted payload
    pub payload: Bytes,
}

impl RequestEvent {
    /// Creates an event stamped with the current time. Call this right after
    /// the receive completes.
    #[inline]
    pub fn received(peer: SocketAddr, payload: Bytes) -> Self {
        Self::new(Utc::now(), peer, payload)
    }

    #[inline]
    pub fn new(timestamp: DateTime<Utc>, peer: SocketAddr, payload: Bytes) -> Self {
        Self {
            timestamp,
            peer,
            payload,
        }
    }
}
