//! ## lockbete-core::transport
//! **Datagram transport boundary**
//!
//! The engine receives from and replies through a [`DatagramTransport`]. A
//! transport is shared by the receive loop and every in-flight reply, so
//! `send` must tolerate concurrent, unordered callers. The engine never binds,
//! reconfigures or closes it.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::TransportError;

#[async_trait]
pub trait DatagramTransport: Send + Sync {
    /// Waits for the next datagram.
    async fn recv(&self) -> Result<(Bytes, SocketAddr), TransportError>;

    /// Sends `payload` to `peer`, returning the number of bytes written.
    async fn send(&self, payload: &[u8], peer: SocketAddr) -> Result<usize, TransportError>;
}

/// UDP transport over a tokio socket.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    max_datagram_size: usize,
}

impl UdpTransport {
    /// Binds `addr` with `SO_REUSEADDR` set, so a restarted sensor can take
    /// the port back at once. This is the one fatal failure of the sensor.
    pub async fn bind(addr: SocketAddr, max_datagram_size: usize) -> Result<Self, TransportError> {
        let socket =
            reusable_socket(addr).map_err(|source| TransportError::Bind { addr, source })?;
        debug!("UDP socket bound to {addr}");
        Ok(Self::from_socket(socket, max_datagram_size))
    }

    pub fn from_socket(socket: UdpSocket, max_datagram_size: usize) -> Self {
        Self {
            socket,
            max_datagram_size: max_datagram_size.max(1),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

fn reusable_socket(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

#[async_trait]
impl DatagramTransport for UdpTransport {
    async fn recv(&self) -> Result<(Bytes, SocketAddr), TransportError> {
        let mut buf = vec![0u8; self.max_datagram_size];
        let (len, peer) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(TransportError::Recv)?;
        // Copy out so a small datagram does not pin a full-size buffer.
        Ok((Bytes::copy_from_slice(&buf[..len]), peer))
    }

    async fn send(&self, payload: &[u8], peer: SocketAddr) -> Result<usize, TransportError> {
        self.socket
            .send_to(payload, peer)
            .await
            .map_err(|source| TransportError::Send { peer, source })
    }
}

/// In-process transport: datagrams are injected through a channel and every
/// send is recorded. `recv` reports [`TransportError::Closed`] once all
/// injectors are dropped and the queue is drained.
#[derive(Debug)]
pub struct MemoryTransport {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<(Bytes, SocketAddr)>>,
    sent: Mutex<Vec<(Bytes, SocketAddr)>>,
    fail_sends: Mutex<bool>,
}

/// Handle used to feed datagrams into a [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct Injector {
    tx: mpsc::UnboundedSender<(Bytes, SocketAddr)>,
}

impl Injector {
    /// Queues a datagram. Returns `false` if the transport is gone.
    pub fn inject(&self, payload: impl Into<Bytes>, peer: SocketAddr) -> bool {
        self.tx.send((payload.into(), peer)).is_ok()
    }
}

impl MemoryTransport {
    pub fn channel() -> (Self, Injector) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            inbound: tokio::sync::Mutex::new(rx),
            sent: Mutex::new(Vec::new()),
            fail_sends: Mutex::new(false),
        };
        (transport, Injector { tx })
    }

    /// Makes every subsequent `send` fail, as an unreachable peer would.
    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock() = fail;
    }

    /// Everything sent so far, in completion order.
    pub fn sent(&self) -> Vec<(Bytes, SocketAddr)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DatagramTransport for MemoryTransport {
    async fn recv(&self) -> Result<(Bytes, SocketAddr), TransportError> {
        self.inbound
            .lock()
            .await
            .recv()
            .await
            .ok_or(TransportError::Closed)
    }

    async fn send(&self, payload: &[u8], peer: SocketAddr) -> Result<usize, TransportError> {
        if *self.fail_sends.lock() {
            return Err(TransportError::Send {
                peer,
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "peer unreachable"),
            });
        }
        self.sent
            .lock()
            .push((Bytes::copy_from_slice(payload), peer));
        Ok(payload.len())
    }
}
