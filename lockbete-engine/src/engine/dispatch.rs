//! Decoy reply dispatch.
//!
//! Each reply is sent from its own task so a slow or failing peer never holds
//! up the receive loop. A semaphore bounds how many sends may be outstanding;
//! once the bound is reached further replies are shed rather than queued.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use lockbete_core::{DatagramTransport, TransportError};
use lockbete_protocols::Responder;
use lockbete_telemetry::MetricsRecorder;

/// How a single reply send ended.
#[derive(Debug)]
pub enum ReplyOutcome {
    Sent(usize),
    Failed(TransportError),
}

/// What [`ReplyDispatcher::dispatch`] did with a request.
#[derive(Debug)]
pub enum Dispatch {
    /// The request was too short to answer.
    NoReply,
    /// A send task is running.
    Spawned(JoinHandle<ReplyOutcome>),
    /// Too many replies already in flight.
    Shed,
}

pub struct ReplyDispatcher<T: DatagramTransport + 'static> {
    transport: Arc<T>,
    responder: Responder,
    permits: Arc<Semaphore>,
    capacity: u32,
    metrics: Arc<MetricsRecorder>,
}

impl<T: DatagramTransport + 'static> ReplyDispatcher<T> {
    pub fn new(
        transport: Arc<T>,
        responder: Responder,
        max_in_flight: usize,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        let capacity = max_in_flight.clamp(1, u32::MAX as usize) as u32;
        Self {
            transport,
            responder,
            permits: Arc::new(Semaphore::new(capacity as usize)),
            capacity,
            metrics,
        }
    }

    /// Replies currently being sent.
    pub fn in_flight(&self) -> usize {
        self.capacity as usize - self.permits.available_permits()
    }

    /// Decides on a reply for `request` and, if there is one, sends it to
    /// `peer` from a background task. Never blocks.
    pub fn dispatch(&self, request: &[u8], peer: SocketAddr) -> Dispatch {
        let Some(reply) = self.responder.synthesize_reply(request) else {
            return Dispatch::NoReply;
        };

        let permit = match self.permits.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.metrics.inc_replies_shed();
                debug!(%peer, "Reply shed: {} replies already in flight", self.capacity);
                return Dispatch::Shed;
            }
        };

        let transport = self.transport.clone();
        let metrics = self.metrics.clone();
        Dispatch::Spawned(tokio::spawn(async move {
            let _permit = permit;
            send_reply(transport.as_ref(), reply, peer, &metrics).await
        }))
    }

    /// Waits until every reply dispatched so far has finished.
    pub async fn drain(&self) {
        match self.permits.acquire_many(self.capacity).await {
            Ok(_all) => debug!("All in-flight replies finished"),
            Err(e) => error!("Reply semaphore closed while draining: {e}"),
        }
    }
}

async fn send_reply<T: DatagramTransport + ?Sized>(
    transport: &T,
    reply: Bytes,
    peer: SocketAddr,
    metrics: &MetricsRecorder,
) -> ReplyOutcome {
    match transport.send(&reply, peer).await {
        Ok(sent) => {
            metrics.inc_replies_sent();
            debug!(%peer, "Sent SNMP response ({sent} bytes)");
            ReplyOutcome::Sent(sent)
        }
        Err(e) => {
            metrics.inc_reply_failures();
            error!("Error sending SNMP response: {e}");
            ReplyOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::net::{IpAddr, Ipv4Addr};

    use async_trait::async_trait;
    use lockbete_core::MemoryTransport;
    use lockbete_protocols::REPLY_TEMPLATE;
    use tokio::sync::Notify;

    fn peer(n: u32) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::from(0x0A00_0000 + n)), 40_000 + (n % 20_000) as u16)
    }

    fn dispatcher<T: DatagramTransport + 'static>(transport: Arc<T>, max_in_flight: usize) -> ReplyDispatcher<T> {
        ReplyDispatcher::new(
            transport,
            Responder::default(),
            max_in_flight,
            Arc::new(MetricsRecorder::new().unwrap()),
        )
    }

    /// Holds every send until released.
    struct GatedTransport {
        gate: Notify,
    }

    #[async_trait]
    impl DatagramTransport for GatedTransport {
        async fn recv(&self) -> Result<(Bytes, SocketAddr), TransportError> {
            Err(TransportError::Closed)
        }

        async fn send(&self, payload: &[u8], _peer: SocketAddr) -> Result<usize, TransportError> {
            self.gate.notified().await;
            Ok(payload.len())
        }
    }

    #[tokio::test]
    async fn short_requests_are_not_answered() {
        let (transport, _injector) = MemoryTransport::channel();
        let dispatcher = dispatcher(Arc::new(transport), 4);

        assert!(matches!(dispatcher.dispatch(&[0x30; 10], peer(1)), Dispatch::NoReply));
        assert!(matches!(dispatcher.dispatch(&[], peer(1)), Dispatch::NoReply));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn send_failure_is_reported_not_raised() {
        let (transport, _injector) = MemoryTransport::channel();
        transport.fail_sends(true);
        let dispatcher = dispatcher(Arc::new(transport), 4);

        let Dispatch::Spawned(handle) = dispatcher.dispatch(&[0u8; 11], peer(2)) else {
            panic!("expected a reply task");
        };
        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, ReplyOutcome::Failed(TransportError::Send { .. })));
        assert_eq!(dispatcher.metrics.reply_failures.get(), 1);
    }

    #[tokio::test]
    async fn concurrent_replies_reach_their_own_peers() {
        let (transport, _injector) = MemoryTransport::channel();
        let transport = Arc::new(transport);
        let dispatcher = dispatcher(transport.clone(), 1024);

        let mut handles = Vec::new();
        for n in 0..1000 {
            match dispatcher.dispatch(&[0xA0; 32], peer(n)) {
                Dispatch::Spawned(handle) => handles.push(handle),
                other => panic!("dispatch {n} was {other:?}"),
            }
        }
        for handle in handles {
            assert!(matches!(handle.await.unwrap(), ReplyOutcome::Sent(26)));
        }

        let sent = transport.sent();
        assert_eq!(sent.len(), 1000);
        assert!(sent.iter().all(|(payload, _)| payload.as_ref() == REPLY_TEMPLATE));
        let peers: HashSet<_> = sent.iter().map(|(_, addr)| *addr).collect();
        let expected: HashSet<_> = (0..1000).map(peer).collect();
        assert_eq!(peers, expected);
    }

    #[tokio::test]
    async fn replies_beyond_the_bound_are_shed() {
        let transport = Arc::new(GatedTransport { gate: Notify::new() });
        let dispatcher = dispatcher(transport.clone(), 2);

        let first = dispatcher.dispatch(&[0u8; 20], peer(1));
        let second = dispatcher.dispatch(&[0u8; 20], peer(2));
        assert!(matches!(first, Dispatch::Spawned(_)));
        assert!(matches!(second, Dispatch::Spawned(_)));
        assert_eq!(dispatcher.in_flight(), 2);

        assert!(matches!(dispatcher.dispatch(&[0u8; 20], peer(3)), Dispatch::Shed));
        assert_eq!(dispatcher.metrics.replies_shed.get(), 1);

        // notify_waiters only wakes sends that are already parked.
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while dispatcher.in_flight() > 0 {
                transport.gate.notify_waiters();
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        dispatcher.drain().await;
        assert_eq!(dispatcher.metrics.replies_sent.get(), 2);
    }
}
