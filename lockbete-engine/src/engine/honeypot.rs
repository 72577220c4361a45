//! The sensor's receive loop.
//!
//! One datagram is handled at a time: classify, build the evidence record,
//! append it to the sink, then hand the request to the reply dispatcher.
//! Nothing a peer sends can stop the loop; only shutdown or a closed
//! transport ends it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use lockbete_config::LockbeteConfig;
use lockbete_core::{
    DatagramTransport, EventSink, RequestEvent, SnmpRequestRecord, TransportError, UdpTransport,
};
use lockbete_protocols::{Responder, SnmpClassifier};
use lockbete_telemetry::MetricsRecorder;

use crate::engine::dispatch::{Dispatch, ReplyDispatcher};
use crate::engine::error::EngineError;

/// Runtime knobs for [`Honeypot`], usually taken from [`LockbeteConfig`].
#[derive(Debug, Clone)]
pub struct HoneypotSettings {
    pub responder_enabled: bool,
    pub min_request_len: usize,
    pub max_in_flight: usize,
    pub recv_error_backoff: Duration,
}

impl HoneypotSettings {
    pub fn from_config(config: &LockbeteConfig) -> Self {
        Self {
            responder_enabled: config.responder.enabled,
            min_request_len: config.responder.min_request_len,
            max_in_flight: config.responder.max_in_flight,
            recv_error_backoff: Duration::from_millis(config.listener.recv_error_backoff_ms),
        }
    }
}

impl Default for HoneypotSettings {
    fn default() -> Self {
        Self::from_config(&LockbeteConfig::default())
    }
}

pub struct Honeypot<T: DatagramTransport + 'static> {
    transport: Arc<T>,
    classifier: SnmpClassifier,
    sink: Arc<dyn EventSink>,
    dispatcher: Option<ReplyDispatcher<T>>,
    metrics: Arc<MetricsRecorder>,
    recv_error_backoff: Duration,
}

impl Honeypot<UdpTransport> {
    /// Binds the configured UDP listener. Failing to bind is the one fatal
    /// condition of the sensor.
    pub async fn bind(
        config: &LockbeteConfig,
        sink: Arc<dyn EventSink>,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, EngineError> {
        let addr = config.listener.socket_addr();
        let transport = UdpTransport::bind(addr, config.listener.max_datagram_size).await?;
        match transport.local_addr() {
            Ok(local) => info!("SNMP Honeypot listening on {local}"),
            Err(_) => info!("SNMP Honeypot listening on {addr}"),
        }
        Ok(Self::new(
            Arc::new(transport),
            sink,
            metrics,
            HoneypotSettings::from_config(config),
        ))
    }
}

impl<T: DatagramTransport + 'static> Honeypot<T> {
    pub fn new(
        transport: Arc<T>,
        sink: Arc<dyn EventSink>,
        metrics: Arc<MetricsRecorder>,
        settings: HoneypotSettings,
    ) -> Self {
        let dispatcher = settings.responder_enabled.then(|| {
            ReplyDispatcher::new(
                transport.clone(),
                Responder::new(settings.min_request_len),
                settings.max_in_flight,
                metrics.clone(),
            )
        });

        Self {
            transport,
            classifier: SnmpClassifier::new(),
            sink,
            dispatcher,
            metrics,
            recv_error_backoff: settings.recv_error_backoff,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }

    /// Receives datagrams until `shutdown` resolves or the transport closes,
    /// then waits for in-flight replies.
    #[instrument(skip_all, name = "honeypot")]
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutting down SNMP Honeypot");
                    break;
                }
                received = self.transport.recv() => match received {
                    Ok((payload, peer)) => {
                        if let Some(Dispatch::Shed) = self.handle_datagram(payload, peer) {
                            debug!(%peer, "Request recorded without reply");
                        }
                    }
                    Err(TransportError::Closed) => {
                        info!("Transport closed, stopping receive loop");
                        break;
                    }
                    Err(e) => {
                        self.metrics.inc_receive_errors();
                        error!("Error in SNMP server: {e}");
                        tokio::select! {
                            biased;
                            _ = &mut shutdown => {
                                info!("Shutting down SNMP Honeypot");
                                break;
                            }
                            _ = sleep(self.recv_error_backoff) => {}
                        }
                    }
                }
            }
        }

        if let Some(dispatcher) = &self.dispatcher {
            debug!("Waiting for {} in-flight replies", dispatcher.in_flight());
            dispatcher.drain().await;
        }
    }

    /// Classifies and records one datagram, then dispatches its reply.
    ///
    /// Returns what the dispatcher did, or `None` when replies are disabled.
    /// A spawned reply task may be dropped; [`Honeypot::run_until`] drains
    /// outstanding replies before returning.
    pub fn handle_datagram(&self, payload: Bytes, peer: SocketAddr) -> Option<Dispatch> {
        self.metrics.inc_datagrams();
        let event = RequestEvent::received(peer, payload);
        info!(
            "SNMP request from {}:{} - {} bytes",
            peer.ip().to_canonical(),
            peer.port(),
            event.payload.len()
        );

        let started = Instant::now();
        let classification = self.classifier.classify(&event.payload);
        self.metrics
            .observe_classification_ns(started.elapsed().as_nanos() as f64);

        if classification.looks_like_snmp {
            self.metrics.inc_snmp_detected();
        }
        if let Some(fault) = &classification.parsing_error {
            warn!(%peer, "Classifier fault: {fault}");
        }

        let record = SnmpRequestRecord::new(&event, &classification);
        if let Err(e) = self.sink.append(&record) {
            self.metrics.inc_sink_failures();
            error!("Failed to log SNMP request: {e}");
        }

        self.dispatcher
            .as_ref()
            .map(|dispatcher| dispatcher.dispatch(&event.payload, peer))
    }
}
