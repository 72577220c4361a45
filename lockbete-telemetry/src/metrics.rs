//! ## lockbete-telemetry::metrics
//! **Prometheus counters and the classification latency histogram**

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

use crate::TelemetryError;

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub datagrams: IntCounter,
    pub snmp_detected: IntCounter,
    pub replies_sent: IntCounter,
    pub reply_failures: IntCounter,
    pub replies_shed: IntCounter,
    pub sink_failures: IntCounter,
    pub receive_errors: IntCounter,
    pub classification_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> Result<IntCounter, TelemetryError> {
            let counter = IntCounter::new(name, help)?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };

        let datagrams = counter("lockbete_datagrams_total", "Datagrams received")?;
        let snmp_detected = counter(
            "lockbete_snmp_detected_total",
            "Datagrams whose first byte is an ASN.1 SEQUENCE",
        )?;
        let replies_sent = counter("lockbete_replies_sent_total", "Decoy replies transmitted")?;
        let reply_failures = counter(
            "lockbete_reply_failures_total",
            "Decoy replies that failed to transmit",
        )?;
        let replies_shed = counter(
            "lockbete_replies_shed_total",
            "Decoy replies skipped while the in-flight bound was reached",
        )?;
        let sink_failures = counter(
            "lockbete_sink_failures_total",
            "Evidence records that could not be written",
        )?;
        let receive_errors = counter(
            "lockbete_receive_errors_total",
            "Socket receive errors",
        )?;

        let classification_latency = Histogram::with_opts(
            HistogramOpts::new(
                "lockbete_classification_latency_ns",
                "Classifier processing time",
            )
            .buckets(vec![1_000.0, 10_000.0, 100_000.0, 1_000_000.0]),
        )?;
        registry.register(Box::new(classification_latency.clone()))?;

        Ok(Self {
            registry,
            datagrams,
            snmp_detected,
            replies_sent,
            reply_failures,
            replies_shed,
            sink_failures,
            receive_errors,
            classification_latency,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn inc_datagrams(&self) {
        self.datagrams.inc();
    }

    pub fn inc_snmp_detected(&self) {
        self.snmp_detected.inc();
    }

    pub fn inc_replies_sent(&self) {
        self.replies_sent.inc();
    }

    pub fn inc_reply_failures(&self) {
        self.reply_failures.inc();
    }

    pub fn inc_replies_shed(&self) {
        self.replies_shed.inc();
    }

    pub fn inc_sink_failures(&self) {
        self.sink_failures.inc();
    }

    pub fn inc_receive_errors(&self) {
        self.receive_errors.inc();
    }

    #[inline]
    pub fn observe_classification_ns(&self, nanos: f64) {
        self.classification_latency.observe(nanos);
    }
}
