//! # Lockbete Telemetry
//!
//! Operational logging and Prometheus metrics for the sensor. The evidence
//! log lives in `lockbete-core`; this crate only covers the operator's view.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
