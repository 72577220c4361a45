use thiserror::Error;

use lockbete_core::{SinkError, TransportError};
use lockbete_telemetry::TelemetryError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The listening socket could not be set up. Fatal.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Evidence sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}
