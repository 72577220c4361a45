//! ## lockbete-telemetry::logging
//! **Operational log setup**
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::TelemetryError;

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Install the global `fmt` subscriber. Fails if one is already set.
    pub fn init(default_level: &str) -> Result<(), TelemetryError> {
        let filter = Self::filter_for(default_level)?;
        let subscriber = fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;
        info!("Operational logging initialised (default level: {default_level})");
        Ok(())
    }

    /// Filter used by [`EventLogger::init`].
    pub fn filter_for(default_level: &str) -> Result<EnvFilter, TelemetryError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => {
                EnvFilter::try_new(default_level).map_err(|e| TelemetryError::Filter {
                    directive: default_level.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
