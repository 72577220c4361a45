/*!
# Sensor Runtime

Wires configuration, the evidence sink, metrics and the UDP listener into a
running [`Honeypot`]. Frontends call [`run_honeypot`] and supply the shutdown
signal.
*/

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use lockbete_config::LockbeteConfig;
use lockbete_core::{EventSink, JsonLinesSink};
use lockbete_telemetry::MetricsRecorder;

use crate::engine::{EngineError, Honeypot};

/// Runs the sensor until `shutdown` resolves.
///
/// # Errors
/// Fails before receiving anything if the evidence directory cannot be
/// created or the listener cannot be bound.
#[instrument(level = "info", name = "run_honeypot", skip_all, fields(port = config.listener.port))]
pub async fn run_honeypot<F>(config: &LockbeteConfig, shutdown: F) -> Result<(), EngineError>
where
    F: Future<Output = ()>,
{
    let metrics = Arc::new(MetricsRecorder::new()?);
    let sink = JsonLinesSink::open(&config.sink.path, config.sink.create_dirs)?;
    info!("Logging SNMP requests to {}", sink.path().display());
    let sink: Arc<dyn EventSink> = Arc::new(sink);

    let honeypot = Honeypot::bind(config, sink, metrics.clone()).await?;
    honeypot.run_until(shutdown).await;

    match metrics.gather_metrics() {
        Ok(snapshot) => debug!("Final metrics:\n{snapshot}"),
        Err(e) => warn!("Failed to render metrics: {e}"),
    }
    info!(
        "SNMP Honeypot stopped after {} datagrams",
        metrics.datagrams.get()
    );
    Ok(())
}
