use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use lockbete_config::LockbeteConfig;
use lockbete_core::{EventSink, RequestEvent, SnmpRequestRecord, WriterSink};
use lockbete_engine::run_honeypot;
use lockbete_protocols::{Responder, SnmpClassifier};
use lockbete_telemetry::EventLogger;

#[derive(Parser)]
#[command(name = "lockbete", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the SNMP sensor until Ctrl-C
    Run(RunArgs),
    /// Classify a hex-encoded payload and print its evidence record
    Classify(ClassifyArgs),
    /// Load and validate configuration, then print it
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file; defaults to config/lockbete.yaml plus overlays
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to bind, overriding the configuration
    #[arg(short, long)]
    pub bind: Option<IpAddr>,
    /// UDP port, overriding the configuration
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Payload as hex; whitespace is ignored
    pub hex: String,
    /// Reply threshold to report against
    #[arg(long, default_value_t = lockbete_protocols::snmp::DEFAULT_MIN_REQUEST_LEN)]
    pub min_request_len: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CheckConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Classify(args) => {
            classify(&args, std::io::stdout())?;
            Ok(())
        }
        Commands::CheckConfig(args) => {
            let config = load_config(args.config.as_deref())?;
            println!("{config:#?}");
            println!("Configuration OK");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<LockbeteConfig> {
    match path {
        Some(path) => LockbeteConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => LockbeteConfig::load().context("Failed to load configuration"),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    EventLogger::init(&config.telemetry.log_level)?;
    info!("Starting SNMP Honeypot on {}", config.listener.socket_addr());

    run_honeypot(&config, shutdown_signal())
        .await
        .context("Failed to start SNMP honeypot")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl-C handler unavailable, running until killed: {e}");
        std::future::pending::<()>().await;
    }
}

/// Writes the evidence record for `hex` as one JSON line, followed by a
/// line saying whether a reply would be sent.
fn classify<W: Write + Send>(args: &ClassifyArgs, out: W) -> Result<W> {
    let compact: String = args.hex.split_whitespace().collect();
    let payload = hex::decode(&compact).context("Payload is not valid hex")?;

    let peer = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
    let event = RequestEvent::received(peer, Bytes::from(payload));
    let classification = SnmpClassifier::new().classify(&event.payload);
    let record = SnmpRequestRecord::new(&event, &classification);

    let sink = WriterSink::new(out);
    sink.append(&record)?;
    let mut out = sink.into_inner();

    match Responder::new(args.min_request_len).synthesize_reply(&event.payload) {
        Some(reply) => writeln!(out, "reply: {}", hex::encode(reply))?,
        None => writeln!(out, "reply: none")?,
    }
    Ok(out)
}
