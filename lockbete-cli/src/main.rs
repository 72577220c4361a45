//! ## lockbete-cli
//! **Operator interface for the SNMP deception sensor**
//!
//! `lockbete run` starts the sensor, `lockbete classify` inspects a captured
//! payload offline and `lockbete check-config` validates configuration.
//! A bind failure at startup is returned from `main`, so the process exits
//! non-zero.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
