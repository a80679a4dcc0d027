//! ## netpulse-cli
//! **Terminal front end for capture sessions**
//!
//! Starts a session, polls it on the configured refresh interval and prints
//! new packets, statistics and the traffic timeline.
//!
//! ### Expectations:
//! - Falls back to simulated traffic when live capture is unavailable
//! - Ctrl-C or `--duration` ends a capture; the worker is joined before exit
//! - Optional text report and Prometheus dump on exit

use clap::Parser;

use netpulse_telemetry::EventLogger;

mod commands;
mod error;
mod view;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    EventLogger::init(&config.telemetry.log_level)?;

    commands::run_command(cli.command, config).await?;
    Ok(())
}
