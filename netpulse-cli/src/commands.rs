use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::{signal, task, time};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::info;

use netpulse_config::NetpulseConfig;
use netpulse_engine::{CaptureMode, SessionController};
use netpulse_stats::format_packet_details;

use crate::error::CliError;
use crate::view::{self, LiveView};

#[derive(Parser)]
#[command(version, about = "Packet capture sessions with live traffic statistics")]
pub struct Cli {
    /// Configuration file; defaults to config/netpulse.yaml when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture traffic, falling back to simulated packets without a capture backend
    Capture(CaptureArgs),
    /// Load a generated sample batch and print it
    Sample(SampleArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Generate simulated traffic instead of opening a capture device
    #[arg(long)]
    pub simulate: bool,
    /// Stop after this many seconds; runs until Ctrl-C otherwise
    #[arg(short, long)]
    pub duration: Option<u64>,
    /// Write a text report into this directory when the capture ends
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Write a text report into this directory
    #[arg(short, long)]
    pub export: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Print the full details of one packet (1-indexed)
    #[arg(short, long)]
    pub packet: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Yaml,
}

pub fn load_config(path: Option<&Path>) -> Result<NetpulseConfig, CliError> {
    let config = match path {
        Some(path) => NetpulseConfig::load_from_path(path)?,
        None => NetpulseConfig::load()?,
    };
    Ok(config)
}

pub async fn run_command(command: Commands, config: NetpulseConfig) -> Result<(), CliError> {
    match command {
        Commands::Capture(args) => run_capture(args, config).await,
        Commands::Sample(args) => run_sample(args, config),
    }
}

async fn run_capture(args: CaptureArgs, config: NetpulseConfig) -> Result<(), CliError> {
    let display = config.display.clone();
    let report_metrics = config.telemetry.metrics.report_on_exit;
    let session = Arc::new(SessionController::new(config)?);
    let events = session.status_events();

    let mode = if args.simulate {
        CaptureMode::Simulated
    } else {
        CaptureMode::Live
    };
    let mut view = LiveView::new(display.clone(), session.cursor());
    let capture_type = session.start(mode)?;
    info!(%capture_type, "Press Ctrl-C to stop");

    let mut refresh = time::interval(Duration::from_millis(display.refresh_interval_ms));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                info!("Interrupted");
                break;
            }
            _ = refresh.tick() => {
                let stopped = view.drain_events(&events);
                view.refresh(&session);
                if stopped || deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
            }
        }
    }

    let stopper = Arc::clone(&session);
    task::spawn_blocking(move || stopper.stop()).await?;
    view.drain_events(&events);
    view.refresh(&session);
    view.print_charts(&session);

    if let Some(dir) = args.export {
        let path = session.export_report(&dir)?;
        println!("Report written to {}", path.display());
    }
    if report_metrics {
        print!("{}", session.metrics().gather_metrics()?);
    }
    Ok(())
}

fn run_sample(args: SampleArgs, config: NetpulseConfig) -> Result<(), CliError> {
    let display = config.display.clone();
    let session = SessionController::new(config)?;
    session.load_sample()?;
    let snapshot = session.snapshot();

    if let Some(number) = args.packet {
        let record = number
            .checked_sub(1)
            .and_then(|index| snapshot.records.get(index))
            .ok_or(CliError::PacketIndex {
                index: number,
                len: snapshot.records.len(),
            })?;
        print!(
            "{}",
            format_packet_details(record, snapshot.capture_type, &Local)
        );
    } else {
        match args.format {
            OutputFormat::Text => {
                let shown = &snapshot.records[..snapshot.records.len().min(display.packet_rows)];
                print!("{}", view::render_rows(shown, 1, &Local));
                if shown.len() < snapshot.records.len() {
                    println!("... {} more packets", snapshot.records.len() - shown.len());
                }
                println!();
                print!("{}", view::render_summary(&snapshot.summary));
                println!();
                print!(
                    "{}",
                    view::render_timeline(
                        &session.timeline(display.timeline_bucket_secs),
                        &Local
                    )
                );
            }
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&snapshot.summary)?),
        }
    }

    if let Some(dir) = args.export {
        let path = session.export_report(&dir)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_capture_flags() {
        let cli = Cli::try_parse_from([
            "netpulse", "capture", "--simulate", "-d", "5", "--export", "/tmp",
        ])
        .unwrap();
        let Commands::Capture(args) = cli.command else {
            panic!("expected capture");
        };
        assert!(args.simulate);
        assert_eq!(args.duration, Some(5));
        assert_eq!(args.export, Some(PathBuf::from("/tmp")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["netpulse", "sample", "--config", "lab.yaml", "-f", "yaml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("lab.yaml")));
        let Commands::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.format, OutputFormat::Yaml);
        assert!(args.packet.is_none());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["netpulse", "sample", "--format", "xml"]).is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = load_config(Some(Path::new("/nonexistent/netpulse.yaml"))).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(netpulse_config::ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn packet_zero_is_out_of_range() {
        let args = SampleArgs {
            export: None,
            format: OutputFormat::Text,
            packet: Some(0),
        };
        let err = run_sample(args, NetpulseConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::PacketIndex { index: 0, len: 200 }));
    }
}
