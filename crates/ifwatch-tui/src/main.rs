//! `ifwatch` — live terminal dashboard for SNMP interface traffic.
//!
//! Polls one or more devices over SNMPv2c for IF-MIB counters and renders
//! continuously updating throughput, error, and discard rates in a
//! [ratatui](https://ratatui.rs) table. Interfaces can be narrowed down
//! with a regex and marked for visual priority; a slow or unreachable
//! device never stalls the others.
//!
//! Logs are written to a file (default `/tmp/ifwatch.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, fleet
//! discovery, and app launch.

mod action;
mod app;
mod event;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ifwatch_core::{Device, DisplayState, Scheduler, Unit};
use ifwatch_snmp::SnmpTarget;

use crate::app::App;

/// Live terminal dashboard for SNMP interface traffic.
#[derive(Parser, Debug)]
#[command(name = "ifwatch", version, about)]
struct Cli {
    /// Devices to poll
    #[arg(required = true)]
    hosts: Vec<String>,

    /// SNMP community string
    #[arg(short, long, default_value = "public", env = "IFWATCH_COMMUNITY")]
    community: String,

    /// Polling interval in seconds (minimum 5)
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(5..))]
    interval: u64,

    /// Terminate the dashboard after this many seconds
    #[arg(short, long, default_value_t = 3600)]
    lifespan: u64,

    /// Narrow down to interfaces whose name or description matches this
    /// regular expression
    #[arg(short = 'e', long = "filter", default_value = "")]
    filter: String,

    /// Initial display unit (bps, kbps, mbps, pps, kpps or mpps)
    #[arg(long, default_value = "bps")]
    unit: String,

    /// Per-request SNMP timeout in seconds
    #[arg(long, default_value_t = 3)]
    timeout: u64,

    /// Log file path
    #[arg(long, default_value = "/tmp/ifwatch.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application so logs flush on exit.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ifwatch={log_level},ifwatch_core={log_level},ifwatch_snmp={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("ifwatch.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

async fn discover_one(
    host: String,
    community: String,
    timeout: Duration,
) -> Result<Device<SnmpTarget>> {
    let target = SnmpTarget::resolve(&host, &community, timeout).await?;
    Ok(Device::discover(host, target).await?)
}

/// Resolve and discover every requested host concurrently. A host that
/// fails discovery is logged and dropped — it is not retried. Startup
/// fails only when nothing survives.
async fn discover_fleet(cli: &Cli) -> Result<Vec<Device<SnmpTarget>>> {
    let timeout = Duration::from_secs(cli.timeout);
    let attempts = cli.hosts.iter().map(|host| {
        discover_one(host.clone(), cli.community.clone(), timeout)
    });
    let results = futures::future::join_all(attempts).await;

    let mut devices = Vec::new();
    for (host, result) in cli.hosts.iter().zip(results) {
        match result {
            Ok(device) => {
                info!(host = host.as_str(), "device discovered");
                devices.push(device);
            }
            Err(e) => {
                warn!(host = host.as_str(), error = %e, "dropping device");
            }
        }
    }

    if devices.is_empty() {
        return Err(eyre!(
            "none of the requested hosts answered discovery — nothing to monitor"
        ));
    }
    Ok(devices)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    info!(
        hosts = ?cli.hosts,
        interval = cli.interval,
        lifespan = cli.lifespan,
        "starting ifwatch"
    );

    // Validate user input before touching the terminal
    let unit: Unit = cli.unit.parse()?;
    let display = DisplayState::new(&cli.filter, unit)?;

    let devices = discover_fleet(&cli).await?;

    let (poll_tx, poll_rx) = mpsc::unbounded_channel();
    let mut scheduler = Scheduler::new(Duration::from_secs(cli.interval), poll_tx);
    let handles: Vec<_> = devices
        .into_iter()
        .map(|device| scheduler.watch_device(device))
        .collect();
    scheduler.arm_lifespan(Duration::from_secs(cli.lifespan));

    let mut app = App::new(display, handles, poll_rx);
    let run_result = app.run().await;

    scheduler.shutdown().await;
    run_result
}
