//! passgate - QR code access gate emulator
//!
//! Runs the gate against a simulated camera. Operator commands and the
//! codes held in front of the camera are typed on stdin.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use passgate_core::FacingMode;
use passgate_core::constants::{ADMISSION_THRESHOLD, DEFAULT_TICK_INTERVAL_MS};
use passgate_hardware::mock::MockCamera;
use passgate_hardware::{AnyCameraDevice, MarkerDecoder};
use passgate_scanner::{Gate, GateCommand, GateConfig};
use passgate_storage::{Database, DatabaseConfig, SqliteKeyValueStore};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod console;

/// passgate - QR code access gate emulator
#[derive(Parser, Debug)]
#[command(name = "passgate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the ledger database
    #[arg(short, long, default_value = "passgate.db")]
    database: PathBuf,

    /// Keep presentation counters in memory only
    #[arg(long)]
    in_memory: bool,

    /// Camera used at launch (user/front or environment/back)
    #[arg(short, long, default_value = "environment")]
    facing: FacingMode,

    /// Scan tick interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Highest presentation count that is still admitted
    #[arg(long, default_value_t = ADMISSION_THRESHOLD)]
    threshold: u32,

    /// Do not start the camera on launch
    #[arg(long)]
    no_autostart: bool,

    /// Print every gate event as a JSON line
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = GateConfig::default()
        .tick_interval(Duration::from_millis(cli.tick_ms))
        .default_facing(cli.facing)
        .admission_threshold(cli.threshold);
    config.validate().context("Invalid gate configuration")?;

    let db = if cli.in_memory {
        Database::in_memory().await
    } else {
        Database::new(DatabaseConfig::new(&cli.database)).await
    }
    .context("Failed to open ledger database")?;

    let (camera, camera_handle) = MockCamera::new();
    let mut gate = Gate::new(
        config.clone(),
        AnyCameraDevice::from(camera),
        MarkerDecoder::new(),
        SqliteKeyValueStore::new(db.pool().clone()),
    );

    let (command_tx, command_rx) = mpsc::channel(config.event_capacity);
    let (event_tx, event_rx) = mpsc::channel(config.event_capacity);

    if !cli.no_autostart {
        command_tx
            .send(GateCommand::Start)
            .await
            .context("Failed to queue camera start")?;
    }

    console::print_help();
    let reader = tokio::spawn(console::read_commands(command_tx, camera_handle));
    let printer = tokio::spawn(console::print_events(event_rx, cli.json));

    info!(
        version = passgate_core::VERSION,
        facing = %cli.facing,
        in_memory = cli.in_memory,
        "passgate started"
    );
    gate.run(command_rx, event_tx)
        .await
        .context("Gate stopped with an error")?;

    reader.abort();
    printer.await.context("Event printer failed")?;
    db.close().await;

    Ok(())
}
