//! Lookout Monitor - Main Entry Point

use std::path::PathBuf;
use std::sync::Arc;

use alarm_audio::FileCheckedSink;
use anyhow::Context;
use clap::Parser;
use head_tracking::{OrientationSource, ReplaySource, TrackingReference};
use lookout_config::Settings;
use lookout_engine::LookoutEngine;
use lookout_monitor::{init_logging, AlwaysActive, ControlFlags, EngineDriver, LineFeedSource};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lookout-monitor", version, about = "Head-orientation lookout alarms")]
struct Args {
    /// Settings file (JSON). Built-in presets are used when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// JSON-lines orientation recording. Reads stdin when omitted.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Directory holding alarm sounds. Without it playback is only logged.
    #[arg(long)]
    sound_dir: Option<PathBuf>,

    /// Follow a rolling median of recent poses instead of a fixed forward
    #[arg(long, default_value_t = false)]
    rolling_center: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// JSON log output
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs);

    info!("=== Lookout Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => {
            info!("No settings file given, using built-in alarms");
            Settings::default()
        }
    };

    let sink = match &args.sound_dir {
        Some(dir) => FileCheckedSink::new(dir),
        None => FileCheckedSink::log_only(),
    };
    let engine = LookoutEngine::new(&settings, Arc::new(sink)).context("building lookout engine")?;

    let reference = if args.rolling_center {
        TrackingReference::rolling()
    } else {
        TrackingReference::default()
    };
    info!("Forward reference mode: {:?}", reference.mode());
    let source: Box<dyn OrientationSource> = match &args.replay {
        Some(path) => Box::new(
            ReplaySource::open(path, reference)
                .with_context(|| format!("opening replay {}", path.display()))?,
        ),
        None => Box::new(LineFeedSource::stdin(reference).context("starting stdin feed")?),
    };

    let control = ControlFlags::new();
    let mut driver = EngineDriver::new(engine, source, AlwaysActive, control, &settings.engine);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let summary = driver.run(shutdown).await;

    info!(
        "Session summary: {} ticks, {} warnings, {} completed lookouts",
        summary.ticks, summary.warnings, summary.scans
    );
    Ok(())
}
