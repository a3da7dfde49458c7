//! adfeed-sim - run a feed scenario through the ad placement engine.
//!
//! Reads a JSON scenario, pages it through the interleaver, and prints the
//! resulting feed and fill summary as JSON on stdout. Logs go to stderr and,
//! optionally, to a daily-rotated file.

use std::path::PathBuf;

use adfeed_core::EngineConfig;
use adfeed_sim::{Scenario, SimulationOptions, Simulator};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Simulate ad placement for a feed scenario
#[derive(Parser, Debug)]
#[command(name = "adfeed-sim", version, about)]
struct Args {
    /// Scenario JSON file (config, items, ads, starting exposure)
    scenario: PathBuf,

    /// Engine config JSON file, overriding the scenario's config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content items per page (0 = whole feed in one page)
    #[arg(short, long, default_value_t = 0)]
    page_size: usize,

    /// Compute placements without carrying exposure between pages
    #[arg(long)]
    preview: bool,

    /// Count each page's ads toward the session total before the next page
    #[arg(long)]
    track_impressions: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write logs to this directory (rotated daily)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Initialize logging, optionally with file rotation.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "adfeed_sim={level},adfeed_core={level},warn",
            level = log_level
        ))
    });

    if let Some(log_dir) = &args.log_dir {
        if std::fs::create_dir_all(log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("adfeed-sim")
                .filename_suffix("log")
                .build(log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stderr))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::warn!("File logging unavailable, using stderr only");
        return None;
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    None
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args);

    let mut scenario = Scenario::from_path(&args.scenario)?;
    if let Some(path) = &args.config {
        scenario.config = EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }

    tracing::info!(
        items = scenario.items.len(),
        ads = scenario.ads.len(),
        page_size = args.page_size,
        preview = args.preview,
        "Running scenario"
    );

    let options = SimulationOptions {
        page_size: args.page_size,
        preview: args.preview,
        track_impressions: args.track_impressions,
    };
    let report = Simulator::new(&scenario.config, options)?.run(&scenario);

    tracing::info!(
        videos = report.videos,
        ads = report.ads,
        fill_rate = report.fill_rate,
        "Simulation complete"
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
