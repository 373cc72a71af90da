mod feed;
mod live;
mod scene;
mod tracking;
mod utils;
mod web;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::live::{LiveView, Shared};
use crate::web::Config;

#[derive(Parser)]
#[command(name = "plane-o-mat")]
#[command(about = "Live aircraft tracking for a 3D map viewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and serve the tracking state over HTTP
    Serve {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Validate a config file
    Validate { config: String },
    /// Ingest recorded feed snapshots one poll interval apart and print the table
    Replay {
        #[arg(short, long)]
        config: Option<String>,
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::Validate { config } => validate(&config),
        Commands::Replay { config, snapshots } => replay(config.as_deref(), &snapshots),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading {}: {}", path, e);
            None
        }
    }
}

fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let feed = match (&config.feed.url, &config.feed.file) {
        (None, None) => "none, replay only".to_string(),
        _ => match config.feed.source() {
            Ok(source) => source.describe(),
            Err(e) => {
                eprintln!("Feed error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    println!("Config is valid");
    println!(
        "  feed: {} every {}",
        feed,
        utils::format_duration(config.feed.poll_interval)
    );
    println!(
        "  liveness: hide after {}, erase after {}",
        utils::format_duration(config.liveness.hide_after),
        utils::format_duration(config.liveness.evict_after)
    );
    println!(
        "  trail: {} samples ({})",
        config.trail.capacity, config.trail.policy
    );
    ExitCode::SUCCESS
}

fn replay(config_path: Option<&str>, snapshots: &[PathBuf]) -> ExitCode {
    let config = match config_path {
        Some(path) => match load_config(path) {
            Some(config) => config,
            None => return ExitCode::FAILURE,
        },
        None => Config::default(),
    };

    let view = LiveView::from_config(&config);
    let handle = view.handle();
    let step = match chrono::Duration::from_std(config.feed.poll_interval) {
        Ok(step) => step,
        Err(e) => {
            eprintln!("Poll interval out of range: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut now = Utc::now();

    for path in snapshots {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        };
        let batch = match feed::parse_batch(&content) {
            Ok(batch) => batch,
            Err(e) => {
                eprintln!("Error parsing {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        };

        let report = handle.lock().ingest(batch, now);
        println!(
            "{}: {} new, {} updated, {} revived, {} rejected, {} hidden, {} erased",
            path.display(),
            report.created,
            report.updated,
            report.revived,
            report.rejected,
            report.sweep.demoted.len(),
            report.sweep.evicted.len()
        );
        now += step;
    }

    print_table(&handle.lock(), now - step);
    ExitCode::SUCCESS
}

fn print_table(shared: &Shared, now: DateTime<Utc>) {
    let mut rows: Vec<_> = shared.table.iter().collect();
    rows.sort_by_key(|e| e.label());

    println!();
    if shared.table.is_empty() {
        println!("No aircraft tracked");
        return;
    }
    println!(
        "{:<10} {:<10} {:>8} {:>6} {:>6} {:>7} {:>6} {:<8}",
        "ID", "LABEL", "ALT", "SPD", "TRK", "IDLE", "TRAIL", "STATE"
    );
    for entity in rows {
        let t = &entity.telemetry;
        println!(
            "{:<10} {:<10} {:>8} {:>6} {:>6} {:>6.1}m {:>6} {:<8}",
            entity.id.as_str(),
            entity.label(),
            optional(t.altitude_ft),
            optional(t.speed_kts),
            optional(t.track_deg),
            entity.idle_minutes(now),
            entity.trail.len(),
            entity.liveness.to_string()
        );
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".into())
}
