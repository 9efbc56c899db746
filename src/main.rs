mod aggregator;
mod attributes;
mod errors;
mod manifest;
mod stats;
mod table;
mod types;
mod walker;

use aggregator::{ScanOutcome, scan_datasets};
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use types::{MissingPolicy, ScanConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Top directory to look for XML manifests. All subdirectories are
    /// included, recursively.
    top_dir: PathBuf,

    /// Output CSV file
    #[arg(long, default_value = "datasetinfo.csv")]
    csv: PathBuf,

    /// File receiving one missing ntuple path per line (skip policy only)
    #[arg(long, default_value = "missing.txt")]
    missing_log: PathBuf,

    /// What to do when a referenced ntuple does not exist on disk
    #[arg(long, value_enum, default_value = "skip")]
    on_missing: MissingPolicy,

    /// Pause after every N processed references (0 disables throttling)
    #[arg(long, default_value_t = 5000)]
    throttle_every: usize,

    /// Seconds to pause when throttling
    #[arg(long, default_value_t = 5)]
    throttle_secs: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!(
        "{}",
        format!(
            "=== Dataset Inventory: {} ===",
            Local::now().format("%Y-%m-%d %H:%M")
        )
        .cyan()
    );

    let config = ScanConfig {
        policy: args.on_missing,
        throttle_every: args.throttle_every,
        throttle_pause: Duration::from_secs(args.throttle_secs),
    };

    let outcome = match scan_datasets(&args.top_dir, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            std::process::exit(1);
        }
    };

    println!(
        "Scanned {} manifests, {} references.",
        outcome.manifests, outcome.references
    );

    if args.on_missing == MissingPolicy::Skip {
        write_missing_log(&outcome, &args.missing_log);
    }

    table::print_preview(&outcome.table, 5);
    table::print_column_summary(&outcome.table);
    stats::print_size_summary(&stats::calculate_size_summary(outcome.table.sizes()));
    stats::print_usage(
        "Size by User",
        &stats::calculate_usage(outcome.table.user_sizes()),
    );
    stats::print_usage(
        "Size by Year",
        &stats::calculate_usage(outcome.table.year_sizes()),
    );

    println!("\nRows: {}", outcome.table.len());
    println!(
        "Total size: {} ({:.4} TB)",
        human_bytes::human_bytes(outcome.table.total_size_mb() * 1_048_576.0).green(),
        outcome.table.total_size_tb()
    );

    if let Err(e) = outcome.table.write_csv(&args.csv) {
        eprintln!("Error writing {}: {e}", args.csv.display());
        std::process::exit(1);
    }
    println!("Table written to {}", args.csv.display());
}

fn write_missing_log(outcome: &ScanOutcome, missing_log: &Path) {
    let mut body = outcome.missing.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    if let Err(e) = fs::write(missing_log, body) {
        eprintln!("Error writing {}: {e}", missing_log.display());
        std::process::exit(1);
    }
    if !outcome.missing.is_empty() {
        println!(
            "{}",
            format!(
                "{} referenced ntuples missing on disk, listed in {}",
                outcome.missing.len(),
                missing_log.display()
            )
            .yellow()
        );
    }
}
