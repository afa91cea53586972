//! Extractor Service - Turns yearly arrivals tables into a clean monthly series
//!
//! Responsibilities:
//! - Load the raw workbook (or its CSV export) into a cell grid
//! - Detect yearly blocks and rebuild wrapped entity names
//! - Collapse duplicate (entity, year, month) keys by summation
//! - Write the long-format table atomically
//! - Print a sanity summary (years present, duplicate count)
//!
//! Usage:
//!   cargo run --bin extractor
//!   cargo run --bin extractor -- --input data/raw.xlsx --output data/processed.csv
//!   cargo run --bin extractor -- --config config/extract.json --report outputs/extract_report.json

use anyhow::{Context, Result};
use clap::Parser;
use extractor::emit::count_duplicate_keys;
use extractor::output::{write_table, RunReport};
use extractor::{extract, ExtractConfig, RawGrid};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_INPUT: &str = "data/raw.xlsx";
const DEFAULT_OUTPUT: &str = "data/processed.csv";

#[derive(Parser, Debug)]
#[command(name = "extractor", about = "Extracts monthly arrivals from yearly tables")]
struct Args {
    /// Raw workbook or CSV export (env: ARRIVALS_INPUT, default: data/raw.xlsx)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output CSV (env: ARRIVALS_OUTPUT, default: data/processed.csv)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Sheet name; defaults to the first sheet (env: ARRIVALS_SHEET)
    #[arg(long)]
    sheet: Option<String>,

    /// JSON file overriding extraction constants and adding aliases (env: ARRIVALS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Dry run - extract and summarize without writing the table
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

/// Flag, then environment variable, then default.
fn resolve_path(flag: Option<PathBuf>, env_key: &str, default: &str) -> PathBuf {
    flag.or_else(|| std::env::var_os(env_key).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn load_config(path: Option<&Path>) -> Result<ExtractConfig> {
    match path {
        Some(p) => {
            info!("Loading extraction config: {}", p.display());
            Ok(ExtractConfig::load(p)?)
        }
        None => Ok(ExtractConfig::default()),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    let input = resolve_path(args.input, "ARRIVALS_INPUT", DEFAULT_INPUT);
    let output = resolve_path(args.output, "ARRIVALS_OUTPUT", DEFAULT_OUTPUT);
    let sheet = args.sheet.or_else(|| std::env::var("ARRIVALS_SHEET").ok());
    let config_path = args
        .config
        .or_else(|| std::env::var_os("ARRIVALS_CONFIG").map(PathBuf::from));

    println!("=== Arrivals Extractor ===");
    println!("Input: {}", input.display());
    println!("Mode: {}", if args.dry_run { "dry-run" } else { "live" });

    let config = load_config(config_path.as_deref())?;

    let grid = RawGrid::load(&input, sheet.as_deref())
        .with_context(|| format!("Failed to load input '{}'", input.display()))?;
    info!("Loaded {} rows", grid.len());

    let extraction = extract(&grid, &config)?;
    let records = &extraction.table.records;

    if args.dry_run {
        println!("\nDry run - table not written");
    } else {
        write_table(&output, records)?;
        println!("\nProcessed dataset saved at:");
        println!(
            "{}",
            std::fs::canonicalize(&output)
                .unwrap_or_else(|_| output.clone())
                .display()
        );
    }

    if let Some(report_path) = &args.report {
        let written = (!args.dry_run).then_some(output.as_path());
        RunReport::new(&extraction, &input, written).write(report_path)?;
        info!("Run report written to {}", report_path.display());
    }

    // Quick sanity checks
    let years: Vec<i32> = extraction.years().into_iter().collect();
    println!("Years: {:?}", years);
    println!("Entities: {}", extraction.entity_count());
    println!("Rows: {}", records.len());
    println!("Duplicates: {}", count_duplicate_keys(records));

    Ok(())
}
