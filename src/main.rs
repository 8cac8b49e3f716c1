use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use chaintable_rs::harness::{run_benchmark, BenchConfig, DEFAULT_SEED};
use chaintable_rs::logger::initialize_logger;
use chaintable_rs::record::{load_games, Game};
use chaintable_rs::report::append_report;
use chaintable_rs::{GrowthPolicy, TableConfig, DEFAULT_LOAD_FACTOR};

/// Times insert, contains and remove on a chaining hash table for sorted, shuffled and
/// reversed arrangements of a steam games CSV export.
#[derive(Parser, Debug)]
#[command(name = "chainbench", version, about)]
struct Args {
    /// CSV export to read (first line is a header)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Number of data lines to read; also the capacity hint of every table
    #[arg(value_name = "LINES")]
    lines: usize,

    /// Report file the result row is appended to
    #[arg(long, default_value = "analysis.csv")]
    report: PathBuf,

    /// Seed for the shuffled arrangement
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Grow once len / buckets exceeds this ratio
    #[arg(long, default_value_t = DEFAULT_LOAD_FACTOR)]
    load_factor: f64,

    /// Bucket count policy
    #[arg(long, value_enum, default_value_t = Growth::Prime)]
    growth: Growth,

    /// Log table resizes and load details
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Growth {
    Prime,
    PowerOfTwo,
}

impl From<Growth> for GrowthPolicy {
    fn from(growth: Growth) -> Self {
        match growth {
            Growth::Prime => GrowthPolicy::Prime,
            Growth::PowerOfTwo => GrowthPolicy::PowerOfTwo,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logger(args.verbose);

    let table = TableConfig::default()
        .with_initial_capacity(args.lines)
        .with_load_factor(args.load_factor)
        .with_growth(args.growth.into());
    table.validate().context("invalid table configuration")?;
    let config = BenchConfig {
        table,
        seed: args.seed,
    };

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let summary = load_games(BufReader::new(file), args.lines)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    if summary.skipped > 0 {
        warn!("{} malformed lines skipped", summary.skipped);
    }
    println!("\nList populated with {} games.", summary.records.len());

    let mut games = summary.records;
    let runs = run_benchmark(&mut games, Game::rank_cmp, &config)
        .context("benchmark aborted")?;

    for run in &runs {
        println!(
            "{} Runtime: {} seconds",
            run.order,
            run.timings.total().as_secs_f64()
        );
    }

    append_report(&args.report, args.lines, &runs)
        .with_context(|| format!("failed to update {}", args.report.display()))?;
    info!("Report updated: {}", args.report.display());
    Ok(())
}
