mod categories;
mod combos;
mod load;
mod models;
mod opportunity;
mod parse;
mod pipeline;
mod process;
mod report;
mod similarity;
mod util;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use combos::DEFAULT_COMBINATION_CAP;
use pipeline::RunParams;

/// Nichescope - product niche analytics over a scraped-traffic CSV export
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Product CSV export to analyze
    #[arg(short, long, default_value = "moge_products_cleaned.csv")]
    input: PathBuf,

    /// Output directory for generated reports (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Minimum products a tag combination must cover to be kept
    #[arg(long, default_value_t = 3)]
    min_products: usize,

    /// Tags per combination (2-4 is useful; cost grows combinatorially)
    #[arg(long, default_value_t = 2)]
    combination_size: usize,

    /// Hard cap on enumerated combinations (first N generated are kept)
    #[arg(long, default_value_t = DEFAULT_COMBINATION_CAP)]
    max_combinations: usize,

    /// Largest category still counted as a niche
    #[arg(long, default_value_t = 10)]
    max_category_size: usize,

    /// Minimum average growth (%) for an opportunity niche; loosened
    /// automatically when nothing qualifies
    #[arg(long, default_value_t = 5.0)]
    min_growth: f64,

    /// Entries per top-N ranking
    #[arg(long, default_value_t = 10)]
    top_limit: usize,

    /// Neighbours listed per product in the similarity report
    #[arg(long, default_value_t = 5)]
    similar_limit: usize,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting nichescope");

    let args = Args::parse();

    // Friendlier error if missing
    if !args.input.exists() {
        return Err(anyhow::anyhow!(
            "product export not found at {}\n\
             Use --input to point at the CSV export, e.g.\n\
             nichescope --input moge_products_cleaned.csv --output-dir out\n",
            args.input.display()
        ));
    }

    pipeline::run(&RunParams {
        input: args.input,
        output_dir: args.output_dir,
        min_products: args.min_products,
        combination_size: args.combination_size,
        max_combinations: args.max_combinations,
        max_category_size: args.max_category_size,
        min_growth: args.min_growth,
        top_limit: args.top_limit,
        similar_limit: args.similar_limit,
    })
}
