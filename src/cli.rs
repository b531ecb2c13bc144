//! Command-line interface definitions for the RNS harvester.
//!
//! Flags select how much to fetch and where to write it; the source
//! registry itself is fixed and cannot be mutated from the command line.

use crate::orchestrator::FetchMethod;
use clap::Parser;

/// Command-line arguments for a harvest run.
///
/// # Examples
///
/// ```sh
/// # Default tiered run: feeds, then alternates, then scraping
/// rns_harvester
///
/// # Feeds only, 50 items per source, custom output directory
/// rns_harvester --method rss --limit 50 --out-dir ./data/rns
///
/// # Exactly the named sources, run as the "working" variant
/// rns_harvester --sources investegate,sharecast
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Fetch strategy to drive
    #[arg(long, value_enum, default_value_t = FetchMethod::All)]
    pub method: FetchMethod,

    /// Explicit comma-separated source names; overrides --method
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Maximum number of items to take from each source
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,

    /// Output directory for JSONL run files
    #[arg(short, long, default_value = "data/raw/rns")]
    pub out_dir: String,

    /// Near-duplicate Jaccard threshold; strictly greater rejects
    #[arg(long, default_value_t = 0.8)]
    pub similarity_threshold: f64,
}
