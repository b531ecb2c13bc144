//! # RNS Harvester
//!
//! A batch pipeline that collects Regulatory News Service (RNS)
//! announcements from multiple unreliable web sources and writes a
//! deduplicated, enriched JSONL record set.
//!
//! ## Features
//!
//! - Cascading fetch strategy: primary feeds, then alternate feeds, then
//!   pattern-based page scraping, escalating only while nothing was found
//! - Robust feed parsing with a multi-encoding retry ladder for malformed
//!   upstream XML
//! - Per-site extraction-pattern cascades with a loose anchor-scan
//!   fallback for pages without a usable feed
//! - Title normalization, company/ticker extraction, and coarse
//!   announcement classification on every record
//! - Exact and near-duplicate (token-set Jaccard) suppression
//!
//! ## Usage
//!
//! ```sh
//! rns_harvester --method all --limit 20 --out-dir data/raw/rns
//! ```
//!
//! ## Architecture
//!
//! One run flows one direction:
//! 1. **Orchestration**: attempt sources sequentially per the strategy
//! 2. **Extraction**: normalize, classify, and entity-extract each item
//! 3. **Deduplication**: exact-title pass, then near-duplicate pass
//! 4. **Output**: one timestamped JSONL file, run metadata first

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod classify;
mod cli;
mod dedupe;
mod extract;
mod models;
mod normalize;
mod orchestrator;
mod outputs;
mod scrapers;
mod sources;
mod utils;

use classify::ClassifierRules;
use cli::Cli;
use sources::SourceRegistry;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("rns_harvester starting up");

    let args = Cli::parse();
    debug!(?args.method, ?args.sources, args.limit, %args.out_dir, "Parsed CLI arguments");

    // Early check: fail fast on an unwritable output directory.
    if let Err(e) = ensure_writable_dir(&args.out_dir).await {
        error!(
            path = %args.out_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // The registry and classifier rules are built once and never mutated.
    let registry = SourceRegistry::new();
    let rules = ClassifierRules::default();

    // ---- Fetch ----
    let (all_records, method_label) = if !args.sources.is_empty() {
        info!(sources = ?args.sources, "Running explicit source list");
        let records = orchestrator::run_sources(&registry, &args.sources, args.limit, &rules).await;
        (records, "working")
    } else {
        info!(method = args.method.as_str(), "Running tiered fetch strategy");
        let records = orchestrator::run(&registry, args.method, args.limit, &rules).await;
        (records, args.method.as_str())
    };

    if all_records.is_empty() {
        warn!("No data could be retrieved from any source");
        warn!("Suggestions: check your internet connection; try again later (servers may be temporarily down); try --method scraping for basic web scraping");
        info!(elapsed = ?start_time.elapsed(), "Run complete with no output file");
        return Ok(());
    }

    // ---- Deduplicate ----
    let unique = dedupe::dedupe_exact(all_records);
    let unique = dedupe::dedupe_near(unique, args.similarity_threshold);

    if unique.is_empty() {
        warn!("No unique records survived deduplication");
        return Ok(());
    }

    // ---- Persist ----
    let out_path =
        outputs::jsonl::write_records(&unique, Path::new(&args.out_dir), method_label).await?;
    info!(
        count = unique.len(),
        path = %out_path.display(),
        "Saved unique announcements"
    );

    // Sample for operator eyeballing.
    for (i, record) in unique.iter().take(3).enumerate() {
        info!(
            sample = i + 1,
            rns_type = record.rns_type.as_str(),
            title = %truncate_for_log(&record.title, 80),
            "Sample item"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
