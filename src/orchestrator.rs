//! Source orchestration: which sources to try, in what order.
//!
//! Two strategies exist. The tiered strategy walks primary feeds, then
//! alternate feeds, then page scraping, escalating to the next tier only
//! while the aggregate is still empty. The explicit strategy runs exactly
//! the sources named on the command line, regardless of earlier success.
//!
//! Execution is strictly sequential with a courtesy pause between source
//! attempts. Every record from every attempted source lands in one
//! combined list; an all-empty outcome is reportable, not an error.

use crate::classify::ClassifierRules;
use crate::models::Announcement;
use crate::scrapers::{feed, page, FetchOutcome};
use crate::sources::{SourceRef, SourceRegistry};
use clap::ValueEnum;
use std::time::Duration;
use tracing::{info, warn};

/// Pause after each feed attempt.
const FEED_PAUSE: Duration = Duration::from_secs(1);
/// Pause after each scrape attempt; pages are heavier on the remote end.
const SCRAPE_PAUSE: Duration = Duration::from_secs(2);

/// Fetch strategy selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchMethod {
    /// Primary feeds only.
    Rss,
    /// Alternate feeds only.
    Alternative,
    /// Page scraping only.
    Scraping,
    /// Feeds, then alternates, then scraping, escalating while empty.
    All,
}

impl FetchMethod {
    /// Label used in the output filename.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Rss => "rss",
            FetchMethod::Alternative => "alternative",
            FetchMethod::Scraping => "scraping",
            FetchMethod::All => "all",
        }
    }
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the tiered strategy and return the combined record list.
pub async fn run(
    registry: &SourceRegistry,
    method: FetchMethod,
    limit: usize,
    rules: &ClassifierRules,
) -> Vec<Announcement> {
    let mut all_records: Vec<Announcement> = Vec::new();

    if matches!(method, FetchMethod::Rss | FetchMethod::All) {
        info!("Trying primary feeds");
        for source in &registry.feeds {
            collect(&mut all_records, feed::fetch_feed(source, limit, rules).await, source.name);
            tokio::time::sleep(FEED_PAUSE).await;
        }
    }

    if matches!(method, FetchMethod::Alternative | FetchMethod::All) && all_records.is_empty() {
        info!("Trying alternate feeds");
        for source in &registry.alternate_feeds {
            collect(&mut all_records, feed::fetch_feed(source, limit, rules).await, source.name);
            tokio::time::sleep(FEED_PAUSE).await;
        }
    }

    if matches!(method, FetchMethod::Scraping | FetchMethod::All) && all_records.is_empty() {
        info!("Trying page scraping");
        for source in &registry.pages {
            collect(&mut all_records, page::scrape_page(source, limit, rules).await, source.name);
            tokio::time::sleep(SCRAPE_PAUSE).await;
        }
    }

    info!(total = all_records.len(), "Source orchestration complete");
    all_records
}

/// Run exactly the named sources, in the order given.
///
/// Unknown names are logged and skipped; every resolvable source is
/// attempted whether or not earlier ones produced records.
pub async fn run_sources(
    registry: &SourceRegistry,
    names: &[String],
    limit: usize,
    rules: &ClassifierRules,
) -> Vec<Announcement> {
    let mut all_records: Vec<Announcement> = Vec::new();

    for name in names {
        match registry.find(name) {
            Some(SourceRef::Feed(source)) => {
                collect(&mut all_records, feed::fetch_feed(source, limit, rules).await, source.name);
                tokio::time::sleep(FEED_PAUSE).await;
            }
            Some(SourceRef::Page(source)) => {
                collect(&mut all_records, page::scrape_page(source, limit, rules).await, source.name);
                tokio::time::sleep(SCRAPE_PAUSE).await;
            }
            None => warn!(source = %name, "Unknown source name, skipping"),
        }
    }

    info!(total = all_records.len(), "Explicit source run complete");
    all_records
}

/// Fold one source attempt into the accumulator, logging the outcome kind.
fn collect(all_records: &mut Vec<Announcement>, outcome: FetchOutcome, source_name: &str) {
    match outcome {
        FetchOutcome::Fetched(records) => {
            info!(source = source_name, count = records.len(), "Source contributed records");
            all_records.extend(records);
        }
        FetchOutcome::Unavailable => {
            warn!(source = source_name, "Source unavailable, continuing");
        }
    }
}
