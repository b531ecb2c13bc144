//! Data models for RNS announcements and run-level aggregates.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`Announcement`]: a single normalized regulatory news record
//! - [`RnsType`]: the fixed set of coarse announcement categories
//! - [`RunMetadata`]: aggregate statistics computed once at persistence time
//!
//! Records are immutable once assembled: downstream stages (deduplication,
//! persistence) only filter and serialize them, never mutate fields.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single regulatory news announcement, normalized and enriched.
///
/// Every record carries a non-empty `title` and `source`; `link`, when
/// non-empty, is an absolute URL. `ticker` and `company_name` are empty
/// strings when extraction found nothing; that is a normal outcome, not an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Announcement {
    /// Announcement headline after normalization. Never empty.
    pub title: String,
    /// Absolute URL of the announcement, or empty if the source gave none.
    pub link: String,
    /// Publication timestamp as the source reported it. Format not guaranteed.
    pub published: String,
    /// Normalized summary text, possibly empty.
    pub summary: String,
    /// Source-provided category label, possibly empty.
    pub category: String,
    /// Source-provided author, or the source label for scraped pages.
    pub author: String,
    /// Feed GUID, usually the link.
    pub guid: String,
    /// Fetch-strategy tag, e.g. "rss" or "web_scraping". Never empty.
    pub source: String,
    /// URL of the feed or page that produced this record.
    pub source_url: String,
    /// Trust ranking of the producing source. Lower is more trusted.
    pub source_priority: u8,
    /// Extracted ticker symbol, possibly empty.
    pub ticker: String,
    /// Extracted company name, possibly empty.
    pub company_name: String,
    /// Coarse announcement category assigned by the classifier.
    pub rns_type: RnsType,
    /// RFC 3339 UTC timestamp of when this record was extracted.
    pub scraped_at: String,
}

/// The fixed set of coarse announcement categories.
///
/// The classifier always returns one of these values, defaulting to
/// [`RnsType::Other`] when no keyword set matches. The declaration order
/// mirrors the classifier's priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RnsType {
    Results,
    TradingUpdate,
    Acquisition,
    Disposal,
    Dividend,
    Appointment,
    Fundraising,
    Contract,
    Regulatory,
    Other,
}

impl RnsType {
    /// Snake-case label matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RnsType::Results => "results",
            RnsType::TradingUpdate => "trading_update",
            RnsType::Acquisition => "acquisition",
            RnsType::Disposal => "disposal",
            RnsType::Dividend => "dividend",
            RnsType::Appointment => "appointment",
            RnsType::Fundraising => "fundraising",
            RnsType::Contract => "contract",
            RnsType::Regulatory => "regulatory",
            RnsType::Other => "other",
        }
    }
}

impl fmt::Display for RnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate statistics over one run's final record set.
///
/// Serialized as the `{"_metadata": ...}` first line of each output file.
/// Computed exactly once, at persistence time.
#[derive(Debug, Deserialize, Serialize)]
pub struct RunMetadata {
    /// Total records written.
    pub total: usize,
    /// Record count per fetch-strategy tag.
    pub by_source: BTreeMap<String, usize>,
    /// Record count per announcement category.
    pub by_type: BTreeMap<String, usize>,
    /// Records with a resolved company name.
    pub with_company: usize,
    /// Records with a resolved ticker.
    pub with_ticker: usize,
    /// Distinct company names among resolved records.
    pub unique_companies: usize,
    /// Distinct tickers among resolved records.
    pub unique_tickers: usize,
}

impl RunMetadata {
    /// Compute aggregates over the final record set.
    pub fn compute(records: &[Announcement]) -> Self {
        let mut by_source: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut companies: BTreeSet<&str> = BTreeSet::new();
        let mut tickers: BTreeSet<&str> = BTreeSet::new();
        let mut with_company = 0;
        let mut with_ticker = 0;

        for record in records {
            *by_source.entry(record.source.clone()).or_insert(0) += 1;
            *by_type
                .entry(record.rns_type.as_str().to_string())
                .or_insert(0) += 1;
            if !record.company_name.is_empty() {
                with_company += 1;
                companies.insert(record.company_name.as_str());
            }
            if !record.ticker.is_empty() {
                with_ticker += 1;
                tickers.insert(record.ticker.as_str());
            }
        }

        RunMetadata {
            total: records.len(),
            by_source,
            by_type,
            with_company,
            with_ticker,
            unique_companies: companies.len(),
            unique_tickers: tickers.len(),
        }
    }
}
