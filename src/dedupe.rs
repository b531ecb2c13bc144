//! Duplicate suppression over the aggregated record set.
//!
//! The same announcement routinely appears on several sources with the
//! title lightly reworded. Two passes run in order:
//!
//! 1. exact pass: first record per distinct title string wins
//! 2. near pass: a candidate is discarded when its title's token set
//!    overlaps any already-accepted title by more than the threshold
//!
//! Both passes preserve input order (and therefore source priority order,
//! since the orchestrator fetches trusted sources first) and never mutate
//! records. The near pass is O(n²) in record count, which is fine at the
//! tens-to-low-hundreds batch sizes a run produces.

use crate::models::Announcement;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::info;

/// Keep only the first record for each distinct title, preserving order.
pub fn dedupe_exact(records: Vec<Announcement>) -> Vec<Announcement> {
    let before = records.len();
    let unique: Vec<Announcement> = records
        .into_iter()
        .unique_by(|r| r.title.clone())
        .collect();
    info!(before, after = unique.len(), "Exact-title deduplication");
    unique
}

/// Drop near-duplicate records by pairwise title similarity.
///
/// A candidate is rejected when its Jaccard similarity against any
/// already-accepted title is strictly greater than `threshold`; a pair at
/// exactly the threshold is kept.
pub fn dedupe_near(records: Vec<Announcement>, threshold: f64) -> Vec<Announcement> {
    let before = records.len();
    let mut accepted: Vec<Announcement> = Vec::with_capacity(records.len());
    let mut accepted_tokens: Vec<HashSet<String>> = Vec::with_capacity(records.len());

    for record in records {
        let tokens = title_tokens(&record.title);
        let duplicate = accepted_tokens
            .iter()
            .any(|seen| jaccard(&tokens, seen) > threshold);
        if duplicate {
            continue;
        }
        accepted_tokens.push(tokens);
        accepted.push(record);
    }

    info!(before, after = accepted.len(), threshold, "Near-duplicate suppression");
    accepted
}

/// Case-insensitive word token set of a title.
fn title_tokens(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Token-set Jaccard similarity. Two empty sets compare as 0.0, so
/// token-less titles are never treated as duplicates of each other.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
