//! Pattern-cascade page scraping for sources without a usable feed.
//!
//! Each page source carries an ordered list of extraction regexes (see
//! [`crate::sources::ExtractRule`]). The raw markup is matched against
//! each rule in turn; the first rule producing at least one structurally
//! valid match decides the result set and later rules are never tried.
//! When the whole cascade misses, a loose fallback walks every anchor on
//! the page and keeps the ones whose text reads like an announcement.
//!
//! This is deliberately not a structural HTML parse: the target markup is
//! inconsistent enough that loose textual patterns outlast any selector
//! schema. The DOM is only consulted for the anchor-scan fallback.

use super::{assemble, FetchOutcome, RawItem, HTTP};
use crate::classify::ClassifierRules;
use crate::models::Announcement;
use crate::normalize::normalize;
use crate::sources::PageSource;
use chrono::Utc;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Titles shorter than this are treated as navigation chrome, not news.
const MIN_TITLE_LEN: usize = 12;

/// Generic link texts that structurally match but carry no headline.
const FILLER_TITLES: [&str; 5] = ["read more", "more", "click here", "learn more", "view all"];

/// Words that mark an anchor as announcement-like in the loose fallback.
const INDICATOR_KEYWORDS: [&str; 10] = [
    "results",
    "dividend",
    "acquisition",
    "trading",
    "placing",
    "appointment",
    "disposal",
    "agm",
    "contract",
    "rns",
];

/// Scrape one page source into announcement records.
///
/// Records are tagged `source: "web_scraping"`, authored with the page's
/// display name, and stamped with the fetch time as `published` when the
/// matched pattern captured no date.
#[instrument(level = "info", skip_all, fields(source = source.name, url = source.url))]
pub async fn scrape_page(
    source: &PageSource,
    limit: usize,
    rules: &ClassifierRules,
) -> FetchOutcome {
    let response = match HTTP.get(source.url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Page request failed");
            return FetchOutcome::Unavailable;
        }
    };
    if !response.status().is_success() {
        warn!(status = %response.status(), "Page returned non-success status");
        return FetchOutcome::Unavailable;
    }
    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Failed reading page body");
            return FetchOutcome::Unavailable;
        }
    };

    let mut matches = cascade(source, &html);
    if matches.is_empty() {
        debug!("Every extraction rule missed, using loose anchor scan");
        matches = loose_scan(&html);
    }

    matches.truncate(limit);
    let fetched_at = Utc::now().to_rfc3339();
    let records: Vec<Announcement> = matches
        .into_iter()
        .filter_map(|m| {
            let raw = RawItem {
                title: m.title,
                link: m.link,
                published: m.date.unwrap_or_else(|| fetched_at.clone()),
                author: source.name.to_string(),
                ..RawItem::default()
            };
            assemble(raw, rules, "web_scraping", source.url, source.priority)
        })
        .collect();
    info!(count = records.len(), "Scraped page items");
    FetchOutcome::Fetched(records)
}

/// One `(link, title[, date])` tuple pulled from the markup.
#[derive(Debug)]
pub(crate) struct PageMatch {
    pub link: String,
    pub title: String,
    pub date: Option<String>,
}

/// Run the rule cascade: first rule with at least one valid match wins.
pub(crate) fn cascade(source: &PageSource, html: &str) -> Vec<PageMatch> {
    for rule in &source.rules {
        let matches: Vec<PageMatch> = rule
            .pattern
            .captures_iter(html)
            .filter_map(|caps| {
                let title = normalize(caps.name("title")?.as_str());
                if !valid_title(&title) {
                    return None;
                }
                Some(PageMatch {
                    link: caps.name("link")?.as_str().trim().to_string(),
                    title,
                    date: caps.name("date").map(|d| normalize(d.as_str())),
                })
            })
            .collect();
        if !matches.is_empty() {
            debug!(rule = rule.name, count = matches.len(), "Extraction rule matched");
            return matches;
        }
        debug!(rule = rule.name, "Extraction rule yielded nothing");
    }
    Vec::new()
}

/// Last-resort scan: keep every anchor whose text contains an
/// announcement-indicator keyword and clears the length floor.
pub(crate) fn loose_scan(html: &str) -> Vec<PageMatch> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    document
        .select(&anchors)
        .filter_map(|element| {
            let title = normalize(&element.text().collect::<Vec<_>>().join(" "));
            if !valid_title(&title) {
                return None;
            }
            let lowered = title.to_lowercase();
            if !INDICATOR_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
                return None;
            }
            Some(PageMatch {
                link: element.value().attr("href")?.trim().to_string(),
                title,
                date: None,
            })
        })
        .collect()
}

/// Structural validity gate shared by the cascade and the loose scan.
fn valid_title(title: &str) -> bool {
    title.len() >= MIN_TITLE_LEN && !FILLER_TITLES.contains(&title.to_lowercase().as_str())
}
