//! Source fetchers for feeds and scraped pages.
//!
//! Two fetch strategies live here, sharing one HTTP client and one record
//! assembly path:
//!
//! | Strategy | Module | Method |
//! |----------|--------|--------|
//! | Syndication feeds | [`feed`] | quick-xml parse with multi-encoding retry |
//! | Page scraping | [`page`] | regex pattern cascade with loose anchor fallback |
//!
//! Both degrade to [`FetchOutcome::Unavailable`] on network or total-parse
//! failure instead of propagating errors; a failed source contributes zero
//! records and the run continues.

pub mod feed;
pub mod page;

use crate::classify::ClassifierRules;
use crate::extract::extract_company;
use crate::models::Announcement;
use crate::normalize::normalize;
use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use std::time::Duration;
use url::Url;

/// Per-request timeout for every retrieval.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client with browser-like headers.
///
/// Remote hosts trivially block default library user agents, so every
/// request goes out with a desktop browser identity and feed-friendly
/// Accept headers.
pub static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/rss+xml, application/xml, text/xml, text/html, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Result of one source attempt.
///
/// Distinguishes a transient retrieval failure from a successful call
/// that simply matched nothing, so the orchestrator can log them apart.
/// Neither case aborts the run.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The source responded and was parsed; the vec may be empty.
    Fetched(Vec<Announcement>),
    /// Network, HTTP, or total-decode failure. Contributes zero records.
    Unavailable,
}

impl FetchOutcome {
    /// Collapse into the records this attempt contributed.
    pub fn into_records(self) -> Vec<Announcement> {
        match self {
            FetchOutcome::Fetched(records) => records,
            FetchOutcome::Unavailable => Vec::new(),
        }
    }
}

/// One raw item as pulled from a feed entry or page match, before
/// normalization and enrichment.
#[derive(Debug, Default)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    pub category: String,
    pub author: String,
    pub guid: String,
}

/// Assemble a full [`Announcement`] from a raw item.
///
/// Normalizes text fields, resolves a relative link against the source
/// origin, runs entity extraction and classification, and stamps the
/// extraction time. Returns `None` when the title is empty after
/// normalization; such items carry no usable identity.
pub fn assemble(
    raw: RawItem,
    rules: &ClassifierRules,
    source: &str,
    source_url: &str,
    priority: u8,
) -> Option<Announcement> {
    let title = normalize(&raw.title);
    if title.is_empty() {
        return None;
    }

    let summary = normalize(&raw.summary);
    let link = resolve_link(&raw.link, source_url);
    let guid = if raw.guid.trim().is_empty() {
        link.clone()
    } else {
        raw.guid.trim().to_string()
    };
    let (company_name, ticker) = extract_company(&title);
    let rns_type = rules.classify(&title, &summary);

    Some(Announcement {
        title,
        link,
        published: raw.published.trim().to_string(),
        summary,
        category: normalize(&raw.category),
        author: normalize(&raw.author),
        guid,
        source: source.to_string(),
        source_url: source_url.to_string(),
        source_priority: priority,
        ticker,
        company_name,
        rns_type,
        scraped_at: Utc::now().to_rfc3339(),
    })
}

/// Resolve a possibly relative link against the source URL's origin.
///
/// Unresolvable links come back empty rather than relative; the record
/// invariant is "empty or absolute", never in between.
fn resolve_link(link: &str, source_url: &str) -> String {
    let link = link.trim();
    if link.is_empty() {
        return String::new();
    }
    if let Ok(absolute) = Url::parse(link) {
        return absolute.to_string();
    }
    // Join against the origin, not the full source URL, so a
    // path-relative href like `news/123` from a source page at
    // `https://host/news/market-news` resolves to `/news/123` rather
    // than `/news/news/123`.
    let resolved = Url::parse(source_url)
        .map(|base| base.origin().ascii_serialization())
        .and_then(|origin| Url::parse(&origin))
        .and_then(|origin| origin.join(link));
    match resolved {
        Ok(resolved) => resolved.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RnsType;

    fn raw(title: &str, link: &str) -> RawItem {
        RawItem {
            title: title.to_string(),
            link: link.to_string(),
            ..RawItem::default()
        }
    }

    #[test]
    fn test_assemble_enriches_record() {
        let rules = ClassifierRules::default();
        let record = assemble(
            raw("Acme Corp (ACM) Final Results", "/Article/123"),
            &rules,
            "rss",
            "https://www.investegate.co.uk/rss.aspx",
            1,
        )
        .expect("valid item");
        assert_eq!(record.ticker, "ACM");
        assert_eq!(record.company_name, "Acme Corp");
        assert_eq!(record.rns_type, RnsType::Results);
        assert_eq!(record.link, "https://www.investegate.co.uk/Article/123");
        assert_eq!(record.guid, record.link);
        assert!(!record.scraped_at.is_empty());
    }

    #[test]
    fn test_assemble_rejects_empty_title() {
        let rules = ClassifierRules::default();
        assert!(assemble(raw("", "https://x.test/a"), &rules, "rss", "https://x.test", 1).is_none());
        assert!(assemble(raw("<p></p>", "x"), &rules, "rss", "https://x.test", 1).is_none());
    }

    #[test]
    fn test_assemble_keeps_absolute_link() {
        let rules = ClassifierRules::default();
        let record = assemble(
            raw("Trading Update", "https://other.example/news/1"),
            &rules,
            "web_scraping",
            "https://www.londonstockexchange.com/news/market-news",
            5,
        )
        .unwrap();
        assert_eq!(record.link, "https://other.example/news/1");
    }

    #[test]
    fn test_path_relative_link_resolves_from_origin() {
        assert_eq!(
            resolve_link("news/123", "https://www.londonstockexchange.com/news/market-news"),
            "https://www.londonstockexchange.com/news/123",
        );
        assert_eq!(
            resolve_link("/Article/456", "https://www.investegate.co.uk/rss.aspx"),
            "https://www.investegate.co.uk/Article/456",
        );
        assert_eq!(resolve_link("news/123", "not a url"), "");
    }

    #[test]
    fn test_assemble_normalizes_title_markup() {
        let rules = ClassifierRules::default();
        let record = assemble(
            raw("  Interim &amp; Final   <b>Dividend</b> ", ""),
            &rules,
            "rss",
            "https://x.test",
            2,
        )
        .unwrap();
        assert_eq!(record.title, "Interim & Final Dividend");
        assert_eq!(record.rns_type, RnsType::Dividend);
        assert!(record.link.is_empty());
        assert!(record.guid.is_empty());
    }

    #[test]
    fn test_fetch_outcome_into_records() {
        assert!(FetchOutcome::Unavailable.into_records().is_empty());
        let rules = ClassifierRules::default();
        let rec = assemble(raw("Trading Update", ""), &rules, "rss", "https://x.test", 1).unwrap();
        assert_eq!(FetchOutcome::Fetched(vec![rec]).into_records().len(), 1);
    }
}
