//! Static source registry: which feeds and pages to fetch, in what order.
//!
//! The registry is constructed once at startup and passed by reference to
//! the orchestrator; nothing mutates it during a run. Priorities rank
//! relative trust (lower = more trusted) and are stamped onto every record
//! a source produces.
//!
//! Page sources carry an ordered cascade of [`ExtractRule`] regexes. Each
//! rule must expose a `link` and `title` named capture (and optionally
//! `date`); the scraper tries them strictest-first and stops at the first
//! rule that yields a structurally valid match.

use regex::Regex;

/// A syndication feed source.
#[derive(Debug)]
pub struct FeedSource {
    pub name: &'static str,
    pub url: &'static str,
    pub priority: u8,
}

/// A page-scrape source with its extraction-pattern cascade.
#[derive(Debug)]
pub struct PageSource {
    pub name: &'static str,
    pub url: &'static str,
    pub priority: u8,
    pub rules: Vec<ExtractRule>,
}

/// One structural extraction pattern for a scraped page.
#[derive(Debug)]
pub struct ExtractRule {
    pub name: &'static str,
    pub pattern: Regex,
}

impl ExtractRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        ExtractRule {
            name,
            // Patterns are compile-time constants; a bad one is a bug.
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

/// All sources known to the pipeline, grouped by fetch tier.
#[derive(Debug)]
pub struct SourceRegistry {
    /// Primary feeds, tried first.
    pub feeds: Vec<FeedSource>,
    /// Secondary feeds, tried only when the primary tier yields nothing.
    pub alternate_feeds: Vec<FeedSource>,
    /// Page-scrape targets, the last-resort tier.
    pub pages: Vec<PageSource>,
}

/// A registry entry resolved by name for explicit-list runs.
pub enum SourceRef<'a> {
    Feed(&'a FeedSource),
    Page(&'a PageSource),
}

impl SourceRegistry {
    /// Build the fixed registry. URLs and ordering are part of the
    /// pipeline's behavior, not user configuration; CLI flags never
    /// mutate this set.
    pub fn new() -> Self {
        SourceRegistry {
            feeds: vec![
                FeedSource {
                    name: "investegate",
                    url: "https://www.investegate.co.uk/rss.aspx",
                    priority: 1,
                },
                FeedSource {
                    name: "investegate_general",
                    url: "https://www.investegate.co.uk/rss.aspx?category=General",
                    priority: 1,
                },
                FeedSource {
                    name: "investegate_results",
                    url: "https://www.investegate.co.uk/rss.aspx?category=Results",
                    priority: 1,
                },
                FeedSource {
                    name: "hl_ftse100",
                    url: "https://www.hl.co.uk/shares/stock-market-summary/ftse-100/rss",
                    priority: 2,
                },
            ],
            alternate_feeds: vec![
                FeedSource {
                    name: "yahoo_ftse",
                    url: "https://feeds.finance.yahoo.com/rss/2.0/headline?s=^FTSE&region=US&lang=en-US",
                    priority: 3,
                },
                FeedSource {
                    name: "hl_ftse100_alt",
                    url: "https://www.hl.co.uk/shares/stock-market-summary/ftse-100/rss",
                    priority: 3,
                },
                FeedSource {
                    name: "sharecast",
                    url: "https://www.sharecast.com/rss/news",
                    priority: 4,
                },
                FeedSource {
                    name: "proactive_investors",
                    url: "https://www.proactiveinvestors.co.uk/rss/news.xml",
                    priority: 4,
                },
            ],
            pages: vec![
                PageSource {
                    name: "LSE Market News",
                    url: "https://www.londonstockexchange.com/news/market-news",
                    priority: 5,
                    rules: vec![
                        ExtractRule::new(
                            "news-item anchor",
                            r#"(?is)<a[^>]*class="[^"]*news-item[^"]*"[^>]*href="(?P<link>[^"]+)"[^>]*>\s*(?P<title>[^<]+?)\s*</a>"#,
                        ),
                        ExtractRule::new(
                            "titled news link",
                            r#"(?is)<a[^>]*href="(?P<link>[^"]*news[^"]*)"[^>]*>\s*<[^>]*class="[^"]*title[^"]*"[^>]*>\s*(?P<title>[^<]+?)\s*<"#,
                        ),
                    ],
                },
                PageSource {
                    name: "Investegate Recent",
                    url: "https://www.investegate.co.uk/",
                    priority: 5,
                    rules: vec![
                        ExtractRule::new(
                            "h3 anchor",
                            r#"(?is)<h3[^>]*>\s*<a[^>]*href="(?P<link>[^"]+)"[^>]*>\s*(?P<title>[^<]+?)\s*</a>"#,
                        ),
                        ExtractRule::new(
                            "announcement row",
                            r#"(?is)<td[^>]*class="[^"]*date[^"]*"[^>]*>\s*(?P<date>[^<]+?)\s*</td>.{0,400}?<a[^>]*href="(?P<link>/Article[^"]+)"[^>]*>\s*(?P<title>[^<]+?)\s*</a>"#,
                        ),
                    ],
                },
            ],
        }
    }

    /// Resolve a source by its registry name, searching all tiers.
    pub fn find(&self, name: &str) -> Option<SourceRef<'_>> {
        self.feeds
            .iter()
            .chain(self.alternate_feeds.iter())
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(SourceRef::Feed)
            .or_else(|| {
                self.pages
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
                    .map(SourceRef::Page)
            })
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        SourceRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_shape() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.feeds.len(), 4);
        assert_eq!(registry.alternate_feeds.len(), 4);
        assert_eq!(registry.pages.len(), 2);
        for page in &registry.pages {
            assert!(!page.rules.is_empty(), "page {} has no rules", page.name);
        }
    }

    #[test]
    fn test_priorities_rank_feeds_above_scrapes() {
        let registry = SourceRegistry::new();
        let max_feed = registry
            .feeds
            .iter()
            .chain(registry.alternate_feeds.iter())
            .map(|f| f.priority)
            .max()
            .unwrap();
        let min_page = registry.pages.iter().map(|p| p.priority).min().unwrap();
        assert!(max_feed < min_page);
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let registry = SourceRegistry::new();
        assert!(matches!(registry.find("investegate"), Some(SourceRef::Feed(_))));
        assert!(matches!(registry.find("lse market news"), Some(SourceRef::Page(_))));
        assert!(registry.find("does-not-exist").is_none());
    }

    #[test]
    fn test_rules_capture_link_and_title() {
        let registry = SourceRegistry::new();
        for page in &registry.pages {
            for rule in &page.rules {
                let names: Vec<_> = rule.pattern.capture_names().flatten().collect();
                assert!(names.contains(&"link"), "{} missing link capture", rule.name);
                assert!(names.contains(&"title"), "{} missing title capture", rule.name);
            }
        }
    }

    #[test]
    fn test_lse_anchor_rule_matches_sample_markup() {
        let registry = SourceRegistry::new();
        let lse = &registry.pages[0];
        let html = r#"<a class="news-item-link" href="/news/123">Vodafone Group Final Results</a>"#;
        let caps = lse.rules[0].pattern.captures(html).expect("rule should match");
        assert_eq!(&caps["link"], "/news/123");
        assert_eq!(&caps["title"], "Vodafone Group Final Results");
    }
}
