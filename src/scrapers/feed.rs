//! Robust syndication-feed fetching.
//!
//! The registry's feeds are served by sites with a history of malformed
//! XML: stray control bytes, double-escaped entities, and declared
//! encodings that do not match the payload. Fetching therefore runs a
//! small ladder:
//!
//! 1. parse the body as received (lossy UTF-8)
//! 2. if that yields no entries, re-decode the raw bytes as `utf-8`,
//!    `iso-8859-1`, then `windows-1252`, scrubbing control characters and
//!    double-escaped ampersands before each attempt. Under the WHATWG
//!    label registry `iso-8859-1` is an alias of `windows-1252`, so the
//!    last two rungs decode identically.
//!
//! The first attempt that produces entries wins. Every failure mode
//! degrades to zero records; nothing here aborts the run.

use super::{assemble, FetchOutcome, RawItem, HTTP};
use crate::classify::ClassifierRules;
use crate::models::Announcement;
use crate::sources::FeedSource;
use encoding_rs::Encoding;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info, instrument, warn};

/// Decode labels tried, in order, when the direct parse yields nothing.
const FEED_ENCODINGS: [&str; 3] = ["utf-8", "iso-8859-1", "windows-1252"];

/// Fetch and parse one feed into announcement records.
///
/// At most `limit` entries are taken, in feed order, before entries with
/// empty titles are dropped. Records are tagged `source: "rss"` and carry
/// the feed's URL and priority.
#[instrument(level = "info", skip_all, fields(source = source.name, url = source.url))]
pub async fn fetch_feed(
    source: &FeedSource,
    limit: usize,
    rules: &ClassifierRules,
) -> FetchOutcome {
    let response = match HTTP.get(source.url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Feed request failed");
            return FetchOutcome::Unavailable;
        }
    };
    if !response.status().is_success() {
        warn!(status = %response.status(), "Feed returned non-success status");
        return FetchOutcome::Unavailable;
    }
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed reading feed body");
            return FetchOutcome::Unavailable;
        }
    };

    let mut entries = parse_feed(&String::from_utf8_lossy(&bytes)).unwrap_or_default();
    if entries.is_empty() {
        for label in FEED_ENCODINGS {
            let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
                continue;
            };
            let (text, _, had_errors) = encoding.decode(&bytes);
            if had_errors {
                debug!(encoding = label, "Decode produced errors, trying next");
                continue;
            }
            match parse_feed(&clean_xml(&text)) {
                Ok(parsed) if !parsed.is_empty() => {
                    info!(encoding = label, count = parsed.len(), "Recovered entries after cleanup");
                    entries = parsed;
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!(encoding = label, error = %e, "Parse failed under this encoding");
                    continue;
                }
            }
        }
    }

    if entries.is_empty() {
        info!("No entries found in feed");
        return FetchOutcome::Fetched(Vec::new());
    }

    entries.truncate(limit);
    let records: Vec<Announcement> = entries
        .into_iter()
        .filter_map(|raw| assemble(raw, rules, "rss", source.url, source.priority))
        .collect();
    info!(count = records.len(), "Parsed feed entries");
    FetchOutcome::Fetched(records)
}

/// Scrub raw feed text before a re-parse attempt.
///
/// Drops NULs and C0/DEL control characters (keeping tab/newline/CR) and
/// collapses the double-escaped `&amp;amp;` artifact some upstream
/// serializers emit.
pub(crate) fn clean_xml(content: &str) -> String {
    let without_controls: String = content
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || (c != '\u{7F}' && c >= '\u{20}'))
        .collect();
    without_controls.replace("&amp;amp;", "&amp;")
}

/// Parse RSS `<item>` or Atom `<entry>` elements into raw items.
///
/// Tag matching is on local names, so namespaced fields like
/// `dc:creator` resolve naturally. Channel-level elements outside an
/// item are ignored.
///
/// Element text arrives as a sequence of `Text`, `CData`, and
/// `GeneralRef` events; fragments are appended into the current field so
/// entity-bearing content like `Marks &amp; Spencer` survives intact.
/// Field edges are trimmed once, when the item closes.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<RawItem>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    let mut current_tag = Vec::new();
    // Atom `updated` accumulates separately; it only becomes the
    // published date when the entry closes without one.
    let mut updated = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if matches!(local.as_slice(), b"item" | b"entry") {
                    current = Some(RawItem::default());
                    updated.clear();
                }
                current_tag = local;
            }
            // Atom links are self-closing with an href attribute.
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(item) = current.as_mut() {
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"href" {
                                if let Ok(value) = attr.unescape_value() {
                                    item.link = value.trim().to_string();
                                }
                            }
                        }
                    }
                }
                current_tag.clear();
            }
            Event::Text(e) => {
                if let Some(item) = current.as_mut() {
                    let text = e.decode().unwrap_or_default();
                    append_field(item, &current_tag, &text, &mut updated);
                }
            }
            Event::CData(e) => {
                if let Some(item) = current.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    append_field(item, &current_tag, &text, &mut updated);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(item) = current.as_mut() {
                    let text = resolve_reference(&e);
                    append_field(item, &current_tag, &text, &mut updated);
                }
            }
            Event::End(e) => {
                if matches!(e.local_name().as_ref(), b"item" | b"entry") {
                    if let Some(mut item) = current.take() {
                        finish_item(&mut item, &updated);
                        items.push(item);
                    }
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Resolve a general entity reference to its replacement text.
///
/// Character references and the five predefined XML entities resolve
/// directly; anything else (HTML leftovers like `&nbsp;`) is rebuilt
/// verbatim so the normalizer can decode it later.
fn resolve_reference(reference: &quick_xml::events::BytesRef<'_>) -> String {
    if let Ok(Some(c)) = reference.resolve_char_ref() {
        return c.to_string();
    }
    let name = reference.decode().unwrap_or_default();
    match name.as_ref() {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        other => format!("&{};", other),
    }
}

/// Append a content fragment onto the current element's field.
fn append_field(item: &mut RawItem, tag: &[u8], text: &str, updated: &mut String) {
    if text.is_empty() {
        return;
    }
    let field = match tag {
        b"title" => &mut item.title,
        b"link" => &mut item.link,
        b"pubDate" | b"published" => &mut item.published,
        b"updated" => updated,
        b"description" | b"summary" => &mut item.summary,
        b"category" => &mut item.category,
        b"author" | b"creator" => &mut item.author,
        b"guid" | b"id" => &mut item.guid,
        _ => return,
    };
    field.push_str(text);
}

/// Trim accumulated field edges and apply the `updated` date fallback.
fn finish_item(item: &mut RawItem, updated: &str) {
    item.title = item.title.trim().to_string();
    item.link = item.link.trim().to_string();
    item.published = item.published.trim().to_string();
    item.summary = item.summary.trim().to_string();
    item.category = item.category.trim().to_string();
    item.author = item.author.trim().to_string();
    item.guid = item.guid.trim().to_string();
    if item.published.is_empty() {
        item.published = updated.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0"><channel>
  <title>Investegate Announcements</title>
  <item>
    <title>Acme Corp (ACM) Final Results</title>
    <link>https://example.com/acme-results</link>
    <pubDate>Mon, 03 Feb 2025 07:00:00 GMT</pubDate>
    <description>Audited results for the year ended 31 December.</description>
    <category>Results</category>
    <guid>https://example.com/acme-results</guid>
  </item>
  <item>
    <title>Widget PLC (WDG) Interim Dividend</title>
    <link>https://example.com/widget-dividend</link>
    <pubDate>Mon, 03 Feb 2025 07:05:00 GMT</pubDate>
    <description>Dividend of 2.1p per share.</description>
  </item>
  <item>
    <title></title>
    <link>https://example.com/untitled</link>
  </item>
  <item>
    <title>Board Change</title>
    <link>https://example.com/board</link>
  </item>
</channel></rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Market News</title>
  <entry>
    <title>Trading Update</title>
    <link href="https://example.com/atom-entry"/>
    <updated>2025-02-03T07:00:00Z</updated>
    <summary>Revenue in line with expectations.</summary>
    <id>urn:uuid:1</id>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let items = parse_feed(RSS_SAMPLE).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].title, "Acme Corp (ACM) Final Results");
        assert_eq!(items[0].link, "https://example.com/acme-results");
        assert_eq!(items[0].published, "Mon, 03 Feb 2025 07:00:00 GMT");
        assert_eq!(items[0].category, "Results");
        assert_eq!(items[0].guid, "https://example.com/acme-results");
        assert!(items[2].title.is_empty());
    }

    #[test]
    fn test_parse_atom_entries() {
        let items = parse_feed(ATOM_SAMPLE).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Trading Update");
        assert_eq!(items[0].link, "https://example.com/atom-entry");
        assert_eq!(items[0].published, "2025-02-03T07:00:00Z");
        assert_eq!(items[0].guid, "urn:uuid:1");
    }

    #[test]
    fn test_entity_bearing_title_survives_intact() {
        // An escaped ampersand splits the title into separate text and
        // reference events; the fragments must reassemble in order.
        let xml = r#"<rss><channel><item>
            <title>Marks &amp; Spencer Final Results</title>
            <link>https://example.com/mks?a=1&amp;b=2</link>
        </item></channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Marks & Spencer Final Results");
        assert_eq!(items[0].link, "https://example.com/mks?a=1&b=2");
    }

    #[test]
    fn test_char_refs_and_html_entities_in_titles() {
        let xml = r#"<rss><channel><item>
            <title>Caf&#233; Group &#x2013; H1 &nbsp;Update</title>
        </item></channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        // Numeric references resolve; unknown named entities pass
        // through verbatim for the normalizer.
        assert_eq!(items[0].title, "Caf\u{e9} Group \u{2013} H1 &nbsp;Update");
    }

    #[test]
    fn test_channel_title_is_not_an_item() {
        let items = parse_feed(RSS_SAMPLE).unwrap();
        assert!(items.iter().all(|i| i.title != "Investegate Announcements"));
    }

    #[test]
    fn test_empty_title_entries_dropped_at_assembly() {
        let rules = ClassifierRules::default();
        let records: Vec<_> = parse_feed(RSS_SAMPLE)
            .unwrap()
            .into_iter()
            .filter_map(|raw| assemble(raw, &rules, "rss", "https://example.com/rss", 1))
            .collect();
        // Three of the four items have non-empty titles.
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.title.is_empty()));
        assert!(records.iter().all(|r| r.source == "rss"));
    }

    #[test]
    fn test_clean_xml_strips_controls_and_double_escapes() {
        let dirty = "a\u{0}b\u{8}c\tkeeps\ntabs&amp;amp;ok";
        assert_eq!(clean_xml(dirty), "abc\tkeeps\ntabs&amp;ok");
    }

    #[test]
    fn test_windows_1252_bytes_recoverable_after_cleanup() {
        // 0x92 is a Windows-1252 right single quote; invalid as UTF-8.
        let mut bytes = b"<rss><channel><item><title>Lloyd".to_vec();
        bytes.push(0x92);
        bytes.extend_from_slice(b"s Banking</title></item></channel></rss>");
        assert!(std::str::from_utf8(&bytes).is_err());

        let encoding = Encoding::for_label(b"windows-1252").unwrap();
        let (text, _, had_errors) = encoding.decode(&bytes);
        assert!(!had_errors);
        let items = parse_feed(&clean_xml(&text)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Lloyd\u{2019}s Banking");
    }

    #[test]
    fn test_malformed_xml_is_an_error_not_a_panic() {
        assert!(parse_feed("<rss><channel><item><title>broken").is_err() ||
            parse_feed("<rss><channel><item><title>broken").unwrap().is_empty());
    }
}
