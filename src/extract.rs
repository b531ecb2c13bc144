//! Company name and ticker extraction from announcement titles.
//!
//! RNS headlines carry issuer identity in a handful of loose textual
//! conventions rather than any structured field. Three patterns are tried
//! in order, strictest first, and the first match wins:
//!
//! 1. `Acme Corp (ACM)`: name followed by a parenthesized 2-5 letter
//!    ticker, optionally with an exchange suffix like `(ACM.L)`
//! 2. a bare `(ACM)` anywhere, with the preceding text taken as the name
//! 3. `ACM: rest of headline` at the start of the title
//!
//! No match is a normal outcome and returns two empty strings.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_TICKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^()]+?)\s*\((?P<ticker>[A-Z]{2,5})(?:\.[A-Z]{1,4})?\)").unwrap()
});
static BARE_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?P<ticker>[A-Z]{2,5})(?:\.[A-Z]{1,4})?\)").unwrap());
static LEADING_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<ticker>[A-Z]{2,5}):\s*(?P<rest>.+)$").unwrap());

/// Extract `(company_name, ticker)` from a normalized title.
///
/// Either or both strings may be empty; progressively looser patterns
/// trade precision for recall, so the first structural match is taken as
/// the least ambiguous reading.
pub fn extract_company(title: &str) -> (String, String) {
    if let Some(caps) = NAME_TICKER.captures(title) {
        let name = trim_name(&caps["name"]);
        if !name.is_empty() {
            return (name, caps["ticker"].to_string());
        }
    }

    if let Some(caps) = BARE_TICKER.captures(title) {
        let ticker = caps["ticker"].to_string();
        // Best effort: whatever precedes the parenthesis is the name.
        let prefix = &title[..caps.get(0).map(|m| m.start()).unwrap_or(0)];
        return (trim_name(prefix), ticker);
    }

    if let Some(caps) = LEADING_TICKER.captures(title) {
        let rest = &caps["rest"];
        let name = rest
            .split(&[':', ','][..])
            .next()
            .unwrap_or(rest)
            .trim()
            .to_string();
        return (name, caps["ticker"].to_string());
    }

    (String::new(), String::new())
}

/// Trim separators and dangling punctuation left over from pattern slicing.
fn trim_name(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(&['-', '–', ':', ',', '|'][..])
        .trim()
        .to_string()
}
