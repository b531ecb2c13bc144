//! Text normalization for announcement titles and summaries.
//!
//! Source markup arrives with HTML entities (sometimes double-escaped),
//! embedded tags, literal `\n`/`\t` artifacts from sloppy upstream
//! serializers, and irregular whitespace. [`normalize`] flattens all of
//! that into clean single-spaced text and is idempotent, so downstream
//! stages can re-apply it without harm.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]{1,6}|[0-9]{1,7});").unwrap());

/// Normalize raw source text.
///
/// Decodes HTML entities to a fixpoint (so double-escaped input like
/// `&amp;nbsp;` fully unwinds), strips markup tags, replaces literal
/// backslash-escape artifacts with spaces, and collapses whitespace runs
/// to single spaces. Pure function; normalizing already-normalized text
/// returns it unchanged.
pub fn normalize(text: &str) -> String {
    // Entities first: a tag hidden behind `&lt;` must become markup
    // before the strip pass, or it would survive into the output.
    let mut decoded = decode_entities(text);
    loop {
        let again = decode_entities(&decoded);
        if again == decoded {
            break;
        }
        decoded = again;
    }

    let stripped = TAG.replace_all(&decoded, " ");
    let unescaped = stripped
        .replace("\\n", " ")
        .replace("\\t", " ")
        .replace("\\r", " ");
    WHITESPACE.replace_all(&unescaped, " ").trim().to_string()
}

/// Single-pass entity decode: named entities common in feed markup plus
/// decimal/hex numeric references.
fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let body = &caps[1];
        let code = if let Some(hex) = body.strip_prefix('x') {
            u32::from_str_radix(hex, 16).ok()
        } else {
            body.parse::<u32>().ok()
        };
        match code.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rsquo;", "\u{2019}")
        .replace("&ldquo;", "\u{201C}")
        .replace("&rdquo;", "\u{201D}")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&pound;", "\u{00A3}")
        .replace("&euro;", "\u{20AC}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        // Ampersand last so it cannot manufacture new entities mid-pass.
        .replace("&amp;", "&")
}
