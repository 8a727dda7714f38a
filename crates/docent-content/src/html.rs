//! HTML helpers shared by the parsers and the search index.

use std::sync::LazyLock;

use docent_core::types::{Asset, AssetKind};
use regex::Regex;

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("Invalid script/style regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"));

static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("Invalid img regex"));

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("Invalid anchor regex"));

/// Escape text for an element body.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Reduce markup to whitespace-normalized plain text.
///
/// Script and style bodies are dropped, tags become word breaks, and
/// entities are decoded.
///
/// ```
/// use docent_content::html::strip_html;
///
/// assert_eq!(strip_html("<h1>Hi</h1><p>a &amp; b</p>"), "Hi a & b");
/// ```
pub fn strip_html(html: &str) -> String {
    let without_code = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_code, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Value of `name` in a start tag such as `<img src="x" alt='y'>`.
///
/// Returns `None` when the attribute is absent; an unquoted value runs to
/// the next whitespace or `>`.
pub fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let lower = tag.to_ascii_lowercase();
    let needle = name.to_ascii_lowercase();
    let bytes = tag.as_bytes();
    let mut from = 0;

    while let Some(rel) = lower[from..].find(&needle) {
        let start = from + rel;
        from = start + needle.len();

        let preceded_by_space = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !preceded_by_space {
            continue;
        }
        let rest = tag[from..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        return match rest.chars().next() {
            Some(q @ ('"' | '\'')) => rest[1..].find(q).map(|end| &rest[1..1 + end]),
            Some(_) => Some(
                rest.split(|c: char| c.is_whitespace() || c == '>')
                    .next()
                    .unwrap_or(""),
            ),
            None => None,
        };
    }
    None
}

/// Images and links referenced by raw HTML, in document order.
pub fn extract_assets(html: &str) -> Vec<Asset> {
    let mut found: Vec<(usize, Asset)> = Vec::new();

    for m in IMG_RE.find_iter(html) {
        if let Some(src) = attribute(m.as_str(), "src") {
            found.push((
                m.start(),
                Asset {
                    kind: AssetKind::Image,
                    url: html_escape::decode_html_entities(src).into_owned(),
                    text: attribute(m.as_str(), "alt")
                        .filter(|a| !a.trim().is_empty())
                        .map(|a| html_escape::decode_html_entities(a).into_owned()),
                },
            ));
        }
    }
    for m in ANCHOR_RE.find_iter(html) {
        if let Some(href) = attribute(m.as_str(), "href") {
            found.push((
                m.start(),
                Asset {
                    kind: AssetKind::Link,
                    url: html_escape::decode_html_entities(href).into_owned(),
                    text: attribute(m.as_str(), "title")
                        .filter(|t| !t.trim().is_empty())
                        .map(|t| html_escape::decode_html_entities(t).into_owned()),
                },
            ));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, asset)| asset).collect()
}
