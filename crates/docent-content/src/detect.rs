//! Heuristic content format detection.
//!
//! A filename with a known extension decides the format outright
//! (confidence 1.0). Otherwise every format is scored independently from
//! structural signals in the content and the highest score wins. Among
//! equal scores the first format in [`ContentFormat::ALL`] is kept.
//!
//! | Format   | Signals |
//! |----------|---------|
//! | JSON     | parses as a JSON object or array (0.95) |
//! | CSV      | share of records with the first record's field count, x 0.8 |
//! | MDX      | import 0.3, export 0.2, JSX tag 0.3, `{expression}` 0.1, +0.1 with markdown signals |
//! | Markdown | front-matter 0.3, heading 0.3, link 0.15, emphasis 0.1, code fence 0.15, list 0.1 |
//! | HTML     | DOCTYPE 0.95, leading block tag 0.6, any block tag 0.2 |
//!
//! These are heuristics, not grammars.

use std::sync::LazyLock;

use docent_core::types::ContentFormat;
use regex::Regex;
use serde::Serialize;

use crate::tabular::parse_records;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^import\s+(?:.+\s+from\s+)?['"]"#).expect("Invalid import regex")
});
static EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^export\s+(?:const|let|var|default|function)\b").expect("Invalid export regex")
});
static JSX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Z][A-Za-z0-9_.]*[\s/>]").expect("Invalid JSX regex"));
static EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}\n]+\}").expect("Invalid expression regex"));

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+\S").expect("Invalid heading regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[[^\]\n]+\]\([^)\s]+[^)]*\)").expect("Invalid link regex"));
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*[^*\n]+\*\*|__[^_\n]+__|\*[^*\s][^*\n]*\*|\b_[^_\s][^_\n]*_\b")
        .expect("Invalid emphasis regex")
});
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]{0,3}(?:```|~~~)").expect("Invalid fence regex"));
static LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+[.)])[ \t]+\S").expect("Invalid list regex")
});

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<(?:html|head|body|div|p|span|h[1-6]|ul|ol|li|table|section|article|header|footer|nav|main)\b[^>]*>",
    )
    .expect("Invalid HTML tag regex")
});

const CSV_DELIMITERS: [u8; 3] = [b',', b'\t', b';'];
const CSV_SAMPLE_RECORDS: usize = 20;

/// Outcome of format detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Detected format.
    pub format: ContentFormat,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f32,
    /// Parser that handles the format, if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_name: Option<String>,
}

impl Detection {
    fn new(format: ContentFormat, confidence: f32) -> Self {
        let parser_name = match format {
            ContentFormat::Markdown => Some("markdown"),
            ContentFormat::Mdx => Some("mdx"),
            ContentFormat::Json => Some("json"),
            ContentFormat::Csv => Some("csv"),
            ContentFormat::Html => None,
        };
        Self {
            format,
            confidence,
            parser_name: parser_name.map(String::from),
        }
    }
}

/// Classifies raw content into a [`ContentFormat`].
///
/// ```
/// use docent_content::detect::ContentFormatDetector;
/// use docent_core::ContentFormat;
///
/// let detector = ContentFormatDetector::new();
/// let found = detector.detect_from_content("---\ntitle: x\n---\n# Intro", None).unwrap();
/// assert_eq!(found.format, ContentFormat::Markdown);
///
/// let found = detector.detect_from_content("anything", Some("data.csv")).unwrap();
/// assert_eq!(found.confidence, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentFormatDetector {
    min_confidence: f32,
}

impl ContentFormatDetector {
    /// Create a detector that accepts any positive score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject content-based detections scoring at or below `min`.
    pub fn with_min_confidence(mut self, min: f32) -> Self {
        self.min_confidence = min.max(0.0);
        self
    }

    /// Format implied by the filename's extension.
    pub fn detect_from_filename(&self, filename: &str) -> Option<Detection> {
        ContentFormat::from_filename(filename).map(|f| Detection::new(f, 1.0))
    }

    /// Detect the format of `content`, trusting a known extension first.
    pub fn detect_from_content(&self, content: &str, filename: Option<&str>) -> Option<Detection> {
        if let Some(found) = filename.and_then(|f| self.detect_from_filename(f)) {
            return Some(found);
        }

        let mut best: Option<(ContentFormat, f32)> = None;
        for (format, score) in scores(content) {
            // Strictly greater: ties keep the earlier format.
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((format, score));
            }
        }

        let (format, confidence) = best?;
        if confidence <= self.min_confidence {
            log::debug!("no format scored above {}", self.min_confidence);
            return None;
        }
        log::debug!("detected {format} with confidence {confidence:.2}");
        Some(Detection::new(format, confidence))
    }
}

/// Score `content` for every format, in [`ContentFormat::ALL`] order.
pub fn scores(content: &str) -> Vec<(ContentFormat, f32)> {
    ContentFormat::ALL
        .iter()
        .map(|&format| {
            let score = match format {
                ContentFormat::Json => json_score(content),
                ContentFormat::Csv => csv_score(content),
                ContentFormat::Mdx => mdx_score(content),
                ContentFormat::Markdown => markdown_score(content),
                ContentFormat::Html => html_score(content),
            };
            (format, score)
        })
        .collect()
}

/// 0.95 when `content` is a JSON object or array, otherwise 0.
pub fn json_score(content: &str) -> f32 {
    let trimmed = content.trim();
    let looks_like = trimmed.starts_with('{') || trimmed.starts_with('[');
    if looks_like && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        0.95
    } else {
        0.0
    }
}

/// Delimiter consistency across the first records, scaled to 0.8.
///
/// Needs at least two records, and the first must have two or more fields.
pub fn csv_score(content: &str) -> f32 {
    let mut best = 0.0f32;

    for delimiter in CSV_DELIMITERS {
        let Ok(records) = parse_records(content, delimiter) else {
            continue;
        };
        let sample: Vec<usize> = records
            .iter()
            .take(CSV_SAMPLE_RECORDS)
            .map(Vec::len)
            .collect();
        let Some(&expected) = sample.first() else {
            continue;
        };
        if sample.len() < 2 || expected < 2 {
            continue;
        }
        let consistent = sample.iter().filter(|&&n| n == expected).count();
        best = best.max(consistent as f32 / sample.len() as f32);
    }

    best * 0.8
}

/// Weighted MDX signals. Zero unless an import, export, or JSX tag is present.
pub fn mdx_score(content: &str) -> f32 {
    let mut points = 0u32;
    if IMPORT_RE.is_match(content) {
        points += 30;
    }
    if EXPORT_RE.is_match(content) {
        points += 20;
    }
    if JSX_RE.is_match(content) {
        points += 30;
    }
    if points == 0 {
        return 0.0;
    }
    if EXPRESSION_RE.is_match(content) {
        points += 10;
    }
    if markdown_points(content) > 0 {
        points += 10;
    }
    to_confidence(points)
}

/// Weighted markdown signals.
pub fn markdown_score(content: &str) -> f32 {
    to_confidence(markdown_points(content))
}

// Weights are kept in hundredths so equal totals compare equal.
fn markdown_points(content: &str) -> u32 {
    let mut points = 0;
    if content.starts_with("---\n") || content.starts_with("---\r\n") {
        points += 30;
    }
    if HEADING_RE.is_match(content) {
        points += 30;
    }
    if LINK_RE.is_match(content) {
        points += 15;
    }
    if EMPHASIS_RE.is_match(content) {
        points += 10;
    }
    if FENCE_RE.is_match(content) {
        points += 15;
    }
    if LIST_RE.is_match(content) {
        points += 10;
    }
    points
}

fn to_confidence(points: u32) -> f32 {
    points.min(100) as f32 / 100.0
}

/// DOCTYPE or block-level tags.
pub fn html_score(content: &str) -> f32 {
    let trimmed = content.trim_start();
    if trimmed
        .get(..14)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype html"))
    {
        return 0.95;
    }
    if HTML_TAG_RE.is_match(content) {
        return if trimmed.starts_with('<') { 0.6 } else { 0.2 };
    }
    0.0
}

// ============================================================================
// Tests
// ============================================================================
