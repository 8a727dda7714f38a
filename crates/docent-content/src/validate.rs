//! Content validation.
//!
//! Validation collects issues instead of failing: a report lists every
//! problem found in a file, classified by severity and category, and a
//! batch report aggregates the counts.
//!
//! Markdown and MDX sources are checked line by line. Other formats are
//! parsed and their extracted assets checked.
//!
//! ```
//! use docent_content::validate::{ContentValidator, Severity};
//!
//! let validator = ContentValidator::new().with_known_ids(["intro"]);
//! let report = validator.validate("guide.md", "# Guide\n\nSee [intro](intro) and [gone](/articles/gone).");
//! assert_eq!(report.count(Severity::Warning), 1);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use docent_core::types::article::is_external_url;
use docent_core::types::{AssetKind, ContentFormat};
use docent_core::normalize_id;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::detect::ContentFormatDetector;
use crate::markdown::split_frontmatter;
use crate::parser::{ContentParser, ParseContext};
use crate::{CsvParser, JsonParser};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The content is broken.
    Error,
    /// The content works but is probably wrong.
    Warning,
    /// Worth knowing.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// What part of the content an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    /// Front-matter block.
    Frontmatter,
    /// Heading structure and parseability.
    Structure,
    /// Hyperlinks.
    Links,
    /// Images.
    Images,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueCategory::Frontmatter => "frontmatter",
            IssueCategory::Structure => "structure",
            IssueCategory::Links => "links",
            IssueCategory::Images => "images",
        })
    }
}

/// One problem found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Severity.
    pub severity: Severity,
    /// Category.
    pub category: IssueCategory,
    /// Human-readable description.
    pub message: String,
    /// 1-based source line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} [{}] line {line}: {}", self.severity, self.category, self.message),
            None => write!(f, "{} [{}] {}", self.severity, self.category, self.message),
        }
    }
}

/// Issues found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// File name as given to the validator.
    pub file: String,
    /// Issues in source order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `true` when there are no errors.
    pub fn is_valid(&self) -> bool {
        self.count(Severity::Error) == 0
    }

    /// Number of issues with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Aggregate of several reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Per-file reports, in input order.
    pub reports: Vec<ValidationReport>,
    /// Total errors.
    pub errors: usize,
    /// Total warnings.
    pub warnings: usize,
    /// Total infos.
    pub infos: usize,
}

impl BatchReport {
    /// `true` when no file has errors.
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    /// Number of files with at least one error.
    pub fn files_with_errors(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_valid()).count()
    }
}

/// Checks article sources for common authoring mistakes.
#[derive(Debug, Clone, Default)]
pub struct ContentValidator {
    known_ids: HashSet<String>,
}

impl ContentValidator {
    /// Create a validator that does not check internal link targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag internal links whose target is not one of `ids`.
    pub fn with_known_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_ids = ids.into_iter().map(|id| normalize_id(id.as_ref())).collect();
        self
    }

    /// Validate one file.
    pub fn validate(&self, file: &str, content: &str) -> ValidationReport {
        let format = ContentFormatDetector::new()
            .detect_from_content(content, Some(file))
            .map(|d| d.format);

        let mut issues = Vec::new();
        match format {
            Some(ContentFormat::Markdown | ContentFormat::Mdx) => {
                self.check_markdown(content, &mut issues);
            }
            Some(format @ (ContentFormat::Json | ContentFormat::Csv)) => {
                self.check_parsed(file, content, format, &mut issues);
            }
            Some(ContentFormat::Html) | None => issues.push(ValidationIssue {
                severity: Severity::Info,
                category: IssueCategory::Structure,
                message: "format not recognized; content not checked".to_string(),
                line: None,
            }),
        }

        ValidationReport {
            file: file.to_string(),
            issues,
        }
    }

    /// Validate several files and total the counts.
    pub fn validate_batch<'a, I>(&self, files: I) -> BatchReport
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut batch = BatchReport::default();
        for (file, content) in files {
            let report = self.validate(file, content);
            batch.errors += report.count(Severity::Error);
            batch.warnings += report.count(Severity::Warning);
            batch.infos += report.count(Severity::Info);
            batch.reports.push(report);
        }
        batch
    }

    fn check_markdown(&self, content: &str, issues: &mut Vec<ValidationIssue>) {
        let fm = split_frontmatter(content);
        let has_title = fm.string("title").is_some_and(|t| !t.trim().is_empty());

        if let Some(problem) = fm.problem() {
            issues.push(issue(Severity::Error, IssueCategory::Frontmatter, problem, Some(1)));
        }

        let body = fm.body();
        let body_offset = content.len() - body.len();
        let line_of = |offset: usize| content[..body_offset + offset].matches('\n').count() + 1;

        let mut h1_count = 0;
        let mut previous_level: Option<u8> = None;
        let mut image: Option<(String, usize, String)> = None;

        let parser = Parser::new_ext(body, Options::ENABLE_TABLES | Options::ENABLE_HEADING_ATTRIBUTES);
        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    let level = level as u8;
                    let line = line_of(range.start);
                    if level == 1 {
                        h1_count += 1;
                        if h1_count == 2 {
                            issues.push(issue(
                                Severity::Warning,
                                IssueCategory::Structure,
                                "multiple level-1 headings",
                                Some(line),
                            ));
                        }
                    }
                    if let Some(prev) = previous_level {
                        if level > prev + 1 {
                            issues.push(issue(
                                Severity::Warning,
                                IssueCategory::Structure,
                                format!("heading level skips from h{prev} to h{level}"),
                                Some(line),
                            ));
                        }
                    }
                    previous_level = Some(level);
                }
                Event::Start(Tag::Link { dest_url, .. }) => {
                    self.check_link(&dest_url, Some(line_of(range.start)), issues);
                }
                Event::Start(Tag::Image { dest_url, .. }) => {
                    image = Some((dest_url.to_string(), line_of(range.start), String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, _, alt)) = image.as_mut() {
                        alt.push_str(&text);
                    }
                }
                Event::End(TagEnd::Image) => {
                    if let Some((src, line, alt)) = image.take() {
                        check_image(&src, &alt, Some(line), issues);
                    }
                }
                _ => {}
            }
        }

        if h1_count == 0 {
            let (severity, message) = if has_title {
                (Severity::Info, "no level-1 heading; title comes from front-matter")
            } else {
                (Severity::Warning, "no title: add a level-1 heading or a front-matter title")
            };
            issues.push(issue(severity, IssueCategory::Structure, message, None));
        } else if fm.is_parsed() && !has_title {
            issues.push(issue(
                Severity::Info,
                IssueCategory::Frontmatter,
                "front-matter has no title; the first heading is used",
                Some(1),
            ));
        }
    }

    fn check_parsed(
        &self,
        file: &str,
        content: &str,
        format: ContentFormat,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let ctx = ParseContext::new().with_filename(file);
        let parsed = match format {
            ContentFormat::Json => JsonParser::new().parse(content, &ctx),
            _ => CsvParser::new().parse(content, &ctx),
        };

        match parsed {
            Ok(parsed) => {
                for warning in parsed.warnings {
                    issues.push(issue(Severity::Warning, IssueCategory::Structure, warning, None));
                }
                for asset in parsed.assets {
                    match asset.kind {
                        AssetKind::Link => self.check_link(&asset.url, None, issues),
                        AssetKind::Image => check_image(
                            &asset.url,
                            asset.text.as_deref().unwrap_or_default(),
                            None,
                            issues,
                        ),
                    }
                }
            }
            Err(err) => issues.push(issue(Severity::Error, IssueCategory::Structure, err.to_string(), None)),
        }
    }

    fn check_link(&self, url: &str, line: Option<usize>, issues: &mut Vec<ValidationIssue>) {
        let url = url.trim();
        if url.is_empty() {
            issues.push(issue(Severity::Error, IssueCategory::Links, "link has an empty target", line));
            return;
        }
        if self.known_ids.is_empty() {
            return;
        }
        if let Some(target) = internal_article_id(url) {
            if !self.known_ids.contains(&target) {
                issues.push(issue(
                    Severity::Warning,
                    IssueCategory::Links,
                    format!("link to unknown article '{target}'"),
                    line,
                ));
            }
        }
    }
}

fn check_image(src: &str, alt: &str, line: Option<usize>, issues: &mut Vec<ValidationIssue>) {
    if src.trim().is_empty() {
        issues.push(issue(Severity::Error, IssueCategory::Images, "image has an empty source", line));
    }
    if alt.trim().is_empty() {
        issues.push(issue(
            Severity::Warning,
            IssueCategory::Images,
            format!("image '{src}' has no alt text"),
            line,
        ));
    }
}

/// Article id an internal link points at, if it is an article link.
///
/// Anchors, external URLs, and other schemes (`mailto:`, `tel:`) are not.
fn internal_article_id(url: &str) -> Option<String> {
    if url.starts_with('#') || is_external_url(url) || url.starts_with("//") {
        return None;
    }
    if let Some(colon) = url.find(':') {
        if !url[..colon].contains('/') {
            return None;
        }
    }

    let path = url.split(['#', '?']).next().unwrap_or_default();
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let id = Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(normalize_id)?;
    (!id.is_empty()).then_some(id)
}

fn issue(
    severity: Severity,
    category: IssueCategory,
    message: impl Into<String>,
    line: Option<usize>,
) -> ValidationIssue {
    ValidationIssue {
        severity,
        category,
        message: message.into(),
        line,
    }
}

// ============================================================================
// Tests
// ============================================================================
