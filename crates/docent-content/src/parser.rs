//! The parser contract and per-format options.
//!
//! Every format implements [`ContentParser`]. Parsing is deterministic:
//! the same content, filename, and options always yield the same
//! [`ParsedContent`].
//!
//! Options are a tagged union keyed by format name. A parser handed the
//! options of another format falls back to its own defaults.
//!
//! ```rust
//! use docent_content::parser::{ParseOptions, CsvOptions};
//!
//! let opts: ParseOptions = serde_json::from_str(r#"{"format":"csv","delimiter":";"}"#).unwrap();
//! assert_eq!(opts.csv().and_then(|c| c.delimiter), Some(';'));
//! ```

use std::path::Path;

use docent_core::types::{ArticleMetadata, Asset, ContentFormat, TocEntry};
use docent_core::{id_from_path, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Parser trait
// ============================================================================

/// A format-specific content parser.
pub trait ContentParser: Send + Sync {
    /// Parser name for diagnostics.
    fn name(&self) -> &str;

    /// The format this parser produces.
    fn format(&self) -> ContentFormat;

    /// Fast heuristic check for whether this parser should handle `content`.
    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool;

    /// Parse raw content into markup and metadata.
    fn parse(&self, content: &str, ctx: &ParseContext) -> Result<ParsedContent>;
}

/// Inputs that accompany raw content.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Source filename, used for error messages and slug derivation.
    pub filename: Option<String>,
    /// Format-specific options.
    pub options: Option<ParseOptions>,
}

impl ParseContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the parser options.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Name used in error messages.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<inline>")
    }

    /// Slug derived from the filename stem.
    pub fn filename_slug(&self) -> Option<String> {
        self.filename
            .as_deref()
            .and_then(|f| id_from_path(Path::new(f)))
            .filter(|s| !s.is_empty())
    }

    /// Whether the filename has the given extension.
    pub fn has_extension(&self, ext: &str) -> bool {
        has_extension(self.filename.as_deref(), ext)
    }
}

pub(crate) fn has_extension(filename: Option<&str>, ext: &str) -> bool {
    filename
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Output of a parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContent {
    /// Rendered markup.
    pub html: String,
    /// Metadata derived from the content.
    pub metadata: ArticleMetadata,
    /// Heading tree.
    pub toc: Vec<TocEntry>,
    /// Referenced images and links.
    pub assets: Vec<Asset>,
    /// Non-fatal problems encountered while parsing.
    pub warnings: Vec<String>,
}

impl ParsedContent {
    /// Fill in `metadata.slug` from the filename when the content did not
    /// provide one.
    pub(crate) fn ensure_slug(&mut self, ctx: &ParseContext) {
        if self.metadata.slug.is_none() {
            self.metadata.slug = ctx.filename_slug();
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Parser options, keyed by format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ParseOptions {
    /// Markdown options.
    Markdown(MarkdownOptions),
    /// MDX options.
    Mdx(MdxOptions),
    /// JSON options.
    Json(JsonOptions),
    /// CSV options.
    Csv(CsvOptions),
}

impl ParseOptions {
    /// Markdown options, if this is the markdown variant.
    pub fn markdown(&self) -> Option<&MarkdownOptions> {
        match self {
            ParseOptions::Markdown(o) => Some(o),
            _ => None,
        }
    }

    /// MDX options, if this is the MDX variant.
    pub fn mdx(&self) -> Option<&MdxOptions> {
        match self {
            ParseOptions::Mdx(o) => Some(o),
            _ => None,
        }
    }

    /// JSON options, if this is the JSON variant.
    pub fn json(&self) -> Option<&JsonOptions> {
        match self {
            ParseOptions::Json(o) => Some(o),
            _ => None,
        }
    }

    /// CSV options, if this is the CSV variant.
    pub fn csv(&self) -> Option<&CsvOptions> {
        match self {
            ParseOptions::Csv(o) => Some(o),
            _ => None,
        }
    }
}

/// Markdown rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownOptions {
    /// Emit slug-derived `id` attributes on headings.
    #[serde(default = "default_true")]
    pub heading_ids: bool,
    /// Open `http(s)://` links in a new tab with `rel="noopener noreferrer"`.
    #[serde(default = "default_true")]
    pub external_links_new_tab: bool,
    /// GitHub-style tables.
    #[serde(default = "default_true")]
    pub tables: bool,
    /// `~~strikethrough~~`.
    #[serde(default = "default_true")]
    pub strikethrough: bool,
    /// `- [ ]` task lists.
    #[serde(default = "default_true")]
    pub task_lists: bool,
    /// Footnotes.
    #[serde(default)]
    pub footnotes: bool,
    /// Curly quotes and dashes.
    #[serde(default)]
    pub smart_punctuation: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            heading_ids: true,
            external_links_new_tab: true,
            tables: true,
            strikethrough: true,
            task_lists: true,
            footnotes: false,
            smart_punctuation: false,
        }
    }
}

/// MDX options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdxOptions {
    /// Options for the markdown pass.
    #[serde(default)]
    pub markdown: MarkdownOptions,
    /// CSS class on component placeholders.
    #[serde(default = "default_placeholder_class")]
    pub placeholder_class: String,
    /// Record extracted import/export statements in `metadata.custom`.
    #[serde(default = "default_true")]
    pub record_statements: bool,
}

impl Default for MdxOptions {
    fn default() -> Self {
        Self {
            markdown: MarkdownOptions::default(),
            placeholder_class: default_placeholder_class(),
            record_statements: true,
        }
    }
}

/// JSON article options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonOptions {
    /// Pass `html` blocks and string content through unescaped.
    #[serde(default = "default_true")]
    pub allow_html: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { allow_html: true }
    }
}

/// How CSV rows are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvRender {
    /// An HTML table.
    #[default]
    Table,
    /// One card per row.
    Cards,
}

/// CSV options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter. Defaults to tab for `.tsv` files, comma otherwise.
    #[serde(default)]
    pub delimiter: Option<char>,
    /// Treat the first row as column headers.
    #[serde(default = "default_true")]
    pub has_headers: bool,
    /// Output shape.
    #[serde(default)]
    pub render: CsvRender,
    /// Column used as card title (defaults to the first column).
    #[serde(default)]
    pub title_column: Option<String>,
    /// Column used as card body (defaults to the second column).
    #[serde(default)]
    pub content_column: Option<String>,
    /// CSS class on the table or card container.
    #[serde(default = "default_table_class")]
    pub class_name: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_headers: true,
            render: CsvRender::default(),
            title_column: None,
            content_column: None,
            class_name: default_table_class(),
        }
    }
}

/// Options for every parser, as carried by loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Markdown options.
    #[serde(default)]
    pub markdown: MarkdownOptions,
    /// MDX options.
    #[serde(default)]
    pub mdx: MdxOptions,
    /// JSON options.
    #[serde(default)]
    pub json: JsonOptions,
    /// CSV options.
    #[serde(default)]
    pub csv: CsvOptions,
}

impl ParserSettings {
    /// Options variant for `format`, if the format has a parser.
    pub fn options_for(&self, format: ContentFormat) -> Option<ParseOptions> {
        match format {
            ContentFormat::Markdown => Some(ParseOptions::Markdown(self.markdown.clone())),
            ContentFormat::Mdx => Some(ParseOptions::Mdx(self.mdx.clone())),
            ContentFormat::Json => Some(ParseOptions::Json(self.json.clone())),
            ContentFormat::Csv => Some(ParseOptions::Csv(self.csv.clone())),
            ContentFormat::Html => None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_placeholder_class() -> String {
    "mdx-component".to_string()
}

fn default_table_class() -> String {
    "csv-table".to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_tagged_by_format() {
        let opts = ParseOptions::Markdown(MarkdownOptions::default());
        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"format\":\"markdown\""));

        let back: ParseOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn test_options_defaults_fill_in() {
        let opts: ParseOptions = serde_json::from_str(r#"{"format":"csv"}"#).unwrap();
        let csv = opts.csv().unwrap();
        assert!(csv.has_headers);
        assert_eq!(csv.render, CsvRender::Table);
        assert_eq!(csv.class_name, "csv-table");
        assert!(opts.markdown().is_none());
    }

    #[test]
    fn test_parser_settings_options_for() {
        let settings = ParserSettings::default();
        assert!(settings.options_for(ContentFormat::Html).is_none());
        assert!(matches!(
            settings.options_for(ContentFormat::Mdx),
            Some(ParseOptions::Mdx(_))
        ));
    }

    #[test]
    fn test_context_filename_slug() {
        let ctx = ParseContext::new().with_filename("articles/Getting_Started.md");
        assert_eq!(ctx.filename_slug().as_deref(), Some("getting-started"));
        assert!(ctx.has_extension("MD"));
        assert_eq!(ParseContext::new().display_name(), "<inline>");
    }
}
