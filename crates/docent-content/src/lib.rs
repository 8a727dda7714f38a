//! Content parsers for Docent.
//!
//! Turns raw article sources into rendered markup plus metadata, a table
//! of contents, and the assets they reference.
//!
//! # Modules
//!
//! - [`parser`]: the [`ContentParser`] trait and per-format options
//! - [`markdown`]: front-matter extraction and the markdown parser
//! - [`mdx`]: MDX (markdown with imports, exports, and components)
//! - [`json`]: structured JSON articles
//! - [`tabular`]: CSV/TSV tables
//! - [`detect`]: heuristic format detection
//! - [`validate`]: authoring checks with batch reports
//! - [`html`]: escaping and text extraction helpers
//!
//! # Example
//!
//! ```rust
//! use docent_content::{default_parsers, ParseContext};
//!
//! let parsers = default_parsers();
//! let md = parsers.iter().find(|p| p.name() == "markdown").unwrap();
//! let parsed = md.parse("# Hello", &ParseContext::new()).unwrap();
//! assert!(parsed.html.contains(r#"<h1 id="hello">"#));
//! ```

pub mod detect;
pub mod html;
pub mod json;
pub mod markdown;
pub mod mdx;
pub mod parser;
pub mod tabular;
pub mod validate;

pub use detect::{ContentFormatDetector, Detection};
pub use json::JsonParser;
pub use markdown::{
    split_frontmatter, strip_frontmatter, Frontmatter, FrontmatterBlock, MarkdownParser,
};
pub use mdx::MdxParser;
pub use parser::{
    ContentParser, CsvOptions, CsvRender, JsonOptions, MarkdownOptions, MdxOptions, ParseContext,
    ParseOptions, ParsedContent, ParserSettings,
};
pub use tabular::CsvParser;
pub use validate::{
    BatchReport, ContentValidator, IssueCategory, Severity, ValidationIssue, ValidationReport,
};

use std::sync::Arc;

/// One instance of every built-in parser.
pub fn default_parsers() -> Vec<Arc<dyn ContentParser>> {
    vec![
        Arc::new(MarkdownParser::new()),
        Arc::new(MdxParser::new()),
        Arc::new(JsonParser::new()),
        Arc::new(CsvParser::new()),
    ]
}
