//! Markdown parsing.
//!
//! - [`frontmatter`]: YAML front-matter extraction
//! - [`render`]: HTML rendering with heading anchors, TOC, and assets
//!
//! [`MarkdownParser`] ties the two together: front-matter keys become
//! [`ArticleMetadata`], the body becomes HTML.
//!
//! # Example
//!
//! ```rust
//! use docent_content::markdown::MarkdownParser;
//! use docent_content::parser::{ContentParser, ParseContext};
//!
//! let parsed = MarkdownParser::new()
//!     .parse("---\ntags: [x]\n---\n# Intro\nHello", &ParseContext::new().with_filename("a1.md"))
//!     .unwrap();
//!
//! assert_eq!(parsed.metadata.tags, vec!["x"]);
//! assert_eq!(parsed.metadata.slug.as_deref(), Some("a1"));
//! assert!(parsed.html.contains(r#"<h1 id="intro""#));
//! ```

pub mod frontmatter;
pub mod render;

pub use frontmatter::{split_frontmatter, strip_frontmatter, Frontmatter, FrontmatterBlock};
pub use render::{first_h1, render_markdown, Rendered};

use docent_core::types::{ArticleMetadata, ContentFormat};
use docent_core::Result;

use crate::detect;
use crate::parser::{has_extension, ContentParser, MarkdownOptions, ParseContext, ParsedContent};

/// Split front-matter from `content` and map it onto [`ArticleMetadata`].
///
/// Problems with the front-matter are appended to `warnings`; the body is
/// always returned.
pub(crate) fn split_metadata<'a>(
    content: &'a str,
    ctx: &ParseContext,
    warnings: &mut Vec<String>,
) -> (ArticleMetadata, &'a str) {
    let fm = split_frontmatter(content);
    if let Some(problem) = fm.problem() {
        warnings.push(format!("{}: {problem}", ctx.display_name()));
    }
    let metadata = fm.fields().map(ArticleMetadata::from_map).unwrap_or_default();

    (metadata, fm.body())
}

/// CommonMark parser with front-matter support.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

impl ContentParser for MarkdownParser {
    fn name(&self) -> &str {
        "markdown"
    }

    fn format(&self) -> ContentFormat {
        ContentFormat::Markdown
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        if has_extension(filename, "md") || has_extension(filename, "markdown") {
            return true;
        }
        detect::markdown_score(content) > 0.0
    }

    fn parse(&self, content: &str, ctx: &ParseContext) -> Result<ParsedContent> {
        let opts = ctx
            .options
            .as_ref()
            .and_then(|o| o.markdown())
            .cloned()
            .unwrap_or_else(MarkdownOptions::default);

        let mut warnings = Vec::new();
        let (metadata, body) = split_metadata(content, ctx, &mut warnings);
        let rendered = render_markdown(body, &opts);

        let mut parsed = ParsedContent {
            html: rendered.html,
            metadata,
            toc: rendered.toc,
            assets: rendered.assets,
            warnings,
        };
        parsed.ensure_slug(ctx);
        Ok(parsed)
    }
}

// ============================================================================
// Tests
// ============================================================================
