//! Structured JSON articles.
//!
//! A JSON article is an object with a `content` field holding either an
//! HTML string or an array of typed blocks:
//!
//! ```json
//! {
//!   "title": "Exporting data",
//!   "metadata": { "category": "data", "tags": ["export"] },
//!   "content": [
//!     { "type": "heading", "level": 2, "text": "Formats" },
//!     { "type": "paragraph", "text": "CSV and JSON are supported." },
//!     { "type": "callout", "variant": "warning", "text": "Large exports are slow." }
//!   ]
//! }
//! ```
//!
//! Top-level keys other than `content` and `metadata` are treated as
//! metadata too; keys inside `metadata` win on conflict. Unlike the text
//! formats, malformed JSON is a hard error.

use std::sync::LazyLock;

use docent_core::types::{build_toc, Asset, AssetKind, ContentFormat, TocEntry};
use docent_core::{ArticleMetadata, Error, Result, SlugGenerator};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::html::{attribute, escape_attr, escape_text, extract_assets, strip_html};
use crate::parser::{has_extension, ContentParser, JsonOptions, ParseContext, ParsedContent};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([1-6])(\s[^>]*)?>(.*?)</h[1-6]\s*>").expect("Invalid heading regex")
});

/// JSON article parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

impl ContentParser for JsonParser {
    fn name(&self) -> &str {
        "json"
    }

    fn format(&self) -> ContentFormat {
        ContentFormat::Json
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        if has_extension(filename, "json") {
            return true;
        }
        let trimmed = content.trim_start();
        trimmed.starts_with('{') && serde_json::from_str::<Value>(trimmed).is_ok()
    }

    fn parse(&self, content: &str, ctx: &ParseContext) -> Result<ParsedContent> {
        let opts = ctx
            .options
            .as_ref()
            .and_then(|o| o.json())
            .cloned()
            .unwrap_or_default();

        let root: Value = serde_json::from_str(content)
            .map_err(|e| Error::parse(ctx.display_name(), format!("invalid JSON: {e}")))?;
        let Value::Object(mut root) = root else {
            return Err(Error::parse(
                ctx.display_name(),
                "expected a JSON object at the top level",
            ));
        };

        let mut warnings = Vec::new();
        let body = root.remove("content");
        let metadata = merge_metadata(root, &mut warnings);

        let mut out = BlockRenderer::new(&opts);
        match body {
            Some(Value::String(html)) => out.html_string(&html),
            Some(Value::Array(blocks)) => {
                for (index, block) in blocks.iter().enumerate() {
                    out.block(index, block);
                }
            }
            Some(other) => warnings.push(format!(
                "`content` must be a string or an array of blocks, found {}",
                type_name(&other)
            )),
            None => warnings.push("missing `content` field".to_string()),
        }
        warnings.append(&mut out.warnings);

        let mut parsed = ParsedContent {
            html: out.fragments.join("\n"),
            metadata,
            toc: build_toc(out.toc),
            assets: out.assets,
            warnings,
        };
        parsed.ensure_slug(ctx);
        Ok(parsed)
    }
}

fn merge_metadata(mut root: Map<String, Value>, warnings: &mut Vec<String>) -> ArticleMetadata {
    match root.remove("metadata") {
        Some(Value::Object(inner)) => root.extend(inner),
        Some(Value::Null) | None => {}
        Some(other) => {
            warnings.push(format!(
                "`metadata` must be an object, found {}",
                type_name(&other)
            ));
        }
    }
    ArticleMetadata::from_map(root)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

struct BlockRenderer<'o> {
    opts: &'o JsonOptions,
    slugs: SlugGenerator,
    fragments: Vec<String>,
    toc: Vec<TocEntry>,
    assets: Vec<Asset>,
    warnings: Vec<String>,
}

impl<'o> BlockRenderer<'o> {
    fn new(opts: &'o JsonOptions) -> Self {
        Self {
            opts,
            slugs: SlugGenerator::new(),
            fragments: Vec::new(),
            toc: Vec::new(),
            assets: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Inline text: passed through when HTML is allowed, escaped otherwise.
    fn inline(&self, text: &str) -> String {
        if self.opts.allow_html {
            text.to_string()
        } else {
            escape_text(text)
        }
    }

    fn html_string(&mut self, html: &str) {
        if !self.opts.allow_html {
            self.fragments.push(format!("<p>{}</p>", escape_text(html)));
            return;
        }

        // Headings get ids (existing ids are kept) and feed the TOC.
        let with_ids = HEADING_RE.replace_all(html, |caps: &Captures<'_>| {
            let level: u8 = caps[1].parse().unwrap_or(2);
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            let inner = &caps[3];
            let text = strip_html(inner);

            let tag = format!("<h{level}{attrs}>");
            let (id, attrs) = match attribute(&tag, "id") {
                Some(existing) => (self.slugs.unique(existing), attrs.to_string()),
                None => {
                    let id = self.slugs.unique(&text);
                    (id.clone(), format!(r#" id="{}"{attrs}"#, escape_attr(&id)))
                }
            };
            self.toc.push(TocEntry::new(id, text, level));
            format!("<h{level}{attrs}>{inner}</h{level}>")
        });

        self.assets.extend(extract_assets(&with_ids));
        self.fragments.push(with_ids.into_owned());
    }

    fn block(&mut self, index: usize, block: &Value) {
        let Some(kind) = block.get("type").and_then(Value::as_str) else {
            self.warnings
                .push(format!("content block {index} has no `type`; skipped"));
            return;
        };
        let text = str_field(block, "text").unwrap_or_default();

        let fragment = match kind {
            "heading" => {
                let level = block
                    .get("level")
                    .and_then(Value::as_u64)
                    .map_or(2, |l| l.clamp(1, 6) as u8);
                let id = self
                    .slugs
                    .unique(str_field(block, "id").unwrap_or(text));
                self.toc.push(TocEntry::new(&id, text, level));
                format!(
                    r#"<h{level} id="{}">{}</h{level}>"#,
                    escape_attr(&id),
                    escape_text(text)
                )
            }
            "paragraph" => format!("<p>{}</p>", self.inline(text)),
            "code" => {
                let code = str_field(block, "code").unwrap_or(text);
                match str_field(block, "language").filter(|l| !l.is_empty()) {
                    Some(lang) => format!(
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        escape_attr(lang),
                        escape_text(code)
                    ),
                    None => format!("<pre><code>{}</code></pre>", escape_text(code)),
                }
            }
            "image" => {
                let Some(src) = str_field(block, "src").or_else(|| str_field(block, "url")) else {
                    self.warnings
                        .push(format!("image block {index} has no `src`; skipped"));
                    return;
                };
                let alt = str_field(block, "alt").unwrap_or_default();
                self.assets.push(Asset {
                    kind: AssetKind::Image,
                    url: src.to_string(),
                    text: (!alt.is_empty()).then(|| alt.to_string()),
                });
                let img = format!(
                    r#"<img src="{}" alt="{}" />"#,
                    escape_attr(src),
                    escape_attr(alt)
                );
                match str_field(block, "caption") {
                    Some(caption) => format!(
                        "<figure>{img}<figcaption>{}</figcaption></figure>",
                        self.inline(caption)
                    ),
                    None => format!("<figure>{img}</figure>"),
                }
            }
            "list" => {
                let tag = if block.get("ordered").and_then(Value::as_bool).unwrap_or(false) {
                    "ol"
                } else {
                    "ul"
                };
                let items: String = block
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(|item| format!("<li>{}</li>", self.inline(item)))
                            .collect()
                    })
                    .unwrap_or_default();
                format!("<{tag}>{items}</{tag}>")
            }
            "blockquote" => format!("<blockquote><p>{}</p></blockquote>", self.inline(text)),
            "callout" => {
                let variant = str_field(block, "variant").unwrap_or("info");
                let class = docent_core::slugify(variant);
                let title = str_field(block, "title")
                    .map(|t| format!(r#"<p class="callout-title">{}</p>"#, self.inline(t)))
                    .unwrap_or_default();
                format!(
                    r#"<div class="callout callout-{class}">{title}<p>{}</p></div>"#,
                    self.inline(text)
                )
            }
            "html" => {
                let html = str_field(block, "html").unwrap_or(text);
                if self.opts.allow_html {
                    self.assets.extend(extract_assets(html));
                    html.to_string()
                } else {
                    format!("<p>{}</p>", escape_text(html))
                }
            }
            other => {
                self.warnings
                    .push(format!("content block {index} has unknown type `{other}`; skipped"));
                return;
            }
        };

        self.fragments.push(fragment);
    }
}

fn str_field<'v>(block: &'v Value, key: &str) -> Option<&'v str> {
    block.get(key).and_then(Value::as_str)
}

// ============================================================================
// Tests
// ============================================================================
