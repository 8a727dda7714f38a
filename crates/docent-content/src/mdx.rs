//! MDX parsing.
//!
//! MDX is markdown plus ES module statements and JSX components. This
//! parser is a lexical pre-pass in front of the markdown renderer, not a
//! JSX implementation:
//!
//! 1. front-matter is split off as for markdown;
//! 2. `{/* ... */}` comments are dropped;
//! 3. `import` / `export` statements are removed from the body;
//! 4. every `<Uppercase ...>` tag is replaced by a placeholder `<div>`
//!    carrying the component name and its props as JSON, so a host can
//!    hydrate it later;
//! 5. the result is rendered as markdown.
//!
//! Props may be `"string"`, `'string'`, `{expression}` (stored as JSON when
//! the expression is a JSON literal, as its source text otherwise), or a
//! bare name (`true`). A component closes at the first matching
//! `</Name>`, so nesting a component inside another of the same name is
//! not supported.

use std::sync::LazyLock;

use docent_core::types::ContentFormat;
use docent_core::Result;
use regex::Regex;
use serde_json::{Map, Value};

use crate::detect;
use crate::html::escape_attr;
use crate::markdown::{render_markdown, split_metadata};
use crate::parser::{has_extension, ContentParser, MdxOptions, ParseContext, ParsedContent};

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{/\*.*?\*/\}").expect("Invalid MDX comment regex"));

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?ms)^import\s.*?['"][^'"\n]*['"];?[ \t]*$"#).expect("Invalid import regex")
});

static EXPORT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^export\s+(?:const|let|var)\s+[A-Za-z_$][\w$]*\s*=\s*[\[{][ \t]*$.*?^[\]}];?[ \t]*$")
        .expect("Invalid export block regex")
});

static EXPORT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^export\s[^\n]*$").expect("Invalid export regex"));

static COMPONENT_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Z][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)").expect("Invalid component regex")
});

/// MDX parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct MdxParser;

impl MdxParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

impl ContentParser for MdxParser {
    fn name(&self) -> &str {
        "mdx"
    }

    fn format(&self) -> ContentFormat {
        ContentFormat::Mdx
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        has_extension(filename, "mdx") || detect::mdx_score(content) > 0.0
    }

    fn parse(&self, content: &str, ctx: &ParseContext) -> Result<ParsedContent> {
        let opts = ctx
            .options
            .as_ref()
            .and_then(|o| o.mdx())
            .cloned()
            .unwrap_or_default();

        let mut warnings = Vec::new();
        let (mut metadata, body) = split_metadata(content, ctx, &mut warnings);

        let body = COMMENT_RE.replace_all(body, "");
        let (body, imports) = take_matches(&body, &[&IMPORT_RE]);
        let (body, exports) = take_matches(&body, &[&EXPORT_BLOCK_RE, &EXPORT_LINE_RE]);

        let mut components = Vec::new();
        let body = replace_components(&body, &opts, &mut components, &mut warnings);

        let rendered = render_markdown(&body, &opts.markdown);

        if opts.record_statements {
            if !imports.is_empty() {
                metadata.custom.insert("imports".into(), string_array(imports));
            }
            if !exports.is_empty() {
                metadata.custom.insert("exports".into(), string_array(exports));
            }
        }
        if !components.is_empty() {
            metadata
                .custom
                .insert("components".into(), string_array(components));
        }

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

fn string_array(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

/// Remove every match of `patterns` (applied in order) and return the
/// remaining text with the removed statements in source order.
fn take_matches(src: &str, patterns: &[&Regex]) -> (String, Vec<String>) {
    let mut text = src.to_string();
    let mut found: Vec<(usize, String)> = Vec::new();

    for re in patterns {
        let mut kept = String::with_capacity(text.len());
        let mut last = 0;
        for m in re.find_iter(&text) {
            kept.push_str(&text[last..m.start()]);
            found.push((m.start(), m.as_str().trim().to_string()));
            last = m.end();
        }
        kept.push_str(&text[last..]);
        text = kept;
    }

    // Offsets from later passes are into shortened text; order is approximate.
    found.sort_by_key(|(offset, _)| *offset);
    (text, found.into_iter().map(|(_, s)| s).collect())
}

/// Replace JSX component tags with placeholder `<div>`s.
fn replace_components(
    src: &str,
    opts: &MdxOptions,
    names: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pos = 0;

    while let Some(caps) = COMPONENT_OPEN_RE.captures_at(src, pos) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let name = name.as_str();
        out.push_str(&src[pos..whole.start()]);

        let Some(tag) = parse_tag(src, whole.end()) else {
            // Not a tag after all (e.g. `a <B` in prose): keep it verbatim.
            out.push_str(whole.as_str());
            pos = whole.end();
            continue;
        };

        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }

        if tag.self_closing {
            out.push_str(&placeholder(name, tag.props, "", opts));
            pos = tag.end;
            continue;
        }

        let close = format!("</{name}>");
        match src[tag.end..].find(&close) {
            Some(rel) => {
                let inner = &src[tag.end..tag.end + rel];
                let children = replace_components(inner, opts, names, warnings);
                out.push_str(&placeholder(name, tag.props, &children, opts));
                pos = tag.end + rel + close.len();
            }
            None => {
                warnings.push(format!("component <{name}> is never closed"));
                out.push_str(&placeholder(name, tag.props, "", opts));
                pos = tag.end;
            }
        }
    }

    out.push_str(&src[pos..]);
    out
}

fn placeholder(name: &str, props: Map<String, Value>, children: &str, opts: &MdxOptions) -> String {
    let props = Value::Object(props).to_string();
    let open = format!(
        r#"<div class="{}" data-component="{}" data-props="{}">"#,
        escape_attr(&opts.placeholder_class),
        escape_attr(name),
        escape_attr(&props)
    );

    let multiline = children.contains('\n');
    let children = children.trim();
    if multiline {
        // Blank lines let the markdown renderer process the children.
        format!("{open}\n\n{children}\n\n</div>")
    } else {
        format!("{open}{children}</div>")
    }
}

struct OpenTag {
    props: Map<String, Value>,
    end: usize,
    self_closing: bool,
}

/// Scan the attributes of a tag whose name ends at `start`.
fn parse_tag(src: &str, start: usize) -> Option<OpenTag> {
    let bytes = src.as_bytes();
    let mut props = Map::new();
    let mut i = start;

    // The name must be followed by whitespace or the end of the tag.
    match bytes.get(i) {
        Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
        _ => return None,
    }

    loop {
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        match *bytes.get(i)? {
            b'/' => {
                return (bytes.get(i + 1) == Some(&b'>')).then_some(OpenTag {
                    props,
                    end: i + 2,
                    self_closing: true,
                });
            }
            b'>' => {
                return Some(OpenTag {
                    props,
                    end: i + 1,
                    self_closing: false,
                });
            }
            b'{' => {
                // Spread attribute: nothing to record.
                i = matching_brace(bytes, i)? + 1;
            }
            _ => {
                let name_start = i;
                while bytes
                    .get(i)
                    .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(*b, b'-' | b'_' | b':'))
                {
                    i += 1;
                }
                if i == name_start {
                    return None;
                }
                let attr = src[name_start..i].to_string();

                while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
                    i += 1;
                }
                if bytes.get(i) != Some(&b'=') {
                    props.insert(attr, Value::Bool(true));
                    continue;
                }
                i += 1;
                while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
                    i += 1;
                }

                let (value, next) = match *bytes.get(i)? {
                    quote @ (b'"' | b'\'') => {
                        let close = i + 1 + src[i + 1..].find(quote as char)?;
                        (Value::String(src[i + 1..close].to_string()), close + 1)
                    }
                    b'{' => {
                        let close = matching_brace(bytes, i)?;
                        let expr = src[i + 1..close].trim();
                        let value = serde_json::from_str(expr)
                            .unwrap_or_else(|_| Value::String(expr.to_string()));
                        (value, close + 1)
                    }
                    _ => return None,
                };
                props.insert(attr, value);
                i = next;
            }
        }
    }
}

/// Index of the `}` matching the `{` at `open`, skipping quoted strings.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
