//! YAML front-matter.
//!
//! A front-matter block opens on the first line of a file with a line that
//! is exactly `---` and closes at the next such line:
//!
//! ```markdown
//! ---
//! title: Resetting your password
//! category: account
//! tags: [login, security]
//! ---
//!
//! # Resetting your password
//! ```
//!
//! ```rust
//! use docent_content::markdown::split_frontmatter;
//!
//! let fm = split_frontmatter("---\ntitle: Test\n---\n\nBody");
//! assert!(fm.is_parsed());
//! assert_eq!(fm.string("title"), Some("Test"));
//! assert_eq!(fm.body().trim(), "Body");
//! ```

use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value;

/// What was found at the top of a file.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterBlock {
    /// The file does not start with a delimiter line.
    Absent,
    /// An opening delimiter with no closing one. The whole file is body.
    Unclosed,
    /// Both delimiters, but the YAML between them did not parse.
    Invalid(String),
    /// Both delimiters and a parsed YAML document.
    Parsed(Value),
}

/// A file split into its front-matter block and body.
#[derive(Debug, Clone)]
pub struct Frontmatter<'a> {
    block: FrontmatterBlock,
    body: &'a str,
}

impl<'a> Frontmatter<'a> {
    /// The block classification.
    pub fn block(&self) -> &FrontmatterBlock {
        &self.block
    }

    /// Everything after the closing delimiter. Always a suffix of the input.
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Whether a YAML document was parsed.
    pub fn is_parsed(&self) -> bool {
        matches!(self.block, FrontmatterBlock::Parsed(_))
    }

    /// A top-level string field.
    pub fn string(&self, key: &str) -> Option<&str> {
        match &self.block {
            FrontmatterBlock::Parsed(value) => value.get(key)?.as_str(),
            _ => None,
        }
    }

    /// The fields as a JSON object, ready for
    /// [`ArticleMetadata::from_map`](docent_core::ArticleMetadata::from_map).
    ///
    /// Anything other than a parsed mapping yields an empty object, except a
    /// parsed document that is not a mapping, which is an error.
    pub fn fields(&self) -> Result<Map<String, JsonValue>, String> {
        match &self.block {
            FrontmatterBlock::Parsed(value @ Value::Mapping(_)) => match serde_json::to_value(value) {
                Ok(JsonValue::Object(map)) => Ok(map),
                Ok(_) => Err("front-matter is not a mapping".to_string()),
                Err(e) => Err(format!("front-matter cannot be represented as JSON: {e}")),
            },
            FrontmatterBlock::Parsed(Value::Null) => Ok(Map::new()),
            FrontmatterBlock::Parsed(_) => Err("front-matter is not a mapping".to_string()),
            _ => Ok(Map::new()),
        }
    }

    /// A description of what is wrong with the block, if anything.
    pub fn problem(&self) -> Option<String> {
        match &self.block {
            FrontmatterBlock::Absent => None,
            FrontmatterBlock::Unclosed => {
                Some("front-matter opening delimiter has no closing delimiter".to_string())
            }
            FrontmatterBlock::Invalid(e) => Some(format!("invalid front-matter YAML: {e}")),
            FrontmatterBlock::Parsed(_) => self.fields().err(),
        }
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Split front-matter from the body.
///
/// ```rust
/// use docent_content::markdown::{split_frontmatter, FrontmatterBlock};
///
/// let fm = split_frontmatter("# Just Markdown");
/// assert_eq!(fm.block(), &FrontmatterBlock::Absent);
/// assert_eq!(fm.body(), "# Just Markdown");
/// ```
pub fn split_frontmatter(content: &str) -> Frontmatter<'_> {
    let mut lines = content.split_inclusive('\n');
    let yaml_start = match lines.next() {
        Some(first) if is_delimiter(first) && first.ends_with('\n') => first.len(),
        _ => {
            return Frontmatter {
                block: FrontmatterBlock::Absent,
                body: content,
            };
        }
    };

    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            let yaml = &content[yaml_start..offset];
            let block = match serde_yaml::from_str::<Value>(yaml) {
                Ok(value) => FrontmatterBlock::Parsed(value),
                Err(e) => {
                    log::warn!("Failed to parse front-matter YAML: {e}");
                    FrontmatterBlock::Invalid(e.to_string())
                }
            };
            return Frontmatter {
                block,
                body: &content[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    log::warn!("Front-matter opening delimiter found but no closing delimiter");
    Frontmatter {
        block: FrontmatterBlock::Unclosed,
        body: content,
    }
}

/// The body with any front-matter removed.
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content).body()
}

// ============================================================================
// Tests
// ============================================================================
