//! Supported content formats.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A content format the pipeline knows how to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// CommonMark with YAML front-matter.
    #[serde(rename = "md")]
    Markdown,
    /// Markdown with imports, exports, and JSX-like components.
    Mdx,
    /// Structured JSON article (`content` as HTML or typed blocks).
    Json,
    /// Comma- or tab-separated tables.
    Csv,
    /// Raw HTML (detected, not parsed).
    Html,
}

impl ContentFormat {
    /// All formats, in detection tie-break order.
    pub const ALL: [ContentFormat; 5] = [
        ContentFormat::Json,
        ContentFormat::Csv,
        ContentFormat::Mdx,
        ContentFormat::Markdown,
        ContentFormat::Html,
    ];

    /// Short name used in filenames and serialized config.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Markdown => "md",
            ContentFormat::Mdx => "mdx",
            ContentFormat::Json => "json",
            ContentFormat::Csv => "csv",
            ContentFormat::Html => "html",
        }
    }

    /// Map a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(ContentFormat::Markdown),
            "mdx" => Some(ContentFormat::Mdx),
            "json" => Some(ContentFormat::Json),
            "csv" | "tsv" => Some(ContentFormat::Csv),
            "html" | "htm" => Some(ContentFormat::Html),
            _ => None,
        }
    }

    /// Map a filename to a format by its extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
