//! Table-of-contents entries.
//!
//! Parsers emit headings as a flat, document-ordered list. [`build_toc`]
//! nests each entry under the closest preceding entry with a strictly
//! smaller level, so a pre-order walk of the tree ([`flatten_toc`]) yields
//! the original sequence.
//!
//! ```
//! use docent_core::types::{build_toc, TocEntry};
//!
//! let toc = build_toc(vec![
//!     TocEntry::new("intro", "Intro", 1),
//!     TocEntry::new("setup", "Setup", 2),
//!     TocEntry::new("usage", "Usage", 1),
//! ]);
//! assert_eq!(toc.len(), 2);
//! assert_eq!(toc[0].children[0].id, "setup");
//! ```

use serde::{Deserialize, Serialize};

/// A heading in a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading anchor id.
    pub id: String,
    /// Plain heading text.
    pub text: String,
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Nested headings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// Create a leaf entry. Levels are clamped into 1..=6.
    pub fn new(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level: level.clamp(1, 6),
            children: Vec::new(),
        }
    }
}

/// Convert a flat heading sequence into a tree.
pub fn build_toc(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut entries = flat.into_iter().peekable();
    attach_children(&mut entries, 0)
}

fn attach_children<I>(entries: &mut std::iter::Peekable<I>, parent_level: u8) -> Vec<TocEntry>
where
    I: Iterator<Item = TocEntry>,
{
    let mut siblings = Vec::new();
    while let Some(next) = entries.peek() {
        if next.level <= parent_level {
            break;
        }
        let Some(mut entry) = entries.next() else {
            break;
        };
        entry.children = attach_children(entries, entry.level);
        siblings.push(entry);
    }
    siblings
}

/// Pre-order walk of a TOC tree, returning leaf copies of every entry.
pub fn flatten_toc(toc: &[TocEntry]) -> Vec<TocEntry> {
    let mut out = Vec::new();
    for entry in toc {
        out.push(TocEntry::new(&entry.id, &entry.text, entry.level));
        out.extend(flatten_toc(&entry.children));
    }
    out
}
