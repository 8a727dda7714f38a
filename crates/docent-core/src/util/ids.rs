//! ID and slug utilities.
//!
//! Provides functions for normalizing identifiers to kebab-case, deriving
//! article slugs from filenames, and generating stable heading anchors.

use std::collections::HashMap;
use std::path::Path;

/// Normalize an identifier to lowercase kebab-case.
///
/// # Examples
///
/// ```
/// use docent_core::util::ids::normalize_id;
///
/// assert_eq!(normalize_id("Getting Started"), "getting-started");
/// assert_eq!(normalize_id("api_reference"), "api-reference");
/// assert_eq!(normalize_id("  Mixed   Case  "), "mixed-case");
/// ```
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("-")
}

/// Compute an ID from a file path's stem.
///
/// Returns `None` if the path has no file stem.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use docent_core::util::ids::id_from_path;
///
/// assert_eq!(
///     id_from_path(Path::new("articles/Getting_Started.md")),
///     Some("getting-started".to_string())
/// );
/// assert_eq!(id_from_path(Path::new("/")), None);
/// ```
pub fn id_from_path(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(normalize_id)
}

/// Turn heading text into a URL-safe anchor.
///
/// Letters and digits are kept (lowercased), whitespace, hyphens and
/// underscores become single hyphens, everything else is dropped.
///
/// ```
/// use docent_core::util::ids::slugify;
///
/// assert_eq!(slugify("Intro"), "intro");
/// assert_eq!(slugify("What's new in v2.0?"), "whats-new-in-v20");
/// assert_eq!(slugify("  --Edge__cases--  "), "edge-cases");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }

    slug
}

/// Hands out unique slugs within one document.
///
/// The first occurrence of a slug is returned unchanged, later duplicates
/// get `-1`, `-2`, ... appended. Empty slugs fall back to `section`.
#[derive(Debug, Default, Clone)]
pub struct SlugGenerator {
    seen: HashMap<String, usize>,
}

impl SlugGenerator {
    /// Create an empty generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text` and make it unique among slugs issued so far.
    pub fn unique(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut count = match self.seen.get(&base) {
            None => {
                self.seen.insert(base.clone(), 0);
                return base;
            }
            Some(count) => *count,
        };

        loop {
            count += 1;
            let candidate = format!("{base}-{count}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(base, count);
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // normalize_id tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalize_id_simple() {
        assert_eq!(normalize_id("intro"), "intro");
    }

    #[test]
    fn test_normalize_id_with_spaces_and_underscores() {
        assert_eq!(normalize_id("Quick Start_guide"), "quick-start-guide");
    }

    #[test]
    fn test_normalize_id_empty() {
        assert_eq!(normalize_id(""), "");
        assert_eq!(normalize_id("   "), "");
    }

    // -------------------------------------------------------------------------
    // id_from_path tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_id_from_path_nested() {
        let path = Path::new("/help/articles/billing/Refund_Policy.mdx");
        assert_eq!(id_from_path(path), Some("refund-policy".to_string()));
    }

    #[test]
    fn test_id_from_path_no_extension() {
        assert_eq!(
            id_from_path(Path::new("docs/README")),
            Some("readme".to_string())
        );
    }

    // -------------------------------------------------------------------------
    // slugify tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Über Größe"), "über-größe");
    }

    #[test]
    fn test_slugify_only_symbols() {
        assert_eq!(slugify("!!!"), "");
    }

    // -------------------------------------------------------------------------
    // SlugGenerator tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_slug_generator_dedupes() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.unique("Setup"), "setup");
        assert_eq!(slugs.unique("Setup"), "setup-1");
        assert_eq!(slugs.unique("Setup"), "setup-2");
        assert_eq!(slugs.unique("Usage"), "usage");
    }

    #[test]
    fn test_slug_generator_avoids_collision_with_literal_suffix() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.unique("Step 1"), "step-1");
        assert_eq!(slugs.unique("Step"), "step");
        assert_eq!(slugs.unique("Step"), "step-2");
    }

    #[test]
    fn test_slug_generator_empty_heading() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.unique("???"), "section");
        assert_eq!(slugs.unique(""), "section-1");
    }
}
