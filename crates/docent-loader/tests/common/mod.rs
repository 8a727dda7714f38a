//! Shared fixtures for loader integration tests.

use std::path::Path;
use std::sync::Arc;

use docent_loader::{FsFetcher, LoaderConfig, MemoryFetcher, StaticContentLoader};
use tempfile::TempDir;

/// Single-category manifest listing `a1`.
pub const BASIC_MANIFEST: &str = r#"{
    "categories": [
        {
            "id": "c1",
            "title": "Cat",
            "order": 1,
            "articles": [{ "slug": "a1", "title": "Intro", "order": 1 }]
        }
    ]
}"#;

/// Markdown article with front-matter tags.
pub const INTRO_MD: &str = "---\ntags: [x]\n---\n# Intro\nHello";

/// Two categories, mixed formats, one article that does not exist.
pub const MIXED_MANIFEST: &str = r#"{
    "title": "Help Center",
    "categories": [
        {
            "id": "basics",
            "title": "Basics",
            "order": 1,
            "articles": [
                { "slug": "welcome", "order": 1 },
                { "slug": "shortcuts", "order": 2 },
                { "slug": "ghost", "order": 3 }
            ]
        },
        {
            "id": "reference",
            "title": "Reference",
            "order": 2,
            "parentId": "basics",
            "articles": [
                { "slug": "limits", "order": 1 },
                { "slug": "widgets", "order": 2 }
            ]
        }
    ]
}"#;

/// Files served for [`MIXED_MANIFEST`].
pub fn mixed_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("manifest.json", MIXED_MANIFEST),
        (
            "articles/welcome.md",
            "---\ntags: [start]\nrelatedArticles: [shortcuts]\n---\n# Welcome\n\nGetting around the help center.",
        ),
        (
            "articles/shortcuts.json",
            r#"{"title":"Keyboard shortcuts","content":[{"type":"paragraph","text":"Press ? for help."}]}"#,
        ),
        ("articles/limits.csv", "plan,limit\nfree,\"1,000\"\npro,unlimited"),
        (
            "articles/widgets.mdx",
            "import { Note } from './note'\n\n# Widgets\n\n<Note>Widgets are reusable.</Note>",
        ),
    ]
}

/// Loader over an in-memory copy of the mixed fixture.
pub fn mixed_loader() -> StaticContentLoader {
    StaticContentLoader::new(LoaderConfig::default())
        .with_fetcher(Arc::new(MemoryFetcher::with_files(mixed_files())))
}

/// Write `files` under a fresh temporary directory.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (path, content) in files {
        write_file(dir.path(), path, content);
    }
    dir
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dirs");
    }
    std::fs::write(path, content).expect("write fixture");
}

/// Loader reading from `dir` on disk.
pub fn fs_loader(dir: &TempDir) -> StaticContentLoader {
    StaticContentLoader::default().with_fetcher(Arc::new(FsFetcher::new(dir.path())))
}
