//! Manifest loading end to end.

use docent_core::ContentFormat;
use docent_loader::{ParseRequest, StaticContentLoader};

use crate::common::{fs_loader, mixed_loader, write_tree, BASIC_MANIFEST, INTRO_MD};

#[tokio::test]
async fn test_basic_manifest_from_disk() {
    let dir = write_tree(&[("manifest.json", BASIC_MANIFEST), ("articles/a1.md", INTRO_MD)]);
    let mut loader = fs_loader(&dir);

    let report = loader.load_manifest().await.expect("manifest should load");
    assert_eq!(report.loaded, vec!["a1"]);
    assert!(report.failed.is_empty());

    let articles = loader.get_all_articles();
    assert_eq!(articles.len(), 1);
    let article = &articles[0];
    assert_eq!(article.id, "a1");
    assert_eq!(article.title, "Intro");
    assert_eq!(article.metadata.tags, vec!["x"]);
    assert_eq!(article.category(), Some("c1"));
    assert!(article.rendered_content.contains(r#"<h1 id="intro""#));
}

#[test]
fn test_csv_quoted_comma_survives() {
    let mut loader = StaticContentLoader::default();
    let article = loader
        .parse_content(
            ParseRequest::new("table", "a,b\n1,\"two, and two\"\n3,4").filename("table.csv"),
        )
        .expect("csv should parse");

    let html = &article.rendered_content;
    assert_eq!(html.matches("<tbody>").count(), 1);
    assert_eq!(html.matches("<tr>").count(), 3, "header row plus two body rows");
    assert_eq!(html.matches("<td>").count(), 4);
    assert!(html.contains("<td>two, and two</td>"));
}

#[tokio::test]
async fn test_missing_article_without_source_is_none() {
    let mut loader = StaticContentLoader::default();
    assert!(loader.load_article("missing").await.is_none());
}

#[tokio::test]
async fn test_mixed_formats_and_failures() {
    let mut loader = mixed_loader();
    let report = loader.load_manifest().await.unwrap();

    assert_eq!(report.loaded, vec!["welcome", "shortcuts", "limits", "widgets"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].slug, "ghost");

    let format = |id: &str| loader.get_article_by_id(id).unwrap().format;
    assert_eq!(format("welcome"), ContentFormat::Markdown);
    assert_eq!(format("shortcuts"), ContentFormat::Json);
    assert_eq!(format("limits"), ContentFormat::Csv);
    assert_eq!(format("widgets"), ContentFormat::Mdx);

    assert_eq!(loader.get_article_by_id("shortcuts").unwrap().title, "Keyboard shortcuts");
    assert!(loader.get_article_by_id("limits").unwrap().rendered_content.contains("1,000"));
}

#[tokio::test]
async fn test_reading_order_and_navigation() {
    let mut loader = mixed_loader();
    loader.load_manifest().await.unwrap();

    let ids: Vec<String> = loader.get_all_articles().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec!["welcome", "shortcuts", "limits", "widgets"]);

    let nav = loader.navigation("shortcuts").unwrap();
    assert_eq!(nav.prev.unwrap().id, "welcome");
    assert_eq!(nav.next.unwrap().id, "limits");

    let crumbs: Vec<String> = loader
        .navigation("widgets")
        .unwrap()
        .breadcrumbs
        .into_iter()
        .map(|b| b.label)
        .collect();
    assert_eq!(crumbs, vec!["Basics", "Reference", "Widgets"]);
}

#[tokio::test]
async fn test_registry_queries_after_load() {
    let mut loader = mixed_loader();
    loader.load_manifest().await.unwrap();

    assert_eq!(loader.articles_by_category("reference").len(), 2);
    assert_eq!(loader.articles_by_tag("start")[0].id, "welcome");
    assert_eq!(loader.related_articles("welcome")[0].id, "shortcuts");

    let results = loader.search("widgets");
    assert_eq!(results[0].id, "widgets");
    assert_eq!(results[0].category.as_deref(), Some("Reference"));

    let suggestions = loader.suggest("welcom", 3);
    assert_eq!(suggestions[0].id, "welcome");
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let mut loader = mixed_loader();
    loader.load_manifest().await.unwrap();
    let before = loader.get_all_articles();

    loader.load_manifest().await.unwrap();
    let after = loader.get_all_articles();

    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(**a, **b);
    }
    assert_eq!(loader.index().len(), after.len());
}
