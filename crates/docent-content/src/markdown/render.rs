//! Markdown to HTML rendering with heading anchors, TOC collection, and
//! asset tracking.
//!
//! Rendering runs over the `pulldown-cmark` event stream in two steps.
//! The events are collected first so heading starts can be patched with
//! their slug once the heading text is known; the patched stream is then
//! handed to [`pulldown_cmark::html::push_html`].

use docent_core::types::article::is_external_url;
use docent_core::types::{build_toc, Asset, AssetKind, TocEntry};
use docent_core::SlugGenerator;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::html::escape_attr;
use crate::parser::MarkdownOptions;

/// Output of [`render_markdown`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    /// Rendered markup.
    pub html: String,
    /// Heading tree.
    pub toc: Vec<TocEntry>,
    /// Images and links in document order.
    pub assets: Vec<Asset>,
}

impl Rendered {
    /// Text of the first level-1 heading.
    pub fn first_h1(&self) -> Option<&str> {
        first_h1(&self.toc)
    }
}

/// Text of the first level-1 heading in a TOC tree.
pub fn first_h1(toc: &[TocEntry]) -> Option<&str> {
    // Level-1 entries are always roots.
    toc.iter()
        .find(|e| e.level == 1)
        .map(|e| e.text.as_str())
}

fn cmark_options(opts: &MarkdownOptions) -> Options {
    let mut options = Options::ENABLE_HEADING_ATTRIBUTES;
    if opts.tables {
        options.insert(Options::ENABLE_TABLES);
    }
    if opts.strikethrough {
        options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if opts.task_lists {
        options.insert(Options::ENABLE_TASKLISTS);
    }
    if opts.footnotes {
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    if opts.smart_punctuation {
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    options
}

/// Render a markdown body (front-matter already removed).
///
/// ```
/// use docent_content::markdown::render_markdown;
/// use docent_content::parser::MarkdownOptions;
///
/// let out = render_markdown("# Intro\nHello", &MarkdownOptions::default());
/// assert!(out.html.contains(r#"<h1 id="intro">"#));
/// assert_eq!(out.toc[0].text, "Intro");
/// ```
pub fn render_markdown(body: &str, opts: &MarkdownOptions) -> Rendered {
    let mut events: Vec<Event<'_>> = Parser::new_ext(body, cmark_options(opts)).collect();

    let mut slugs = SlugGenerator::new();
    let mut flat_toc = Vec::new();
    let mut assets = Vec::new();
    // One entry per open link: whether its closing tag must be rewritten.
    let mut rewritten_links: Vec<bool> = Vec::new();

    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                let level = *level as u8;
                let explicit = id.as_ref().map(|s| s.to_string());
                let text = collect_text(&events, i, |e| {
                    matches!(e, Event::End(TagEnd::Heading(_)))
                });
                let anchor = slugs.unique(explicit.as_deref().unwrap_or(&text));

                if opts.heading_ids || explicit.is_some() {
                    if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                        *id = Some(CowStr::from(anchor.clone()));
                    }
                }

                flat_toc.push(TocEntry::new(anchor, text, level));
                i += 1;
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                let url = dest_url.to_string();
                let alt = collect_text(&events, i, |e| matches!(e, Event::End(TagEnd::Image)));
                assets.push(Asset {
                    kind: AssetKind::Image,
                    url,
                    text: non_empty(alt),
                });
                i += 1;
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => {
                let url = dest_url.to_string();
                let title = title.to_string();
                let rewrite = opts.external_links_new_tab && is_external_url(&url);

                assets.push(Asset {
                    kind: AssetKind::Link,
                    url: url.clone(),
                    text: non_empty(title.clone()),
                });

                if rewrite {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_attr(&title))
                    };
                    events[i] = Event::InlineHtml(CowStr::from(format!(
                        r#"<a href="{}"{title_attr} target="_blank" rel="noopener noreferrer">"#,
                        escape_attr(&url)
                    )));
                }
                rewritten_links.push(rewrite);
                i += 1;
            }
            Event::End(TagEnd::Link) => {
                if rewritten_links.pop().unwrap_or(false) {
                    events[i] = Event::InlineHtml(CowStr::Borrowed("</a>"));
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    let mut html_out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut html_out, events.into_iter());

    Rendered {
        html: html_out,
        toc: build_toc(flat_toc),
        assets,
    }
}

/// Plain text between `events[start]` and the first event matching `is_end`.
fn collect_text(events: &[Event<'_>], start: usize, is_end: impl Fn(&Event<'_>) -> bool) -> String {
    let mut text = String::new();
    let mut i = start + 1;
    while i < events.len() {
        let event = &events[i];
        if is_end(event) {
            break;
        }
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
        i += 1;
    }
    text.trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::flatten_toc;
    use proptest::prelude::*;

    fn render(md: &str) -> Rendered {
        render_markdown(md, &MarkdownOptions::default())
    }

    #[test]
    fn test_heading_ids_and_toc() {
        let out = render("# Intro\n\n## Setup **fast**\n\n### Step `one`\n\n# Next");
        assert!(out.html.contains(r#"<h1 id="intro">Intro</h1>"#));
        assert!(out.html.contains(r#"<h2 id="setup-fast">"#));
        assert!(out.html.contains(r#"<h3 id="step-one">"#));

        assert_eq!(out.toc.len(), 2);
        assert_eq!(out.toc[0].children[0].text, "Setup fast");
        assert_eq!(out.toc[0].children[0].children[0].id, "step-one");
        assert_eq!(out.first_h1(), Some("Intro"));
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let out = render("## FAQ\n\n## FAQ\n\n## FAQ");
        assert!(out.html.contains(r#"id="faq""#));
        assert!(out.html.contains(r#"id="faq-1""#));
        assert!(out.html.contains(r#"id="faq-2""#));
    }

    #[test]
    fn test_explicit_heading_id() {
        let out = render("# Title {#custom-anchor}");
        assert!(out.html.contains(r#"<h1 id="custom-anchor">"#));
        assert_eq!(out.toc[0].id, "custom-anchor");
        assert_eq!(out.toc[0].text, "Title");
    }

    #[test]
    fn test_heading_ids_disabled_still_builds_toc() {
        let opts = MarkdownOptions {
            heading_ids: false,
            ..Default::default()
        };
        let out = render_markdown("# Intro", &opts);
        assert!(out.html.contains("<h1>Intro</h1>"));
        assert_eq!(out.toc[0].id, "intro");
    }

    #[test]
    fn test_external_links_open_in_new_tab() {
        let out = render("See [docs](https://example.com/a?b=1&c=2) and [local](/articles/intro).");
        assert!(out.html.contains(
            r#"<a href="https://example.com/a?b=1&amp;c=2" target="_blank" rel="noopener noreferrer">docs</a>"#
        ));
        assert!(out.html.contains(r#"<a href="/articles/intro">local</a>"#));
        assert_eq!(out.assets.len(), 2);
        assert!(out.assets.iter().all(|a| a.kind == AssetKind::Link));
    }

    #[test]
    fn test_external_links_untouched_when_disabled() {
        let opts = MarkdownOptions {
            external_links_new_tab: false,
            ..Default::default()
        };
        let out = render_markdown("[x](https://example.com)", &opts);
        assert!(!out.html.contains("_blank"));
    }

    #[test]
    fn test_link_title_kept() {
        let out = render(r#"[x](https://example.com "Example")"#);
        assert!(out.html.contains(r#"title="Example""#));
        assert_eq!(out.assets[0].text.as_deref(), Some("Example"));
    }

    #[test]
    fn test_images_recorded_with_alt() {
        let out = render("![A diagram](img/flow.png)\n\n![](img/blank.png)");
        assert_eq!(out.assets.len(), 2);
        assert_eq!(out.assets[0].kind, AssetKind::Image);
        assert_eq!(out.assets[0].url, "img/flow.png");
        assert_eq!(out.assets[0].text.as_deref(), Some("A diagram"));
        assert_eq!(out.assets[1].text, None);
        assert!(out.html.contains(r#"alt="A diagram""#));
    }

    #[test]
    fn test_image_inside_external_link() {
        let out = render("[![logo](logo.png)](https://example.com)");
        assert_eq!(out.assets.len(), 2);
        assert!(out.html.contains(r#"target="_blank""#));
        assert!(out.html.ends_with("</a></p>\n"));
    }

    #[test]
    fn test_tables_enabled() {
        let out = render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(out.html.contains("<table>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let md = "# A\n\n## B\n\n[l](https://x.y)\n\n![i](p.png)";
        assert_eq!(render(md), render(md));
    }

    proptest! {
        #[test]
        fn test_rendered_toc_preorder_matches_headings(levels in proptest::collection::vec(1usize..=6, 0..20)) {
            let md: String = levels
                .iter()
                .enumerate()
                .map(|(i, level)| format!("{} Heading {i}\n\n", "#".repeat(*level)))
                .collect();

            let out = render(&md);
            let flat: Vec<(String, u8)> = flatten_toc(&out.toc)
                .into_iter()
                .map(|e| (e.text, e.level))
                .collect();
            let expected: Vec<(String, u8)> = levels
                .iter()
                .enumerate()
                .map(|(i, level)| (format!("Heading {i}"), *level as u8))
                .collect();
            prop_assert_eq!(flat, expected);
        }
    }
}
