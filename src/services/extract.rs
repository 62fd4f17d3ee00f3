//! Readable text extraction.
//!
//! Site-wide navigation and menus repeat on every page and would make every
//! page match menu keywords, so structural containers are removed before any
//! text is collected. Only an allow-list of content-bearing elements
//! contributes text, in document order.

use scraper::{ElementRef, Html, Node};
use url::Url;

use crate::models::ExtractOptions;

/// Elements whose text is never visible content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Whitespace-collapsed text of one content element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub tag: String,
    pub text: String,
}

/// Extract page text with the default structural filter.
pub fn extract_text(html: &str) -> String {
    extract_text_with(html, &ExtractOptions::default())
}

/// Extract page text with explicit filtering rules.
pub fn extract_text_with(html: &str, options: &ExtractOptions) -> String {
    let document = Html::parse_document(html);
    document_text(&document, options)
}

/// Text of an already parsed document, one content block per line.
pub fn document_text(document: &Html, options: &ExtractOptions) -> String {
    content_blocks(document, options, None)
        .into_iter()
        .map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collect content blocks in document order.
///
/// Nested content elements contribute once, through their outermost
/// content ancestor. `max_hops` bounds how far up the tree an excluded
/// container is looked for; `None` checks the full ancestry.
pub fn content_blocks(
    document: &Html,
    options: &ExtractOptions,
    max_hops: Option<usize>,
) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
        let name = element.value().name();
        if !is_content_tag(name, options) || is_excluded(&element, options) {
            continue;
        }
        if has_content_ancestor(&element, options) {
            continue;
        }
        if has_excluded_ancestor(&element, options, max_hops) {
            continue;
        }

        let text = block_text(&element, options);
        if !text.is_empty() {
            blocks.push(ContentBlock {
                tag: name.to_string(),
                text,
            });
        }
    }

    blocks
}

/// Resolve every anchor `href` in the document against `base`.
///
/// Fragment-only links and non-navigational schemes are dropped; the result
/// may still contain off-site URLs.
pub fn document_links(document: &Html, base: &Url) -> Vec<Url> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| resolve_href(base, href))
        .collect()
}

fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("javascript:")
    {
        return None;
    }
    base.join(href).ok()
}

fn is_content_tag(name: &str, options: &ExtractOptions) -> bool {
    options.content_tags.iter().any(|t| t == name)
}

/// Whether an element (and its subtree) is removed before text collection.
fn is_excluded(element: &ElementRef<'_>, options: &ExtractOptions) -> bool {
    let value = element.value();
    let name = value.name();

    if NON_CONTENT_TAGS.contains(&name) || options.structural_tags.iter().any(|t| t == name) {
        return true;
    }
    if !options.skip_related_blocks {
        return false;
    }

    let mentions_marker = |attr: Option<&str>| {
        attr.map(|v| v.to_lowercase()).is_some_and(|v| {
            options
                .related_markers
                .iter()
                .any(|marker| v.contains(marker.as_str()))
        })
    };
    if mentions_marker(value.attr("class")) || mentions_marker(value.id()) {
        return true;
    }

    value
        .classes()
        .any(|class| options.class_denylist.iter().any(|denied| denied == class))
}

fn has_content_ancestor(element: &ElementRef<'_>, options: &ExtractOptions) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_content_tag(ancestor.value().name(), options))
}

fn has_excluded_ancestor(
    element: &ElementRef<'_>,
    options: &ExtractOptions,
    max_hops: Option<usize>,
) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(max_hops.unwrap_or(usize::MAX))
        .any(|ancestor| is_excluded(&ancestor, options))
}

fn block_text(element: &ElementRef<'_>, options: &ExtractOptions) -> String {
    let mut raw = String::new();
    push_text(element, options, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(element: &ElementRef<'_>, options: &ExtractOptions, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_excluded(&child, options) {
                        push_text(&child, options, out);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head><title>Forside</title><script>var grøn = 1;</script></head>
        <body>
          <header><a href="/">Grøn forside</a></header>
          <nav><ul><li><a href="/baeredygtighed">Bæredygtighed</a></li></ul></nav>
          <main>
            <h1>Vores   arbejde</h1>
            <p>Vi er <strong>klimaneutrale</strong> og
               bæredygtige.</p>
            <div>Løs tekst uden for indholdstags</div>
            <div class="related-articles"><p>Relateret: grøn omstilling</p></div>
            <ul><li><a class="menulink" href="/x">Menu</a> Punkt</li></ul>
          </main>
          <aside><p>Sidebar grøn</p></aside>
          <footer><p>Grøn footer</p></footer>
        </body></html>
    "#;

    #[test]
    fn test_structural_containers_are_removed() {
        let text = extract_text(PAGE);
        assert!(!text.contains("Grøn forside"));
        assert!(!text.contains("Bæredygtighed"));
        assert!(!text.contains("Sidebar"));
        assert!(!text.contains("footer"));
        assert!(!text.contains("var grøn"));
    }

    #[test]
    fn test_content_blocks_in_order_with_collapsed_whitespace() {
        let text = extract_text(PAGE);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Vores arbejde");
        assert_eq!(lines[1], "Vi er klimaneutrale og bæredygtige.");
        assert!(!text.contains("Løs tekst"));
    }

    #[test]
    fn test_nested_content_counted_once() {
        let text = extract_text(PAGE);
        assert_eq!(text.matches("klimaneutrale").count(), 1);
    }

    #[test]
    fn test_related_blocks_only_removed_when_enabled() {
        let plain = extract_text(PAGE);
        assert!(plain.contains("Relateret: grøn omstilling"));
        assert!(plain.contains("Menu Punkt"));

        let filtered = extract_text_with(PAGE, &ExtractOptions::with_related_blocks());
        assert!(!filtered.contains("Relateret"));
        assert!(!filtered.contains("Menu"));
        assert!(filtered.contains("Punkt"));
    }

    #[test]
    fn test_bounded_ancestor_walk() {
        let html = "<nav><div><div><div><p>dybt</p></div></div></div></nav>";
        let document = Html::parse_document(html);
        let options = ExtractOptions::default();

        assert!(content_blocks(&document, &options, None).is_empty());
        assert!(content_blocks(&document, &options, Some(4)).is_empty());
        assert_eq!(content_blocks(&document, &options, Some(2)).len(), 1);
    }

    #[test]
    fn test_document_links() {
        let html = r##"
            <a href="/om-os">Om</a>
            <a href="https://other.example/x">Ekstern</a>
            <a href="#top">Top</a>
            <a href="mailto:info@example.com">Mail</a>
            <a href="JavaScript:void(0)">JS</a>
            <a>Uden href</a>
        "##;
        let document = Html::parse_document(html);
        let base = Url::parse("https://example.com/cases/").unwrap();
        let links: Vec<String> = document_links(&document, &base)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec!["https://example.com/om-os", "https://other.example/x"]
        );
    }
}
