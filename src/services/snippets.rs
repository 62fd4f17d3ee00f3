//! On-demand snippet location for human review.
//!
//! Works per content element rather than on the whole page text, so each
//! snippet can name the element it came from.

use std::collections::HashMap;

use scraper::Html;

use crate::models::{SnippetOptions, SnippetRecord};
use crate::services::PatternSet;
use crate::services::extract::content_blocks;
use crate::services::scoring::{compare_keys, is_hit};

/// Locate keyword matches in a page with surrounding context.
///
/// At most `max_per_keyword` snippets are kept per keyword, taken in document
/// order. The result is grouped by keyword (case-insensitive), then by tag.
pub fn locate_snippets(
    html: &str,
    patterns: &PatternSet,
    exclude: Option<&PatternSet>,
    options: &SnippetOptions,
) -> Vec<SnippetRecord> {
    let document = Html::parse_document(html);
    let blocks = content_blocks(
        &document,
        &options.extraction,
        Some(options.max_ancestor_hops),
    );

    let mut per_keyword: HashMap<&str, usize> = HashMap::new();
    let mut rows = Vec::new();

    for block in &blocks {
        for entry in patterns.iter() {
            let taken = per_keyword.entry(entry.key()).or_insert(0);

            for m in entry.regex().find_iter(&block.text) {
                if *taken >= options.max_per_keyword {
                    break;
                }
                if !is_hit(&m, exclude) {
                    continue;
                }

                let (snippet, start, end) =
                    snippet_window(&block.text, m.start(), m.end(), options.context_chars);
                rows.push(SnippetRecord {
                    keyword: entry.key().to_string(),
                    tag: block.tag.clone(),
                    snippet,
                    start,
                    end,
                });
                *taken += 1;
            }
        }
    }

    rows.sort_by(|a, b| compare_keys(&a.keyword, &b.keyword).then_with(|| a.tag.cmp(&b.tag)));
    rows
}

/// Cut `context` characters on each side of the byte range `start..end`,
/// clamped to the text. Returns the snippet and the match's character offsets.
pub fn snippet_window(
    text: &str,
    start: usize,
    end: usize,
    context: usize,
) -> (String, usize, usize) {
    let start_char = text[..start].chars().count();
    let end_char = start_char + text[start..end].chars().count();
    let total_chars = text.chars().count();

    let left = start_char.saturating_sub(context);
    let right = end_char.saturating_add(context).min(total_chars);

    let snippet = text.chars().skip(left).take(right - left).collect();
    (snippet, start_char, end_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_per_keyword: usize, context_chars: usize) -> SnippetOptions {
        SnippetOptions {
            max_per_keyword,
            context_chars,
            ..SnippetOptions::default()
        }
    }

    #[test]
    fn test_window_clamped_at_start_and_end() {
        let text = "grøn energi";
        let (snippet, start, end) = snippet_window(text, 0, "grøn".len(), 80);
        assert_eq!(snippet, "grøn energi");
        assert_eq!((start, end), (0, 4));

        let offset = text.find("energi").unwrap();
        let (snippet, start, end) = snippet_window(text, offset, text.len(), 3);
        assert_eq!(snippet, "øn energi");
        assert_eq!((start, end), (5, 11));
    }

    #[test]
    fn test_window_length_bound() {
        let text = format!("{} klimaneutral {}", "æ".repeat(200), "ø".repeat(200));
        let start = text.find("klimaneutral").unwrap();
        let end = start + "klimaneutral".len();
        let (snippet, _, _) = snippet_window(&text, start, end, 80);
        assert_eq!(snippet.chars().count(), 2 * 80 + "klimaneutral".len());
        assert!(snippet.contains("klimaneutral"));
    }

    #[test]
    fn test_snippets_name_their_element() {
        let html = r#"
            <h2>Grøn omstilling</h2>
            <p>Vi leverer bæredygtige løsninger.</p>
            <nav><a>Grøn menu</a></nav>
        "#;
        let patterns = PatternSet::compile(&["grøn", "bæredygtig*"]);
        let rows = locate_snippets(html, &patterns, None, &options(25, 80));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keyword, "bæredygtig*");
        assert_eq!(rows[0].tag, "p");
        assert_eq!(rows[0].snippet, "Vi leverer bæredygtige løsninger.");
        assert_eq!(rows[1].keyword, "grøn");
        assert_eq!(rows[1].tag, "h2");
    }

    #[test]
    fn test_cap_per_keyword() {
        let html = "<p>grøn grøn grøn</p><li>grøn</li><p>klima</p>";
        let patterns = PatternSet::compile(&["grøn", "klima"]);
        let rows = locate_snippets(html, &patterns, None, &options(2, 5));

        let green: Vec<_> = rows.iter().filter(|r| r.keyword == "grøn").collect();
        assert_eq!(green.len(), 2);
        assert!(green.iter().all(|r| r.tag == "p"));
        assert_eq!(rows.iter().filter(|r| r.keyword == "klima").count(), 1);
    }

    #[test]
    fn test_grouped_by_keyword_then_tag() {
        let html = "<p>grøn</p><h1>grøn</h1><li>Klima</li>";
        let patterns = PatternSet::compile(&["grøn", "Klima"]);
        let rows = locate_snippets(html, &patterns, None, &options(10, 10));
        let order: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.keyword.as_str(), r.tag.as_str()))
            .collect();
        assert_eq!(order, vec![("grøn", "h1"), ("grøn", "p"), ("Klima", "li")]);
    }

    #[test]
    fn test_exclusions_and_related_blocks() {
        let html = r#"
            <p>Grønland og grønne tage</p>
            <section class="related"><p>grøn artikel</p></section>
        "#;
        let patterns = PatternSet::compile(&["grøn*"]);
        let exclude = PatternSet::compile(&["grønland"]);
        let rows = locate_snippets(html, &patterns, Some(&exclude), &options(10, 80));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start, 12);
        assert_eq!(rows[0].end, 18);
    }

    #[test]
    fn test_zero_width_matches_produce_no_snippets() {
        let html = "<p>Vi sælger cykler</p><p>grøn strøm</p>";
        let patterns = PatternSet::compile(&["/x*/", "grøn"]);
        let rows = locate_snippets(html, &patterns, None, &options(10, 10));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keyword, "grøn");
    }
}
