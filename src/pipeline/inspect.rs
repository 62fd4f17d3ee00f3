// src/pipeline/inspect.rs

//! Snippet inspection of a single page.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{ExtractOptions, SnippetOptions, SnippetRecord};
use crate::services::{Fetcher, PatternSet, extract_text_with, locate_snippets, score};
use crate::utils::url::normalize_seed;

/// Matches on one page, ready for review.
#[derive(Debug, Clone, Serialize)]
pub struct PageInspection {
    pub url: String,

    /// Surviving matches per keyword on the whole page
    pub counts: Vec<(String, usize)>,

    pub total: usize,

    pub snippets: Vec<SnippetRecord>,
}

/// Matcher inputs for an inspection.
pub struct InspectRequest<'a> {
    pub patterns: &'a PatternSet,
    pub exclude: Option<&'a PatternSet>,
    pub extraction: &'a ExtractOptions,
    pub snippets: &'a SnippetOptions,
}

/// Fetch `url` past caches and locate every keyword match in context.
///
/// Unlike a crawl, a page that cannot be fetched or scored is an error here.
pub fn run_snippets<F: Fetcher>(
    fetcher: &F,
    url: &str,
    request: &InspectRequest<'_>,
) -> Result<PageInspection> {
    let target = normalize_seed(url)?;
    let page = fetcher.fetch(&target, true)?;
    if let Some(reason) = page.rejection() {
        return Err(AppError::fetch(target.as_str(), reason));
    }

    let text = extract_text_with(&page.body, request.extraction);
    let summary = score(&text, request.patterns, request.exclude);
    let snippets = locate_snippets(&page.body, request.patterns, request.exclude, request.snippets);

    log::info!(
        "{}: {} hits, {} snippets",
        target,
        summary.total,
        snippets.len()
    );

    Ok(PageInspection {
        url: target.to_string(),
        counts: summary.counts,
        total: summary.total,
        snippets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::testing::StaticSite;

    const PAGE: &str = r#"<html><body>
        <nav><p>Bæredygtighed</p></nav>
        <h1>Vores bæredygtige fremtid</h1>
        <p>Vi er klimaneutrale siden 2020 og arbejder bæredygtigt.</p>
    </body></html>"#;

    fn inspect(site: &StaticSite, url: &str) -> Result<PageInspection> {
        let patterns = PatternSet::compile(&["bæredygtig*", "klimaneutral*"]);
        let extraction = ExtractOptions::with_related_blocks();
        let snippets = SnippetOptions::default();
        let request = InspectRequest {
            patterns: &patterns,
            exclude: None,
            extraction: &extraction,
            snippets: &snippets,
        };
        run_snippets(site, url, &request)
    }

    #[test]
    fn test_inspection_counts_and_snippets() {
        let site = StaticSite::new().html("https://example.com/om", PAGE);

        let inspection = inspect(&site, "https://example.com/om").unwrap();

        assert_eq!(inspection.total, 3);
        assert_eq!(
            inspection.counts,
            vec![("bæredygtig*".to_string(), 2), ("klimaneutral*".to_string(), 1)]
        );
        assert_eq!(inspection.snippets.len(), 3);
        assert_eq!(inspection.snippets[0].keyword, "bæredygtig*");
        assert_eq!(inspection.snippets[0].tag, "h1");
        assert!(inspection.snippets.iter().all(|s| !s.snippet.contains("Bæredygtighed")));
        assert_eq!(site.fresh_requests(), vec!["https://example.com/om"]);
    }

    #[test]
    fn test_rejected_page_is_an_error() {
        let site = StaticSite::new().page("https://example.com/gone", 410, "text/html", "");
        assert!(inspect(&site, "https://example.com/gone").is_err());
        assert!(inspect(&site, "https://example.com/missing").is_err());
    }
}
