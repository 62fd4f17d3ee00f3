//! Call-level options for crawling, extraction and snippet location.

use std::time::Duration;

/// Limits and politeness settings for one crawl invocation.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Hard cap on distinct URLs visited
    pub max_pages: usize,

    /// Hard cap on link hops from the seed
    pub max_depth: usize,

    /// Pause between fetches
    pub delay: Duration,

    /// Honour the seed origin's robots.txt
    pub respect_robots: bool,

    /// Text extraction rules applied to every page
    pub extraction: ExtractOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 5000,
            max_depth: 50,
            delay: Duration::from_millis(300),
            respect_robots: false,
            extraction: ExtractOptions::default(),
        }
    }
}

/// Rules deciding which parts of a page count as content.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Element names removed with their whole subtree
    pub structural_tags: Vec<String>,

    /// Element names whose text is collected
    pub content_tags: Vec<String>,

    /// Also drop containers whose class or id mentions one of `related_markers`
    /// or whose class is in `class_denylist`
    pub skip_related_blocks: bool,

    /// Substrings of class/id marking related-content containers
    pub related_markers: Vec<String>,

    /// Class names marking navigation-like containers
    pub class_denylist: Vec<String>,
}

impl ExtractOptions {
    /// Structural filtering plus related-content container removal.
    pub fn with_related_blocks() -> Self {
        Self {
            skip_related_blocks: true,
            ..Self::default()
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            structural_tags: to_strings(&["nav", "header", "footer", "aside"]),
            content_tags: to_strings(&[
                "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "strong", "em", "span", "a",
            ]),
            skip_related_blocks: false,
            related_markers: to_strings(&["related"]),
            class_denylist: to_strings(&["menulink", "anchor-link"]),
        }
    }
}

/// Output bounds for snippet location.
#[derive(Debug, Clone)]
pub struct SnippetOptions {
    /// Maximum snippets returned per keyword
    pub max_per_keyword: usize,

    /// Characters of context on each side of a match
    pub context_chars: usize,

    /// How far up the tree to look for an excluded container
    pub max_ancestor_hops: usize,

    /// Container rules shared with page extraction
    pub extraction: ExtractOptions,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            max_per_keyword: 25,
            context_chars: 80,
            max_ancestor_hops: 12,
            extraction: ExtractOptions::with_related_blocks(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
