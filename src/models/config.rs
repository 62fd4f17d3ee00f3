//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{CrawlOptions, ExtractOptions, KeywordSpec, SnippetOptions};
use crate::services::PatternSet;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Keywords, exclusions and snippet settings
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Result persistence settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::validation("crawler.max_pages must be > 0"));
        }
        if self.matcher.snippet_context_chars == 0 {
            return Err(AppError::validation(
                "matcher.snippet_context_chars must be > 0",
            ));
        }
        if self.matcher.max_snippets_per_keyword == 0 {
            return Err(AppError::validation(
                "matcher.max_snippets_per_keyword must be > 0",
            ));
        }
        if !self
            .matcher
            .keywords
            .iter()
            .any(|k| KeywordSpec::parse(k).is_some())
        {
            return Err(AppError::validation("No keywords defined"));
        }
        if PatternSet::compile_with_errors(&self.matcher.keywords).0.is_empty() {
            return Err(AppError::validation("No keyword compiles"));
        }
        Ok(())
    }

    /// Compile every keyword and exclusion, failing on the first malformed one.
    ///
    /// Runs skip malformed patterns with a warning instead.
    pub fn check_patterns(&self) -> Result<()> {
        PatternSet::try_compile(&self.matcher.keywords)?;
        PatternSet::try_compile(&self.matcher.exclude)?;
        Ok(())
    }

    /// Crawl limits derived from the `[crawler]` section.
    pub fn crawl_options(&self) -> CrawlOptions {
        let extraction = if self.crawler.skip_related_blocks {
            ExtractOptions::with_related_blocks()
        } else {
            ExtractOptions::default()
        };

        CrawlOptions {
            max_pages: self.crawler.max_pages,
            max_depth: self.crawler.max_depth,
            delay: Duration::from_millis(self.crawler.delay_ms),
            respect_robots: self.crawler.respect_robots,
            extraction,
        }
    }

    /// Snippet bounds derived from the `[matcher]` section.
    pub fn snippet_options(&self) -> SnippetOptions {
        SnippetOptions {
            max_per_keyword: self.matcher.max_snippets_per_keyword,
            context_chars: self.matcher.snippet_context_chars,
            ..SnippetOptions::default()
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::delay")]
    pub delay_ms: u64,

    /// Maximum number of distinct pages visited per crawl
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Honour robots.txt of the crawled site
    #[serde(default)]
    pub respect_robots: bool,

    /// Drop "related content" and menu containers before matching
    #[serde(default = "defaults::skip_related_blocks")]
    pub skip_related_blocks: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            delay_ms: defaults::delay(),
            max_pages: defaults::max_pages(),
            max_depth: defaults::max_depth(),
            respect_robots: false,
            skip_related_blocks: defaults::skip_related_blocks(),
        }
    }
}

/// Keyword and snippet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Keyword specifications (literal, `prefix*` or `/regex/`)
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Specifications whose matches are suppressed
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Characters of context on each side of a snippet
    #[serde(default = "defaults::snippet_context")]
    pub snippet_context_chars: usize,

    /// Maximum snippets shown per keyword
    #[serde(default = "defaults::max_snippets")]
    pub max_snippets_per_keyword: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            exclude: Vec::new(),
            snippet_context_chars: defaults::snippet_context(),
            max_snippets_per_keyword: defaults::max_snippets(),
        }
    }
}

/// Result persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Flush written records after this many pages
    #[serde(default = "defaults::checkpoint_every")]
    pub checkpoint_every: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: defaults::checkpoint_every(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; greenscan/0.1; +greenwashing review)".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn delay() -> u64 {
        300
    }
    pub fn max_pages() -> usize {
        5000
    }
    pub fn max_depth() -> usize {
        50
    }
    pub fn skip_related_blocks() -> bool {
        true
    }

    // Matcher defaults
    pub fn keywords() -> Vec<String> {
        [
            "bæredygtig*",
            "miljørigtig",
            "klimavenlig",
            "grøn",
            "grønne",
            "miljøvenlig",
            "skånsom mod miljøet",
            "co2-neutral",
            "klimaneutral*",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
    pub fn snippet_context() -> usize {
        80
    }
    pub fn max_snippets() -> usize {
        25
    }

    // Output defaults
    pub fn checkpoint_every() -> usize {
        25
    }
}
