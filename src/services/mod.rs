//! Service layer: keyword matching and site crawling.
//!
//! - Pattern compilation (`PatternSet`)
//! - Text extraction, scoring and snippet location
//! - Page fetching (`Fetcher`, `HttpFetcher`) and robots.txt rules
//! - Breadth-first site crawling (`SiteCrawler`)

pub mod crawler;
pub mod extract;
pub mod fetcher;
pub mod patterns;
pub mod robots;
pub mod scoring;
pub mod snippets;

pub use crawler::{Crawl, CrawlProgress, Scan, SiteCrawler};
pub use extract::{ContentBlock, extract_text, extract_text_with};
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use patterns::{CompiledKeyword, PatternSet};
pub use robots::RobotsRules;
pub use scoring::{MatchSummary, score};
pub use snippets::{locate_snippets, snippet_window};
