// src/models/mod.rs

//! Domain models for the scanner.
//!
//! Plain data shared by the matcher, the crawler and the storage sinks.

mod config;
mod keyword;
mod options;
mod record;

// Re-export all public types
pub use config::{Config, CrawlerConfig, MatcherConfig, OutputConfig};
pub use keyword::{KeywordSpec, merge_keyword_lists, parse_keyword_list, read_keyword_file};
pub use options::{CrawlOptions, ExtractOptions, SnippetOptions};
pub use record::{PageOutcome, PageRecord, SkipReason, SnippetRecord, KEYWORD_SEPARATOR};
