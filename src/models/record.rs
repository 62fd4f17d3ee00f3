//! Per-page output records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used when keyword names are joined for storage.
pub const KEYWORD_SEPARATOR: &str = ", ";

/// Match result for one crawled or scanned page.
///
/// `hits` and `total` always carry the same value: both are the number of
/// surviving pattern occurrences on the page. Downstream tables expect both
/// columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRecord {
    /// Canonical page URL without fragment
    pub url: String,

    /// Matched keyword specifications, comma-joined
    pub keywords: String,

    /// Occurrence count
    pub hits: usize,

    /// Occurrence count (same as `hits`)
    pub total: usize,
}

impl PageRecord {
    /// Build a record from a URL and the sorted list of matched keywords.
    pub fn new(url: impl Into<String>, keywords: &[String], total: usize) -> Self {
        Self {
            url: url.into(),
            keywords: keywords.join(KEYWORD_SEPARATOR),
            hits: total,
            total,
        }
    }

    /// Split the stored keyword column back into names.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(KEYWORD_SEPARATOR)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Whether at least one keyword matched.
    pub fn is_flagged(&self) -> bool {
        self.total > 0
    }
}

/// A located keyword match with surrounding context, produced on demand.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SnippetRecord {
    /// Keyword specification that matched
    pub keyword: String,

    /// Name of the element the match was found in
    pub tag: String,

    /// Matched text plus context on both sides
    pub snippet: String,

    /// Character offset of the match within the element text
    pub start: usize,

    /// Character offset just past the match within the element text
    pub end: usize,
}

/// Why a URL produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Network, timeout or body decoding failure
    Fetch(String),

    /// Server answered with an error status
    HttpStatus(u16),

    /// Response was not an HTML or text document
    NotHtml(String),

    /// Excluded by the site's robots.txt
    RobotsDisallowed,

    /// Input could not be turned into an absolute http(s) URL
    InvalidUrl(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(message) => write!(f, "fetch failed: {message}"),
            Self::HttpStatus(status) => write!(f, "HTTP status {status}"),
            Self::NotHtml(content_type) if content_type.is_empty() => {
                write!(f, "missing content type")
            }
            Self::NotHtml(content_type) => write!(f, "unsupported content type {content_type}"),
            Self::RobotsDisallowed => write!(f, "disallowed by robots.txt"),
            Self::InvalidUrl(message) => write!(f, "invalid URL: {message}"),
        }
    }
}

/// Outcome of processing a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page was fetched and scored
    Scored(PageRecord),

    /// Page was abandoned
    Skipped { url: String, reason: SkipReason },
}

impl PageOutcome {
    /// URL this outcome refers to.
    pub fn url(&self) -> &str {
        match self {
            Self::Scored(record) => &record.url,
            Self::Skipped { url, .. } => url,
        }
    }

    /// The record, if the page was scored.
    pub fn record(&self) -> Option<&PageRecord> {
        match self {
            Self::Scored(record) => Some(record),
            Self::Skipped { .. } => None,
        }
    }

    /// Consume the outcome, keeping only a scored record.
    pub fn into_record(self) -> Option<PageRecord> {
        match self {
            Self::Scored(record) => Some(record),
            Self::Skipped { .. } => None,
        }
    }
}
