//! Page fetching.
//!
//! The crawler only talks to the network through [`Fetcher`], which keeps
//! traversal testable without a server.

use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, SkipReason};
use crate::utils::http::create_client;
use crate::utils::url::with_cache_buster;

/// A fetched HTTP response, reduced to what scoring needs.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against it
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Raw `Content-Type` header, empty when absent
    pub content_type: String,

    /// Response body; left empty for responses that will not be scored
    pub body: String,
}

impl FetchedPage {
    /// Why this response cannot be scored, if it cannot.
    pub fn rejection(&self) -> Option<SkipReason> {
        if self.status >= 400 {
            return Some(SkipReason::HttpStatus(self.status));
        }
        if !is_text_content(&self.content_type) {
            return Some(SkipReason::NotHtml(self.content_type.clone()));
        }
        None
    }
}

/// Whether a content type is `text/*` or mentions html.
pub fn is_text_content(content_type: &str) -> bool {
    let lower = content_type.trim().to_ascii_lowercase();
    lower.starts_with("text/") || lower.contains("html")
}

/// Source of page content.
pub trait Fetcher {
    /// Fetch `url`. With `fresh`, bypass intermediate caches.
    ///
    /// Error statuses are returned as pages, not errors; only transport
    /// failures are `Err`.
    fn fetch(&self, url: &Url, fresh: bool) -> Result<FetchedPage>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &Url, fresh: bool) -> Result<FetchedPage> {
        (**self).fetch(url, fresh)
    }
}

/// Blocking HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with the configured user agent and timeout.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_client(config)?))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url, fresh: bool) -> Result<FetchedPage> {
        let request = if fresh {
            let busted = with_cache_buster(url, Utc::now().timestamp_millis());
            self.client
                .get(busted)
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache")
        } else {
            self.client.get(url.clone())
        };

        let response = request.send()?;
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let mut page = FetchedPage {
            final_url,
            status,
            content_type,
            body: String::new(),
        };

        if page.rejection().is_none() {
            page.body = response
                .text()
                .map_err(|e| AppError::fetch(url.as_str(), e))?;
        }

        Ok(page)
    }
}

/// In-memory site used by unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub(crate) struct StaticSite {
        pages: HashMap<String, (u16, String, String)>,
        requests: RefCell<Vec<(String, bool)>>,
    }

    impl StaticSite {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn html(self, url: &str, body: &str) -> Self {
            self.page(url, 200, "text/html; charset=utf-8", body)
        }

        pub(crate) fn page(mut self, url: &str, status: u16, content_type: &str, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                (status, content_type.to_string(), body.to_string()),
            );
            self
        }

        /// Every URL fetched so far, robots.txt included.
        pub(crate) fn requested(&self) -> Vec<String> {
            self.requests
                .borrow()
                .iter()
                .map(|(url, _)| url.clone())
                .filter(|url| !url.ends_with("/robots.txt"))
                .collect()
        }

        /// Every request made so far, robots.txt included.
        pub(crate) fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub(crate) fn fresh_requests(&self) -> Vec<String> {
            self.requests
                .borrow()
                .iter()
                .filter(|(_, fresh)| *fresh)
                .map(|(url, _)| url.clone())
                .collect()
        }
    }

    impl Fetcher for StaticSite {
        fn fetch(&self, url: &Url, fresh: bool) -> Result<FetchedPage> {
            self.requests.borrow_mut().push((url.to_string(), fresh));

            let (status, content_type, body) = self
                .pages
                .get(url.as_str())
                .ok_or_else(|| AppError::fetch(url.as_str(), "connection refused"))?;

            let mut page = FetchedPage {
                final_url: url.clone(),
                status: *status,
                content_type: content_type.clone(),
                body: body.clone(),
            };
            if page.rejection().is_some() {
                page.body.clear();
            }
            Ok(page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16, content_type: &str) -> FetchedPage {
        FetchedPage {
            final_url: Url::parse("https://example.com/").unwrap(),
            status,
            content_type: content_type.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_text_content_types() {
        assert!(is_text_content("text/html; charset=utf-8"));
        assert!(is_text_content("text/plain"));
        assert!(is_text_content("application/xhtml+xml"));
        assert!(!is_text_content("application/pdf"));
        assert!(!is_text_content(""));
    }

    #[test]
    fn test_rejection() {
        assert_eq!(page(200, "text/html").rejection(), None);
        assert_eq!(page(304, "text/html").rejection(), None);
        assert_eq!(
            page(404, "text/html").rejection(),
            Some(SkipReason::HttpStatus(404))
        );
        assert_eq!(
            page(200, "image/png").rejection(),
            Some(SkipReason::NotHtml("image/png".into()))
        );
    }
}
