//! Site crawling.
//!
//! [`SiteCrawler::crawl`] walks a site breadth-first from a seed and yields
//! one [`PageOutcome`] per visited URL as soon as the page is scored. The
//! walk is lazy: nothing is fetched until the iterator is advanced, and
//! dropping it stops the crawl.

use std::collections::{HashSet, VecDeque};
use std::thread;

use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlOptions, PageOutcome, PageRecord, SkipReason};
use crate::services::extract::{document_links, document_text};
use crate::services::fetcher::{Fetcher, HttpFetcher};
use crate::services::robots::RobotsRules;
use crate::services::{PatternSet, score};
use crate::utils::url::{DomainBoundary, canonicalize, normalize_seed};

/// Counters handed to the progress callback after every dequeue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Distinct URLs visited so far
    pub completed: usize,

    /// URLs waiting in the frontier
    pub queued: usize,
}

/// A URL waiting to be visited.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierEntry {
    url: Url,
    depth: usize,
}

/// Result of fetching and scoring one URL.
struct Visit {
    outcome: PageOutcome,
    links: Vec<Url>,
}

impl Visit {
    fn skipped(url: &Url, reason: SkipReason) -> Self {
        Self {
            outcome: PageOutcome::Skipped {
                url: url.to_string(),
                reason,
            },
            links: Vec::new(),
        }
    }
}

/// Crawls sites and scores their pages against a keyword set.
pub struct SiteCrawler<F: Fetcher = HttpFetcher> {
    fetcher: F,
    patterns: PatternSet,
    exclude: Option<PatternSet>,
    options: CrawlOptions,
    user_agent: String,
}

impl<F: Fetcher> SiteCrawler<F> {
    pub fn new(fetcher: F, patterns: PatternSet, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            patterns,
            exclude: None,
            options,
            user_agent: "*".to_string(),
        }
    }

    /// Drop matches whose text is also matched by `exclude`.
    pub fn with_exclusions(mut self, exclude: PatternSet) -> Self {
        self.exclude = (!exclude.is_empty()).then_some(exclude);
        self
    }

    /// User agent used to pick the robots.txt group.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn exclusions(&self) -> Option<&PatternSet> {
        self.exclude.as_ref()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Start a breadth-first crawl from `seed`.
    ///
    /// Fails only when the seed cannot be turned into an absolute http(s)
    /// URL. Everything that goes wrong afterwards is reported per page.
    pub fn crawl(&self, seed: &str) -> Result<Crawl<'_, F>> {
        let seed = normalize_seed(seed)?;
        let boundary = DomainBoundary::of(&seed)
            .ok_or_else(|| AppError::invalid_seed(seed.as_str(), "missing host"))?;

        log::info!(
            "Crawling {} (max {} pages, depth {})",
            seed,
            self.options.max_pages,
            self.options.max_depth
        );

        let mut crawl = Crawl {
            crawler: self,
            boundary,
            frontier: VecDeque::new(),
            pending: HashSet::new(),
            visited: HashSet::new(),
            robots: None,
            started: false,
            progress: None,
            fetched_before: false,
        };
        crawl.pending.insert(seed.to_string());
        crawl.frontier.push_back(FrontierEntry {
            url: seed,
            depth: 0,
        });

        Ok(crawl)
    }

    /// Score an explicit list of URLs without following links.
    pub fn scan<I>(&self, urls: I) -> Scan<'_, F, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Scan {
            crawler: self,
            urls: urls.into_iter(),
            fresh: false,
            fetched_before: false,
        }
    }

    /// Re-fetch a single URL past any caches and score it.
    pub fn refresh(&self, url: &str) -> PageOutcome {
        match normalize_seed(url) {
            Ok(url) => self.visit(&url, true, false).outcome,
            Err(e) => PageOutcome::Skipped {
                url: url.to_string(),
                reason: SkipReason::InvalidUrl(e.to_string()),
            },
        }
    }

    /// Fetch, extract and score one page. Links are only collected when
    /// `with_links` is set.
    fn visit(&self, url: &Url, fresh: bool, with_links: bool) -> Visit {
        let page = match self.fetcher.fetch(url, fresh) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", url, e);
                return Visit::skipped(url, SkipReason::Fetch(e.to_string()));
            }
        };

        if let Some(reason) = page.rejection() {
            log::debug!("Skipping {}: {}", url, reason);
            return Visit::skipped(url, reason);
        }

        let document = Html::parse_document(&page.body);
        let text = document_text(&document, &self.options.extraction);
        let summary = score(&text, &self.patterns, self.exclude.as_ref());

        if summary.total > 0 {
            log::debug!("{}: {} hits ({})", url, summary.total, summary.keywords.join(", "));
        }

        let links = if with_links {
            document_links(&document, &page.final_url)
        } else {
            Vec::new()
        };

        Visit {
            outcome: PageOutcome::Scored(PageRecord::new(
                url.as_str(),
                &summary.keywords,
                summary.total,
            )),
            links,
        }
    }

    fn pause(&self) {
        if !self.options.delay.is_zero() {
            thread::sleep(self.options.delay);
        }
    }
}

/// A running breadth-first crawl.
///
/// Each call to `next` dequeues URLs until one is visited, then returns its
/// outcome. The delay between fetches is taken before the following fetch,
/// so every outcome reaches the caller as soon as it exists.
pub struct Crawl<'a, F: Fetcher> {
    crawler: &'a SiteCrawler<F>,
    boundary: DomainBoundary,
    frontier: VecDeque<FrontierEntry>,
    pending: HashSet<String>,
    visited: HashSet<String>,
    robots: Option<RobotsRules>,
    started: bool,
    progress: Option<Box<dyn FnMut(CrawlProgress) + 'a>>,
    fetched_before: bool,
}

impl<'a, F: Fetcher> Crawl<'a, F> {
    /// Call `callback` with `(completed, queued)` after every dequeue.
    pub fn on_progress(mut self, callback: impl FnMut(CrawlProgress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Only the scored pages.
    pub fn records(self) -> impl Iterator<Item = PageRecord> {
        self.filter_map(PageOutcome::into_record)
    }

    /// Number of distinct URLs visited so far.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs waiting to be visited.
    pub fn queued(&self) -> usize {
        self.frontier.len()
    }

    fn report_progress(&mut self) {
        let progress = CrawlProgress {
            completed: self.visited.len(),
            queued: self.frontier.len(),
        };
        if let Some(callback) = self.progress.as_mut() {
            callback(progress);
        }
    }

    /// Load robots.txt for the seed's origin when the crawl opts in. Returns
    /// the seed's outcome when robots.txt disallows it, ending the crawl.
    fn load_robots(&mut self) -> Option<PageOutcome> {
        if !self.crawler.options.respect_robots {
            return None;
        }
        let seed = self.frontier.front()?.url.clone();
        let robots = RobotsRules::fetch(&self.crawler.fetcher, &seed, &self.crawler.user_agent);
        let allowed = robots.is_allowed(&seed);
        self.robots = Some(robots);
        if allowed {
            return None;
        }

        log::warn!("Seed {} is disallowed by robots.txt", seed);
        self.frontier.clear();
        self.pending.clear();
        Some(PageOutcome::Skipped {
            url: seed.to_string(),
            reason: SkipReason::RobotsDisallowed,
        })
    }

    fn enqueue(&mut self, link: Url, depth: usize) {
        let link = canonicalize(link);
        if !self.boundary.contains(&link) {
            return;
        }
        let key = link.as_str();
        if self.visited.contains(key) || self.pending.contains(key) {
            return;
        }
        if let Some(robots) = &self.robots {
            if !robots.is_allowed(&link) {
                log::debug!("Disallowed by robots.txt: {}", link);
                return;
            }
        }

        self.pending.insert(link.to_string());
        self.frontier.push_back(FrontierEntry { url: link, depth });
    }
}

impl<F: Fetcher> Iterator for Crawl<'_, F> {
    type Item = PageOutcome;

    fn next(&mut self) -> Option<PageOutcome> {
        if !self.started {
            self.started = true;
            if let Some(outcome) = self.load_robots() {
                return Some(outcome);
            }
        }

        let max_depth = self.crawler.options.max_depth;

        while self.visited.len() < self.crawler.options.max_pages {
            let entry = self.frontier.pop_front()?;
            self.pending.remove(entry.url.as_str());

            if entry.depth > max_depth || self.visited.contains(entry.url.as_str()) {
                self.report_progress();
                continue;
            }

            if self.fetched_before {
                self.crawler.pause();
            }
            self.fetched_before = true;
            self.visited.insert(entry.url.to_string());

            let visit = self.crawler.visit(&entry.url, false, entry.depth < max_depth);
            for link in visit.links {
                self.enqueue(link, entry.depth + 1);
            }

            self.report_progress();
            return Some(visit.outcome);
        }

        None
    }
}

/// Scoring of an explicit URL list.
pub struct Scan<'a, F: Fetcher, I> {
    crawler: &'a SiteCrawler<F>,
    urls: I,
    fresh: bool,
    fetched_before: bool,
}

impl<F: Fetcher, I> Scan<'_, F, I> {
    /// Bypass caches for every URL in the scan.
    pub fn fresh(mut self) -> Self {
        self.fresh = true;
        self
    }
}

impl<F, I> Iterator for Scan<'_, F, I>
where
    F: Fetcher,
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = PageOutcome;

    fn next(&mut self) -> Option<PageOutcome> {
        let item = self.urls.next()?;
        let raw: &str = item.as_ref();

        let url = match normalize_seed(raw) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Skipping {}: {}", raw, e);
                return Some(PageOutcome::Skipped {
                    url: raw.to_string(),
                    reason: SkipReason::InvalidUrl(e.to_string()),
                });
            }
        };

        if self.fetched_before {
            self.crawler.pause();
        }
        self.fetched_before = true;

        Some(self.crawler.visit(&url, self.fresh, false).outcome)
    }
}
