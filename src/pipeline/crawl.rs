// src/pipeline/crawl.rs

//! Site crawl pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::models::PageOutcome;
use crate::services::{Fetcher, SiteCrawler};
use crate::services::scoring::compare_keys;
use crate::storage::RecordSink;

/// Log a progress line every this many visited pages.
const PROGRESS_EVERY: usize = 25;

/// Keywords listed in a run summary.
const TOP_KEYWORDS: usize = 10;

/// Figures for a finished crawl or scan.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    /// Pages fetched and scored
    pub scored: usize,

    /// URLs that produced no record
    pub skipped: usize,

    /// Scored pages with at least one hit
    pub flagged: usize,

    /// Sum of hits over all scored pages
    pub hits: usize,

    /// Flagged pages per keyword, most frequent first
    pub top_keywords: Vec<(String, usize)>,
}

impl RunSummary {
    pub fn elapsed(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Log the summary at info level.
    pub fn log(&self, title: &str) {
        let elapsed = self.elapsed();
        log::info!(
            "{} finished in {}.{:03}s",
            title,
            elapsed.num_seconds(),
            elapsed.num_milliseconds() % 1000
        );
        log::info!("  Pages scored:  {}", self.scored);
        log::info!("  Pages skipped: {}", self.skipped);
        log::info!("  Pages flagged: {} ({} hits)", self.flagged, self.hits);
        for (keyword, pages) in &self.top_keywords {
            log::info!("    {}: {} pages", keyword, pages);
        }
    }
}

/// Running totals while outcomes stream past.
#[derive(Default)]
struct Tally {
    scored: usize,
    skipped: usize,
    flagged: usize,
    hits: usize,
    keyword_pages: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Scored(record) => {
                self.scored += 1;
                self.hits += record.total;
                if record.is_flagged() {
                    self.flagged += 1;
                }
                for keyword in record.keyword_list() {
                    *self.keyword_pages.entry(keyword.to_string()).or_insert(0) += 1;
                }
            }
            PageOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    fn finish(self, start_time: DateTime<Utc>) -> RunSummary {
        let mut top_keywords: Vec<(String, usize)> = self.keyword_pages.into_iter().collect();
        top_keywords.sort_by(|(ka, a), (kb, b)| b.cmp(a).then_with(|| compare_keys(ka, kb)));
        top_keywords.truncate(TOP_KEYWORDS);

        RunSummary {
            start_time,
            end_time: Utc::now(),
            scored: self.scored,
            skipped: self.skipped,
            flagged: self.flagged,
            hits: self.hits,
            top_keywords,
        }
    }
}

/// Stream outcomes into `sink`, flushing every `checkpoint_every` records
/// and once at the end.
pub(crate) fn drain<I>(
    outcomes: I,
    sink: &mut dyn RecordSink,
    checkpoint_every: usize,
) -> Result<RunSummary>
where
    I: Iterator<Item = PageOutcome>,
{
    let start_time = Utc::now();
    let mut tally = Tally::default();

    for outcome in outcomes {
        tally.add(&outcome);

        if let PageOutcome::Scored(record) = &outcome {
            sink.write(record)?;
            if checkpoint_every > 0 && tally.scored % checkpoint_every == 0 {
                sink.flush()?;
                log::debug!("Checkpoint after {} records", tally.scored);
            }
        }
    }

    sink.flush()?;
    Ok(tally.finish(start_time))
}

/// Crawl a site from `seed` and stream every scored page into `sink`.
///
/// Only an unusable seed or a failing sink is an error.
pub fn run_crawl<F: Fetcher>(
    crawler: &SiteCrawler<F>,
    seed: &str,
    sink: &mut dyn RecordSink,
    checkpoint_every: usize,
) -> Result<RunSummary> {
    let mut last_logged = 0;
    let crawl = crawler.crawl(seed)?.on_progress(move |progress| {
        if progress.completed != last_logged && progress.completed % PROGRESS_EVERY == 0 {
            last_logged = progress.completed;
            log::info!(
                "Progress: {} pages visited, {} queued",
                progress.completed,
                progress.queued
            );
        }
    });

    let summary = drain(crawl, sink, checkpoint_every)?;
    summary.log("Crawl");
    Ok(summary)
}
