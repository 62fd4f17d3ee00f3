// src/pipeline/scan.rs

//! Targeted scan pipeline.

use crate::error::{AppError, Result};
use crate::pipeline::crawl::{RunSummary, drain};
use crate::services::{Fetcher, SiteCrawler};
use crate::storage::RecordSink;

/// Score each of `urls` without following links.
///
/// With `fresh`, every page is fetched past intermediate caches.
pub fn run_scan<F: Fetcher>(
    crawler: &SiteCrawler<F>,
    urls: &[String],
    fresh: bool,
    sink: &mut dyn RecordSink,
    checkpoint_every: usize,
) -> Result<RunSummary> {
    if urls.is_empty() {
        return Err(AppError::validation("No URLs to scan"));
    }

    log::info!("Scanning {} URLs", urls.len());

    let scan = crawler.scan(urls);
    let summary = if fresh {
        drain(scan.fresh(), sink, checkpoint_every)?
    } else {
        drain(scan, sink, checkpoint_every)?
    };

    summary.log("Scan");
    Ok(summary)
}
