//! Pipeline entry points used by the CLI.
//!
//! - `run_crawl`: Crawl a site from a seed into a record sink
//! - `run_scan`: Score an explicit URL list
//! - `run_snippets`: Locate matches on one freshly fetched page
//! - `run_validate`: Check configuration and keyword compilation

pub mod crawl;
pub mod inspect;
pub mod scan;
pub mod validate;

pub use crawl::{RunSummary, run_crawl};
pub use inspect::{InspectRequest, PageInspection, run_snippets};
pub use scan::run_scan;
pub use validate::run_validate;
