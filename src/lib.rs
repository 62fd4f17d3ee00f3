//! greenscan: crawl company websites and flag sustainability claims.
//!
//! Pages are fetched breadth-first within the seed's domain, reduced to their
//! readable content and scored against a keyword list. Matches can then be
//! inspected in context with [`services::locate_snippets`].

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
