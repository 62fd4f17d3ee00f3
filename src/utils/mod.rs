//! Utility functions and helpers.

pub mod fs;
pub mod http;
pub mod url;

pub use self::url::{DomainBoundary, canonicalize, is_http, normalize_seed};
