// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::{AppError, Result};

/// Query parameter appended to force a fresh copy past caches.
pub const CACHE_BUSTER_PARAM: &str = "_gscb";

/// Turn a user-supplied seed into an absolute, fragment-free URL.
///
/// A seed without a scheme gets `https://`. Relative paths are rejected.
///
/// # Examples
/// ```
/// use greenscan::utils::url::normalize_seed;
///
/// let seed = normalize_seed("www.example.com/om-os#team").unwrap();
/// assert_eq!(seed.as_str(), "https://www.example.com/om-os");
/// ```
pub fn normalize_seed(seed: &str) -> Result<Url> {
    let trimmed = seed.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_seed(seed, "seed is empty"));
    }
    if trimmed.starts_with('/') || trimmed.starts_with('.') {
        return Err(AppError::invalid_seed(seed, "relative paths are not accepted"));
    }

    let absolute = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&absolute).map_err(|e| AppError::invalid_seed(seed, e))?;
    if !is_http(&url) {
        return Err(AppError::invalid_seed(
            seed,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::invalid_seed(seed, "missing host"));
    }

    Ok(canonicalize(url))
}

/// Drop the fragment component.
pub fn canonicalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Whether the URL uses http or https.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Copy of `url` with a cache-busting query parameter.
pub fn with_cache_buster(url: &Url, stamp: i64) -> Url {
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair(CACHE_BUSTER_PARAM, &stamp.to_string());
    busted
}

/// The scheme and host a crawl is confined to.
///
/// Subdomains of the host are inside the boundary; the scheme is recorded
/// but links over either http or https are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainBoundary {
    scheme: String,
    host: String,
}

impl DomainBoundary {
    /// Boundary of the seed's authority.
    pub fn of(seed: &Url) -> Option<Self> {
        let host = seed.host_str()?.to_ascii_lowercase();
        Some(Self {
            scheme: seed.scheme().to_string(),
            host,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Origin string (`scheme://host`) of the boundary.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Whether a discovered link may be crawled.
    pub fn contains(&self, url: &Url) -> bool {
        if !is_http(url) {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        host == self.host
            || host
                .strip_suffix(self.host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}
