//! Local JSON page store.
//!
//! ## File Layout
//!
//! ```text
//! {
//!   "updated_at": "2026-01-01T12:00:00Z",
//!   "count": 2,
//!   "pages": [ { "url": ..., "keywords": ..., "hits": ..., "total": ... }, ... ]
//! }
//! ```
//!
//! Pages are kept in first-seen order. Writing a record for a URL that is
//! already stored replaces the old row in place.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::PageRecord;
use crate::storage::RecordSink;
use crate::utils::fs::write_atomic;

/// On-disk representation of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    updated_at: DateTime<Utc>,
    count: usize,
    pages: Vec<PageRecord>,
}

/// Aggregate figures over the stored pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Stored pages
    pub pages: usize,

    /// Pages with at least one hit
    pub flagged: usize,

    /// Sum of hits over all pages
    pub hits: usize,
}

/// JSON file of page records keyed by URL.
#[derive(Debug)]
pub struct PageStore {
    path: PathBuf,
    pages: Vec<PageRecord>,
    index: HashMap<String, usize>,
    updated_at: Option<DateTime<Utc>>,
}

impl PageStore {
    /// Open the store at `path`, loading existing rows if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            pages: Vec::new(),
            index: HashMap::new(),
            updated_at: None,
        };

        match std::fs::read(&store.path) {
            Ok(bytes) => {
                let data: StoreData = serde_json::from_slice(&bytes)?;
                store.updated_at = Some(data.updated_at);
                for record in data.pages {
                    store.upsert(record);
                }
                log::debug!(
                    "Loaded {} pages from {}",
                    store.pages.len(),
                    store.path.display()
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::Io(e)),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace the row for `record.url`. Returns `true` for a new URL.
    pub fn upsert(&mut self, record: PageRecord) -> bool {
        match self.index.get(&record.url) {
            Some(&position) => {
                self.pages[position] = record;
                false
            }
            None => {
                self.index.insert(record.url.clone(), self.pages.len());
                self.pages.push(record);
                true
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.index.get(url).map(|&position| &self.pages[position])
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages with at least one hit, most hits first.
    pub fn flagged(&self) -> Vec<&PageRecord> {
        let mut flagged: Vec<&PageRecord> =
            self.pages.iter().filter(|page| page.is_flagged()).collect();
        flagged.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.url.cmp(&b.url)));
        flagged
    }

    /// Time of the last successful save, if any.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            pages: self.pages.len(),
            flagged: self.pages.iter().filter(|page| page.is_flagged()).count(),
            hits: self.pages.iter().map(|page| page.total).sum(),
        }
    }

    /// Write the store to disk atomically.
    pub fn save(&mut self) -> Result<()> {
        let now = Utc::now();
        let data = StoreData {
            updated_at: now,
            count: self.pages.len(),
            pages: self.pages.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&data)?;
        write_atomic(&self.path, &bytes)?;
        self.updated_at = Some(now);

        log::debug!("Saved {} pages to {}", data.count, self.path.display());
        Ok(())
    }
}

impl RecordSink for PageStore {
    fn write(&mut self, record: &PageRecord) -> Result<()> {
        self.upsert(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.save()
    }
}
