//! Persistence of crawl results.
//!
//! The crawler itself never writes anything; callers stream its records
//! into one or more [`RecordSink`]s.
//!
//! - [`CsvSink`]: flat export with one row per page
//! - [`PageStore`]: JSON store keyed by URL, so repeated runs update rows

pub mod csv;
pub mod local;

use crate::error::Result;
use crate::models::PageRecord;

pub use self::csv::CsvSink;
pub use self::local::{PageStore, StoreStats};

/// Destination for page records.
pub trait RecordSink {
    /// Accept one record. Implementations may buffer.
    fn write(&mut self, record: &PageRecord) -> Result<()>;

    /// Persist everything accepted so far.
    fn flush(&mut self) -> Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write(&mut self, record: &PageRecord) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: RecordSink> RecordSink for Vec<S> {
    fn write(&mut self, record: &PageRecord) -> Result<()> {
        self.iter_mut().try_for_each(|sink| sink.write(record))
    }

    fn flush(&mut self) -> Result<()> {
        self.iter_mut().try_for_each(RecordSink::flush)
    }
}

/// Records kept in memory, in arrival order.
impl RecordSink for Vec<PageRecord> {
    fn write(&mut self, record: &PageRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
