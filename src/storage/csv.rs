//! CSV export of page records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::Result;
use crate::models::PageRecord;
use crate::storage::RecordSink;
use crate::utils::fs::ensure_parent;

const HEADER: [&str; 4] = ["url", "keywords", "hits", "total"];

/// Writes one `url,keywords,hits,total` row per record.
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl CsvSink<File> {
    /// Create (or truncate) a CSV file and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent(path)?;
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Rows written, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, record: &PageRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
