use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::domain::listing::{ListingRecord, CSV_HEADER};
use crate::services::scraper::ScrapeError;

/// Append-only CSV sink. The filename embeds the run-start timestamp so
/// successive runs never collide; the header is written exactly once, only
/// when the file does not already exist.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: &Path, started_at: &DateTime<Local>) -> Self {
        let filename = format!("listings_{}.csv", started_at.format("%Y-%m-%d_%H-%M-%S"));
        CsvSink {
            path: output_dir.join(filename),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one batch of records: open, append, flush, close. Rows already
    /// written survive any later failure of the same target.
    pub fn append(&self, records: &[ListingRecord]) -> Result<(), ScrapeError> {
        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if write_header {
            writer.write_record(CSV_HEADER)?;
        }
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }
}
