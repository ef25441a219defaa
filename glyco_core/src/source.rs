//! File-backed data collaborators.
//!
//! Day events and body-stat records live in JSON Lines files under a data
//! directory:
//!
//! ```text
//! <data_dir>/events/2024-05-01.jsonl
//! <data_dir>/body_stats.jsonl
//! ```
//!
//! Reads take a shared lock and appends an exclusive one, so the CLI can be
//! run while another process is writing.

use crate::time::format_query_date;
use crate::{BodyStatRecord, ClassifiedEntry, Error, Result, WireEvent};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Supplies a day's events and a week's body-stat records
pub trait DaySource {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<WireEvent>>;
    fn fetch_body_stats(&self, start: NaiveDate) -> Result<Vec<BodyStatRecord>>;
}

/// Persists body-stat records
pub trait RecordSink {
    fn append(&mut self, record: &BodyStatRecord) -> Result<()>;
}

/// JSON Lines source rooted at a data directory
#[derive(Clone, Debug)]
pub struct JsonlSource {
    root: PathBuf,
}

impl JsonlSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join("events")
            .join(format!("{}.jsonl", format_query_date(date)))
    }

    pub fn body_stats_path(&self) -> PathBuf {
        self.root.join("body_stats.jsonl")
    }
}

impl DaySource for JsonlSource {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<WireEvent>> {
        let path = self.day_path(date);
        if !path.exists() {
            tracing::debug!("No events file for {} at {:?}", date, path);
            return Ok(Vec::new());
        }
        read_jsonl(&path)
    }

    fn fetch_body_stats(&self, start: NaiveDate) -> Result<Vec<BodyStatRecord>> {
        let from = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .ok_or_else(|| Error::Source(format!("invalid week start {}", start)))?;
        let until = from + Duration::days(7).num_milliseconds();

        let records: Vec<BodyStatRecord> = read_jsonl(&self.body_stats_path())?;
        let total = records.len();
        let in_week: Vec<_> = records
            .into_iter()
            .filter(|r| from <= r.epoch && r.epoch < until)
            .collect();

        tracing::debug!(
            "{} of {} body-stat records fall in the week of {}",
            in_week.len(),
            total,
            start
        );
        Ok(in_week)
    }
}

/// Appends body-stat records to a JSON Lines file
pub struct JsonlRecordSink {
    path: PathBuf,
}

impl JsonlRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl RecordSink for JsonlRecordSink {
    fn append(&mut self, record: &BodyStatRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {} record to {:?}", record.metric_type, self.path);
        Ok(())
    }
}

/// Turn a classified entry into a record stamped at `at`
pub fn record_from_entry(entry: &ClassifiedEntry, at: DateTime<Utc>) -> BodyStatRecord {
    BodyStatRecord {
        metric_type: entry.entry.canonical_name.clone(),
        value: entry.value.clone(),
        comment: entry.comment.clone(),
        epoch: at.timestamp_millis(),
    }
}

/// Read every parseable line of a JSON Lines file; a missing file is empty
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut items = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {:?} at line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from {:?}", items.len(), path);
    Ok(items)
}
