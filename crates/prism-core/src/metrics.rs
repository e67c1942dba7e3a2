//! Per-image throughput records and the append-only sink they go to.
//!
//! Records can be written as human-readable text blocks or as JSON Lines.
//! Both formats can be read back for reporting.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{PipelineError, PipelineResult};

const SEPARATOR: &str = "---------------------------";

/// Metrics record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsFormat {
    /// `Image:` / `Bytes read:` / `Bytes written:` lines plus a separator
    Text,
    /// One JSON object per line
    JsonLines,
}

impl MetricsFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Throughput of one completed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Input file name, e.g. `imagen_007.bmp`
    pub image: String,
    /// Decoded pixel-buffer size
    pub bytes_read: u64,
    /// Sum of the pixel-buffer sizes of every variant written
    pub bytes_written: u64,
}

impl MetricsRecord {
    /// Render the record in the given format, trailing newline included.
    pub fn render(&self, format: MetricsFormat) -> Result<String, serde_json::Error> {
        Ok(match format {
            MetricsFormat::Text => format!(
                "Image: {}\nBytes read: {}\nBytes written: {}\n{}\n",
                self.image, self.bytes_read, self.bytes_written, SEPARATOR
            ),
            MetricsFormat::JsonLines => format!("{}\n", serde_json::to_string(self)?),
        })
    }
}

/// Shared append target for every worker of a session.
///
/// Each `append` writes one whole record while holding the lock, so records
/// from concurrently finishing images never interleave.
pub struct MetricsSink {
    path: PathBuf,
    format: MetricsFormat,
    file: Mutex<File>,
}

impl MetricsSink {
    /// Open (or create) the metrics file in append mode.
    pub fn open(path: &Path, format: MetricsFormat) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, record: &MetricsRecord) -> PipelineResult<()> {
        let to_error = |message: String| PipelineError::Metrics {
            path: self.path.clone(),
            message,
        };
        let text = record
            .render(self.format)
            .map_err(|e| to_error(e.to_string()))?;

        // A poisoned lock only means another append panicked mid-call; the
        // file handle itself is still usable.
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| to_error(e.to_string()))
    }
}

/// Parse metrics content in either format. Incomplete text blocks and
/// unparseable JSON lines are skipped.
pub fn parse_records(content: &str) -> Vec<MetricsRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    let mut image: Option<String> = None;
    let mut bytes_read: Option<u64> = None;
    let mut bytes_written: Option<u64> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('{') {
            match serde_json::from_str::<MetricsRecord>(line) {
                Ok(record) => records.push(record),
                Err(_) => skipped += 1,
            }
        } else if let Some(name) = line.strip_prefix("Image:") {
            if image.is_some() {
                skipped += 1;
            }
            image = Some(name.trim().to_string());
            bytes_read = None;
            bytes_written = None;
        } else if let Some(n) = line.strip_prefix("Bytes read:") {
            bytes_read = n.trim().parse().ok();
        } else if let Some(n) = line.strip_prefix("Bytes written:") {
            bytes_written = n.trim().parse().ok();
        } else if line.chars().all(|c| c == '-') {
            match (image.take(), bytes_read.take(), bytes_written.take()) {
                (Some(image), Some(bytes_read), Some(bytes_written)) => {
                    records.push(MetricsRecord {
                        image,
                        bytes_read,
                        bytes_written,
                    });
                }
                _ => skipped += 1,
            }
        } else {
            skipped += 1;
        }
    }
    if image.is_some() {
        skipped += 1;
    }

    if skipped > 0 {
        tracing::warn!("Skipped {skipped} unparseable metrics entries");
    }
    records
}

/// Read every record from a metrics file.
pub fn read_records(path: &Path) -> io::Result<Vec<MetricsRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_records(&content))
}

/// Aggregate over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    /// Number of records
    pub images: usize,
    /// Sum of bytes read
    pub bytes_read: u64,
    /// Sum of bytes written
    pub bytes_written: u64,
    /// The most recently appended record
    pub last: Option<MetricsRecord>,
}

impl MetricsSummary {
    pub fn from_records(records: &[MetricsRecord]) -> Self {
        Self {
            images: records.len(),
            bytes_read: records.iter().map(|r| r.bytes_read).sum(),
            bytes_written: records.iter().map(|r| r.bytes_written).sum(),
            last: records.last().cloned(),
        }
    }
}
