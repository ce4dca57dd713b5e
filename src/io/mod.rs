//! Shared CSV plumbing: opening an input file for a subscribe connector, and a timestamped
//! line-writer for publish connectors. Every output line is prefixed with a
//! `YYYY-MM-DD HH:MM:SS` local timestamp, per §6.

use crate::error::{FabricError, FabricResult};
use chrono::Local;
use csv::{Reader, ReaderBuilder, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;

/// Opens a CSV reader over `path`, trimming whitespace from every field, matching the
/// reference's `boost::algorithm::trim` pass over each cell.
pub fn open_reader(path: &str) -> FabricResult<Reader<File>> {
    ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| match source.kind() {
            csv::ErrorKind::Io(_) => FabricError::FileNotOpen {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, source.to_string()),
            },
            _ => FabricError::Csv(source),
        })
}

/// An append-on-write CSV publish sink. Writes the header once at construction (truncating any
/// existing file, per the reference's `std::ios::trunc`), and on every `publish` prepends the
/// current local timestamp as the first field.
pub struct PublishSink {
    writer: Option<Writer<File>>,
    path: String,
}

impl PublishSink {
    pub fn create(path: &str, header: &[&str]) -> Self {
        match File::create(path) {
            Ok(file) => {
                let mut writer = WriterBuilder::new().from_writer(file);
                if writer.write_record(header).is_err() {
                    tracing::warn!(path, "failed to write header");
                }
                let _ = writer.flush();
                Self {
                    writer: Some(writer),
                    path: path.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "Cannot open the file!");
                Self {
                    writer: None,
                    path: path.to_string(),
                }
            }
        }
    }

    /// Writes one record, with the current local timestamp automatically prepended as the
    /// first field. A closed/unopenable sink silently drops the record (logged once at
    /// construction already), matching §7's "File not open" handling.
    pub fn publish_fields(&mut self, fields: &[String]) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut record: Vec<String> = Vec::with_capacity(fields.len() + 1);
        record.push(timestamp);
        record.extend(fields.iter().cloned());
        if writer.write_record(&record).is_err() {
            tracing::warn!(path = %self.path, "failed to write record");
        }
        let _ = writer.flush();
    }
}

/// A plain append-on-write line sink with no CSV header, used by the GUI throttle. Truncates
/// any existing file at construction, then appends one timestamped line per tick.
pub struct LineSink {
    file: Option<File>,
    path: String,
}

impl LineSink {
    pub fn create(path: &str) -> Self {
        match File::create(path) {
            Ok(file) => Self {
                file: Some(file),
                path: path.to_string(),
            },
            Err(err) => {
                tracing::warn!(path, error = %err, "Cannot open the file!");
                Self {
                    file: None,
                    path: path.to_string(),
                }
            }
        }
    }

    pub fn publish_line(&mut self, body: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        if writeln!(file, "{timestamp},{body}").is_err() {
            tracing::warn!(path = %self.path, "failed to append line");
        }
    }
}
