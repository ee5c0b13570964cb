//! Log sinks for experiment records.
//!
//! Every line starts with the onset time and its latency, followed by the
//! record's own tab-separated fields.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};

use mathdistract_core::model::Timestamp;
use mathdistract_core::record::LogRecord;
use mathdistract_core::traits::Logger;

fn format_line(at: Timestamp, record: &LogRecord) -> String {
    format!("{}\t{}\t{}", at.ms, at.max_latency_ms, record)
}

/// Appends records to a text file, flushing after each one.
#[derive(Debug)]
pub struct TextLogFile {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl TextLogFile {
    /// Create (or truncate) the log at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Logger for TextLogFile {
    fn log(&self, at: Timestamp, record: &LogRecord) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", format_line(at, record))
            .and_then(|_| writer.flush())
            .with_context(|| format!("failed to write to {}", self.path.display()))
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Timestamp, LogRecord)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Timestamp, LogRecord)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries formatted as they would appear in a log file.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(at, record)| format_line(*at, record))
            .collect()
    }

    /// Entries of one kind, e.g. `"PROB"`.
    pub fn of_kind(&self, kind: &str) -> Vec<(Timestamp, LogRecord)> {
        self.entries()
            .into_iter()
            .filter(|(_, record)| record.kind() == kind)
            .collect()
    }
}

impl Logger for MemoryLog {
    fn log(&self, at: Timestamp, record: &LogRecord) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((at, record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_lines_carry_time_and_latency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("math.log");
        let log = TextLogFile::create(&path).unwrap();
        log.log(Timestamp::at(0), &LogRecord::MathStart { trial: 2 })
            .unwrap();
        log.log(
            Timestamp {
                ms: 10_000,
                max_latency_ms: 3,
            },
            &LogRecord::MathEnd { trial: 2 },
        )
        .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![
            "0\t0\tMATH START\t2\t\t\t\t\t",
            "10000\t3\tMATH END\t2\t\t\t\t\t",
        ]);
    }

    #[test]
    fn memory_log_filters_by_kind() {
        let log = MemoryLog::new();
        log.log(Timestamp::at(0), &LogRecord::MathStart { trial: 0 })
            .unwrap();
        log.log(Timestamp::at(5), &LogRecord::Rest { trial: 0 }).unwrap();
        assert_eq!(log.of_kind("REST").len(), 1);
        assert_eq!(log.lines()[1], "5\t0\tREST\t0\t\t\t\t\t");
    }
}
