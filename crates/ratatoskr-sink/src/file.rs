//! File-backed sink appending records to a single JSONL file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::EventSink;

/// Error type for file sink operations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the file sink.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Full path to the event file (e.g., `events/engine.jsonl`).
    pub path: PathBuf,

    /// Whether the sink accepts records at all.
    pub enabled: bool,
}

impl SinkConfig {
    /// Config writing to the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
        }
    }

    /// Config that drops everything.
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
        }
    }
}

/// Appends event records to a JSONL file.
///
/// Thread-safe via internal mutex. Records are written verbatim; the
/// recorder already terminates each one with a newline. Write failures are
/// logged and swallowed, per the sink contract.
pub struct FileSink {
    config: SinkConfig,
    file: Mutex<Option<BufWriter<File>>>,
}

impl FileSink {
    /// Create a file sink with the given configuration.
    ///
    /// Parent directories are created up front; the file itself is opened
    /// lazily on the first record.
    pub fn new(config: SinkConfig) -> Result<Self, SinkError> {
        if config.enabled {
            if let Some(parent) = config.path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            config,
            file: Mutex::new(None),
        })
    }

    /// Path the sink writes to.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn append(&self, record: &[u8]) -> Result<(), SinkError> {
        let mut guard = self.file.lock().unwrap();

        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.config.path)?;
            *guard = Some(BufWriter::new(file));
        }

        if let Some(ref mut writer) = *guard {
            writer.write_all(record)?;
            writer.flush()?;
        }

        Ok(())
    }

    /// Read all records from an event file, one JSON value per line.
    pub fn read_records(path: &Path) -> Result<Vec<serde_json::Value>, SinkError> {
        let content = fs::read_to_string(path)?;
        let records: Result<Vec<serde_json::Value>, _> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect();
        Ok(records?)
    }
}

impl EventSink for FileSink {
    fn is_active(&self) -> bool {
        self.config.enabled
    }

    fn write(&self, record: &[u8]) {
        if !self.config.enabled {
            return;
        }
        if let Err(e) = self.append(record) {
            tracing::warn!(error = %e, path = %self.config.path.display(), "failed to append event record");
        }
    }
}
