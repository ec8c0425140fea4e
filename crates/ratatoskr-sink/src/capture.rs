//! In-memory capture sink for tests.

use std::sync::Mutex;

use crate::EventSink;

/// Sink that buffers records in memory.
///
/// Intended for tests and downstream assertions: write through the façade,
/// then inspect [`records`]. Construct with [`inactive`] to get a sink
/// that reports no destination, for exercising short-circuit paths.
///
/// [`records`]: CaptureSink::records
/// [`inactive`]: CaptureSink::inactive
#[derive(Debug, Default)]
pub struct CaptureSink {
    buffer: Mutex<Vec<u8>>,
    inactive: bool,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture sink that reports inactive. Writes still land in the
    /// buffer, so tests can prove nothing reached it.
    pub fn inactive() -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
            inactive: true,
        }
    }

    /// Captured records, one string per newline-terminated line.
    pub fn records(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.buffer.lock().unwrap().clear();
    }
}

impl EventSink for CaptureSink {
    fn is_active(&self) -> bool {
        !self.inactive
    }

    fn write(&self, record: &[u8]) {
        self.buffer.lock().unwrap().extend_from_slice(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_splits_lines() {
        let sink = CaptureSink::new();
        sink.write(b"{\"event\":\"a\"}\n");
        sink.write(b"{\"event\":\"b\"}\n");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], "{\"event\":\"a\"}");
    }

    #[test]
    fn test_inactive_capture_reports_inactive() {
        let sink = CaptureSink::inactive();
        assert!(!sink.is_active());
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_clear() {
        let sink = CaptureSink::new();
        sink.write(b"{\"event\":\"a\"}\n");
        sink.clear();
        assert!(sink.records().is_empty());
    }
}
