//! Event record sinks.
//!
//! The event façade hands every encoded record to an [`EventSink`]; this
//! crate defines that interface and the stock implementations:
//!
//! - **Group**: [`WriterGroup`], fan-out to any number of `io::Write`
//!   destinations, dropping writers that fail
//! - **File**: [`FileSink`], append-only JSONL file in the configured
//!   location
//! - **Capture**: [`CaptureSink`], in-memory buffer for tests
//!
//! # Usage
//!
//! ```rust
//! use ratatoskr_sink::{EventSink, WriterGroup};
//!
//! let group = WriterGroup::new();
//! assert!(!group.is_active());
//!
//! group.add_writer(Vec::new());
//! assert!(group.is_active());
//! group.write(b"{\"event\":\"boot\"}\n");
//! ```

pub mod capture;
pub mod file;
pub mod group;

// Re-export main types
pub use capture::CaptureSink;
pub use file::{FileSink, SinkConfig, SinkError};
pub use group::WriterGroup;

/// Destination for encoded event records.
///
/// Records arrive as complete, newline-terminated byte slices. Delivery is
/// best-effort: `write` must swallow failures after handling them locally
/// and must never panic.
pub trait EventSink: Send + Sync {
    /// Whether the sink currently has anywhere to deliver records.
    ///
    /// Recorders consult this before doing any assembly work, so an
    /// inactive sink makes event recording free.
    fn is_active(&self) -> bool;

    /// Deliver one encoded record.
    fn write(&self, record: &[u8]);
}
