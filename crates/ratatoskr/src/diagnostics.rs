//! Non-failing diagnostics for lifecycle misuse.
//!
//! Span-dependent operations tolerate being called without a span, and
//! `finish` tolerates repeats. Those cases are reported here rather than
//! returned as errors: the channel never fails the caller, and it is
//! injectable so tests can assert on exactly what was reported.

use std::fmt;
use std::sync::Mutex;

/// What the caller did wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misuse {
    /// A span-dependent operation ran on a context with no span bound.
    MissingSpan,
    /// `finish` ran on a span state that had already finished.
    DoubleFinish,
}

/// One misuse report, including the offending call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub misuse: Misuse,
    /// Operation the caller invoked, e.g. `"log_kv"`.
    pub operation: &'static str,
    /// Source file of the call site.
    pub file: &'static str,
    /// Line of the call site.
    pub line: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.misuse {
            Misuse::MissingSpan => write!(
                f,
                "`{}` called with no active span in context at {}:{}",
                self.operation, self.file, self.line
            ),
            Misuse::DoubleFinish => write!(
                f,
                "`{}` called on an already finished span at {}:{}",
                self.operation, self.file, self.line
            ),
        }
    }
}

/// Receiver for misuse diagnostics. Must not fail or panic.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: each diagnostic becomes a `tracing` error event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::error!(operation = diagnostic.operation, "{diagnostic}");
    }
}

/// Sink buffering diagnostics for assertions.
#[derive(Debug, Default)]
pub struct CapturingDiagnostics {
    reports: Mutex<Vec<Diagnostic>>,
}

impl CapturingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far.
    pub fn reports(&self) -> Vec<Diagnostic> {
        self.reports.lock().unwrap().clone()
    }

    /// How many reports carry the given misuse.
    pub fn count_of(&self, misuse: Misuse) -> usize {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.misuse == misuse)
            .count()
    }

    /// Drop everything reported so far.
    pub fn clear(&self) {
        self.reports.lock().unwrap().clear();
    }
}

impl DiagnosticSink for CapturingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.reports.lock().unwrap().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_operation_and_call_site() {
        let diagnostic = Diagnostic {
            misuse: Misuse::MissingSpan,
            operation: "log_kv",
            file: "src/engine.rs",
            line: 42,
        };
        assert_eq!(
            diagnostic.to_string(),
            "`log_kv` called with no active span in context at src/engine.rs:42"
        );

        let diagnostic = Diagnostic {
            misuse: Misuse::DoubleFinish,
            operation: "finish",
            file: "src/engine.rs",
            line: 99,
        };
        assert_eq!(
            diagnostic.to_string(),
            "`finish` called on an already finished span at src/engine.rs:99"
        );
    }

    #[test]
    fn test_capturing_sink_counts_by_misuse() {
        let sink = CapturingDiagnostics::new();
        let report = |misuse| Diagnostic {
            misuse,
            operation: "finish",
            file: "src/lib.rs",
            line: 1,
        };

        sink.report(report(Misuse::DoubleFinish));
        sink.report(report(Misuse::MissingSpan));
        sink.report(report(Misuse::DoubleFinish));

        assert_eq!(sink.count_of(Misuse::DoubleFinish), 2);
        assert_eq!(sink.count_of(Misuse::MissingSpan), 1);
        assert_eq!(sink.reports().len(), 3);

        sink.clear();
        assert!(sink.reports().is_empty());
    }
}
