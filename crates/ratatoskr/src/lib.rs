//! Structured event logging and distributed trace correlation.
//!
//! This crate is the façade host code talks to: emit structured,
//! metadata-rich events and open, annotate, and close trace spans tied to
//! an execution context. Span state serializes to opaque bytes so a trace
//! can continue in another process.
//!
//! - **Metadata**: string-keyed [`Metadata`] with a right-biased deep merge
//! - **Loggable**: the [`Loggable`] capability plus `pair`/`deferred`/`uuid`
//!   helpers
//! - **Context**: immutable [`Context`] carrying the active span and
//!   accumulated metadata
//! - **Logger**: [`EventLogger`] span lifecycle (`start`, `log_kv`,
//!   `set_tag`, `set_err`, `finish`) and the span-state codec
//! - **Events**: `record_event` for one-shot records, `begin_event` /
//!   [`EventInProgress`] for events with a duration
//! - **Diagnostics**: non-failing, injectable reporting for lifecycle
//!   misuse
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use ratatoskr::{Context, EventLogger, Metadata, pair};
//! use ratatoskr_sink::CaptureSink;
//! use ratatoskr_tracer::{BasicTracer, InMemorySpanRecorder};
//!
//! let recorder = Arc::new(InMemorySpanRecorder::new());
//! let sink = Arc::new(CaptureSink::new());
//! let log = EventLogger::new("bitswap")
//!     .with_tracer(Arc::new(BasicTracer::new(recorder.clone())))
//!     .with_sink(sink.clone());
//!
//! let ctx = Context::new().with_loggable(&Metadata::from_iter([("session", "s-1")]));
//! let ctx = log.start(&ctx, "fetch_block");
//! log.log_kv(&ctx, "cid", "Qm1234");
//! log.record_event(&ctx, "block_requested", &[&pair("provider", "peer-a")]);
//! log.finish(&ctx);
//!
//! assert_eq!(recorder.finished_spans().len(), 1);
//! assert_eq!(sink.records().len(), 1);
//! ```

pub mod codec;
pub mod context;
pub mod diagnostics;
pub mod event;
pub mod loggable;
pub mod logger;
pub mod metadata;
pub mod span_recorder;

// Re-export main types
pub use codec::SpanContextError;
pub use context::Context;
pub use diagnostics::{
    CapturingDiagnostics, Diagnostic, DiagnosticSink, Misuse, TracingDiagnostics,
};
pub use event::EventInProgress;
pub use loggable::{Deferred, Loggable, Pair, deferred, pair, uuid};
pub use logger::EventLogger;
pub use metadata::{Metadata, Value};
pub use span_recorder::SinkSpanRecorder;
