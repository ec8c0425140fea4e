//! Distributed tracing backend surface.
//!
//! This crate defines the narrow interface the event façade consumes and one
//! concrete backend for tests and demos:
//!
//! - **Span**: the [`Span`] trait plus [`SpanContext`], [`TagValue`], and
//!   [`LogEntry`]
//! - **Tracer**: the [`Tracer`] trait, [`SpanOptions`], carrier errors, and
//!   the process-wide registry ([`set_global_tracer`] / [`global_tracer`])
//! - **Basic**: [`BasicTracer`], an in-memory recording backend with a JSON
//!   byte carrier
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use ratatoskr_tracer::{BasicTracer, InMemorySpanRecorder, SpanOptions, Tracer};
//!
//! let recorder = Arc::new(InMemorySpanRecorder::new());
//! let tracer = BasicTracer::new(recorder.clone());
//!
//! let span = tracer.start_span("fetch_block", SpanOptions::root());
//! span.set_tag("system", "engine".into());
//! span.finish();
//!
//! assert_eq!(recorder.finished_spans()[0].operation_name, "fetch_block");
//! ```

pub mod basic;
pub mod span;
pub mod tracer;

// Re-export main types
pub use basic::{BasicTracer, FinishedSpan, InMemorySpanRecorder, SpanRecorder};
pub use span::{LogEntry, SharedSpan, Span, SpanContext, TagValue};
pub use tracer::{
    NoopTracer, PropagationError, SharedTracer, SpanOptions, Tracer, global_tracer,
    set_global_tracer,
};
