//! In-memory recording tracer.
//!
//! `BasicTracer` is the concrete backend used by tests and demos. Spans
//! buffer their annotations while open and hand a [`FinishedSpan`] to a
//! [`SpanRecorder`] exactly once when finished. Carrier bytes are the JSON
//! encoding of [`SpanContext`]; callers treat them as opaque.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::span::{LogEntry, SharedSpan, Span, SpanContext, TagValue};
use crate::tracer::{PropagationError, SpanOptions, Tracer};

/// Complete record of one finished span.
#[derive(Debug, Clone, Serialize)]
pub struct FinishedSpan {
    /// Name the span was started with.
    pub operation_name: String,
    /// Identity of the span.
    pub context: SpanContext,
    /// Span id of the parent, if the span was started as a child.
    pub parent_span_id: Option<Uuid>,
    /// Tags attached over the span's lifetime. Last write per key wins.
    pub tags: BTreeMap<String, TagValue>,
    /// Timestamped log facts in arrival order.
    pub logs: Vec<LogEntry>,
    /// When the span started.
    pub started_at: DateTime<Utc>,
    /// When the span finished.
    pub finished_at: DateTime<Utc>,
}

impl FinishedSpan {
    /// Value of a tag, if present.
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    /// Values logged under `key`, in arrival order.
    pub fn logged_values(&self, key: &str) -> Vec<&TagValue> {
        self.logs
            .iter()
            .filter(|entry| entry.key == key)
            .map(|entry| &entry.value)
            .collect()
    }
}

/// Receiver for finished spans.
pub trait SpanRecorder: Send + Sync {
    /// Accept one finished span.
    fn record_span(&self, span: &FinishedSpan);
}

/// Recorder that buffers finished spans in memory.
///
/// This is the backend integration tests inspect: start spans through a
/// [`BasicTracer`], then assert on [`finished_spans`].
///
/// [`finished_spans`]: InMemorySpanRecorder::finished_spans
#[derive(Debug, Default)]
pub struct InMemorySpanRecorder {
    spans: Mutex<Vec<FinishedSpan>>,
}

impl InMemorySpanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn finished_spans(&self) -> Vec<FinishedSpan> {
        self.spans.lock().unwrap().clone()
    }

    /// Number of spans recorded so far.
    pub fn span_count(&self) -> usize {
        self.spans.lock().unwrap().len()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.spans.lock().unwrap().clear();
    }
}

impl SpanRecorder for InMemorySpanRecorder {
    fn record_span(&self, span: &FinishedSpan) {
        self.spans.lock().unwrap().push(span.clone());
    }
}

/// Recording tracer: fresh v4 identifiers, JSON byte carrier.
///
/// Root spans open a new trace id; children inherit the parent's.
pub struct BasicTracer {
    recorder: Arc<dyn SpanRecorder>,
}

impl BasicTracer {
    pub fn new(recorder: Arc<dyn SpanRecorder>) -> Self {
        Self { recorder }
    }
}

impl Tracer for BasicTracer {
    fn start_span(&self, operation_name: &str, options: SpanOptions) -> SharedSpan {
        let parent = options.child_of;
        let context = SpanContext {
            trace_id: parent
                .map(|p| p.trace_id)
                .unwrap_or_else(Uuid::new_v4),
            span_id: Uuid::new_v4(),
        };

        let mut tags = BTreeMap::new();
        for (key, value) in options.tags {
            tags.insert(key, value);
        }

        Arc::new(BasicSpan {
            context,
            recorder: Arc::clone(&self.recorder),
            buffer: Mutex::new(SpanBuffer {
                operation_name: operation_name.to_string(),
                parent_span_id: parent.map(|p| p.span_id),
                tags,
                logs: Vec::new(),
                started_at: Utc::now(),
                finished: false,
            }),
        })
    }

    fn inject(&self, context: &SpanContext) -> Result<Vec<u8>, PropagationError> {
        Ok(serde_json::to_vec(context)?)
    }

    fn extract(&self, carrier: &[u8]) -> Result<SpanContext, PropagationError> {
        if carrier.is_empty() {
            return Err(PropagationError::SpanContextNotFound);
        }
        Ok(serde_json::from_slice(carrier)?)
    }
}

struct BasicSpan {
    context: SpanContext,
    recorder: Arc<dyn SpanRecorder>,
    buffer: Mutex<SpanBuffer>,
}

struct SpanBuffer {
    operation_name: String,
    parent_span_id: Option<Uuid>,
    tags: BTreeMap<String, TagValue>,
    logs: Vec<LogEntry>,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl Span for BasicSpan {
    fn context(&self) -> SpanContext {
        self.context
    }

    fn set_tag(&self, key: &str, value: TagValue) {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.tags.insert(key.to_string(), value);
    }

    fn log_kv(&self, key: &str, value: TagValue) {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.logs.push(LogEntry {
            at: Utc::now(),
            key: key.to_string(),
            value,
        });
    }

    fn finish(&self) {
        let finished = {
            let mut buffer = self.buffer.lock().unwrap();
            if buffer.finished {
                return;
            }
            buffer.finished = true;
            FinishedSpan {
                operation_name: buffer.operation_name.clone(),
                context: self.context,
                parent_span_id: buffer.parent_span_id,
                tags: buffer.tags.clone(),
                logs: buffer.logs.clone(),
                started_at: buffer.started_at,
                finished_at: Utc::now(),
            }
        };
        // Buffer lock released before the recorder runs.
        self.recorder.record_span(&finished);
    }
}
