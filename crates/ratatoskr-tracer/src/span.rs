//! Span-side types shared between tracer backends and their callers.
//!
//! A span is one unit of work inside a distributed trace. Callers annotate
//! spans through the [`Span`] trait object without knowing which backend is
//! active.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Propagatable identity of a span: the trace it belongs to and its own id
/// within that trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    /// Identifier shared by every span in one distributed trace.
    pub trace_id: Uuid,
    /// Identifier of this span.
    pub span_id: Uuid,
}

impl SpanContext {
    /// Context with nil identifiers, used by inert spans.
    pub fn nil() -> Self {
        Self {
            trace_id: Uuid::nil(),
            span_id: Uuid::nil(),
        }
    }
}

/// Value attached to a span as a tag or as a log field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::String(s) => f.write_str(s),
            TagValue::Int(n) => write!(f, "{n}"),
            TagValue::Float(n) => write!(f, "{n}"),
            TagValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::String(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Int(value.into())
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Int(value.into())
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

/// One timestamped key-value fact logged onto a span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// When the fact was logged.
    pub at: DateTime<Utc>,
    /// Field key.
    pub key: String,
    /// Field value.
    pub value: TagValue,
}

/// Unit of work managed by a tracer backend.
///
/// Spans are shared across threads inside execution contexts, so every
/// method takes `&self`. Calling `finish` more than once is
/// backend-defined; callers are expected to guard against it.
pub trait Span: Send + Sync {
    /// Propagatable identity of this span.
    fn context(&self) -> SpanContext;

    /// Attach or overwrite a key-value tag.
    fn set_tag(&self, key: &str, value: TagValue);

    /// Attach a timestamped key-value fact.
    fn log_kv(&self, key: &str, value: TagValue);

    /// Fix the span's end timestamp and hand it off for recording.
    fn finish(&self);
}

/// Shared handle to a span trait object.
pub type SharedSpan = Arc<dyn Span>;
