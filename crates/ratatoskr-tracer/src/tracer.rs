//! Tracer trait, span start options, carrier errors, and the process-wide
//! tracer registry.

use std::sync::{Arc, LazyLock, RwLock};

use thiserror::Error;

use crate::span::{SharedSpan, Span, SpanContext, TagValue};

/// Options applied when a span is started.
#[derive(Debug, Clone, Default)]
pub struct SpanOptions {
    /// Parent to link the new span under, if any.
    pub child_of: Option<SpanContext>,
    /// Tags applied at start time.
    pub tags: Vec<(String, TagValue)>,
}

impl SpanOptions {
    /// Options for a root span with no parent.
    pub fn root() -> Self {
        Self::default()
    }

    /// Options for a span parented under `parent`.
    pub fn child_of(parent: SpanContext) -> Self {
        Self {
            child_of: Some(parent),
            tags: Vec::new(),
        }
    }

    /// Add a tag applied when the span starts.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }
}

/// Errors surfaced by carrier injection and extraction.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// The carrier held no span context at all.
    #[error("no span context found in carrier")]
    SpanContextNotFound,

    /// The carrier bytes could not be decoded as a span context.
    #[error("span context corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Backend capable of creating spans and of moving span identity across
/// process boundaries through an opaque binary carrier.
pub trait Tracer: Send + Sync {
    /// Start a new span named `operation_name`.
    fn start_span(&self, operation_name: &str, options: SpanOptions) -> SharedSpan;

    /// Encode `context` into an opaque byte carrier.
    fn inject(&self, context: &SpanContext) -> Result<Vec<u8>, PropagationError>;

    /// Decode a span context from a byte carrier produced by [`inject`].
    ///
    /// [`inject`]: Tracer::inject
    fn extract(&self, carrier: &[u8]) -> Result<SpanContext, PropagationError>;
}

/// Shared handle to a tracer trait object.
pub type SharedTracer = Arc<dyn Tracer>;

/// Tracer that discards everything. The registry default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

struct NoopSpan;

impl Span for NoopSpan {
    fn context(&self) -> SpanContext {
        SpanContext::nil()
    }

    fn set_tag(&self, _key: &str, _value: TagValue) {}

    fn log_kv(&self, _key: &str, _value: TagValue) {}

    fn finish(&self) {}
}

impl Tracer for NoopTracer {
    fn start_span(&self, _operation_name: &str, _options: SpanOptions) -> SharedSpan {
        Arc::new(NoopSpan)
    }

    fn inject(&self, _context: &SpanContext) -> Result<Vec<u8>, PropagationError> {
        Ok(Vec::new())
    }

    fn extract(&self, _carrier: &[u8]) -> Result<SpanContext, PropagationError> {
        Err(PropagationError::SpanContextNotFound)
    }
}

static GLOBAL_TRACER: LazyLock<RwLock<SharedTracer>> =
    LazyLock::new(|| RwLock::new(Arc::new(NoopTracer)));

/// Install the process-wide tracer returned by [`global_tracer`].
pub fn set_global_tracer(tracer: SharedTracer) {
    *GLOBAL_TRACER.write().unwrap() = tracer;
}

/// Current process-wide tracer. A no-op tracer until one is installed.
pub fn global_tracer() -> SharedTracer {
    GLOBAL_TRACER.read().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_span_is_inert() {
        let tracer = NoopTracer;
        let span = tracer.start_span("anything", SpanOptions::root());

        span.set_tag("key", TagValue::from("value"));
        span.log_kv("key", TagValue::from(1i64));
        span.finish();

        assert!(span.context().trace_id.is_nil());
    }

    #[test]
    fn test_noop_extract_reports_not_found() {
        let tracer = NoopTracer;
        let err = tracer.extract(b"anything").unwrap_err();
        assert!(matches!(err, PropagationError::SpanContextNotFound));
    }

    #[test]
    fn test_global_tracer_defaults_to_noop() {
        let tracer = global_tracer();
        let span = tracer.start_span("op", SpanOptions::root());
        assert!(span.context().span_id.is_nil());
    }

    #[test]
    fn test_span_options_builder() {
        let parent = SpanContext::nil();
        let options = SpanOptions::child_of(parent)
            .tag("system", "engine")
            .tag("span.kind", "server");

        assert_eq!(options.child_of, Some(parent));
        assert_eq!(options.tags.len(), 2);
        assert_eq!(options.tags[0].0, "system");
    }
}
