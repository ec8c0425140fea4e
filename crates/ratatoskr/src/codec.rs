//! Span-state serialization for cross-process trace continuation.
//!
//! The byte blob is produced and consumed by the tracing backend's
//! inject/extract pair; callers ship it over whatever transport they have
//! and treat it as opaque.

use ratatoskr_tracer::{PropagationError, SpanContext, Tracer};

use crate::context::Context;

/// Errors from span-state serialization and deserialization. These are
/// the only operations in the façade that return errors at all.
#[derive(Debug, thiserror::Error)]
pub enum SpanContextError {
    /// Serialization was requested on a context with no span bound.
    #[error("no active span in context")]
    NoActiveSpan,

    /// The tracing backend failed to encode the span state.
    #[error("failed to serialize span context: {0}")]
    Serialize(#[source] PropagationError),

    /// The bytes did not decode as span state.
    #[error("failed to deserialize span context: {0}")]
    Deserialize(#[source] PropagationError),
}

pub(crate) fn serialize(tracer: &dyn Tracer, ctx: &Context) -> Result<Vec<u8>, SpanContextError> {
    let span = ctx.span().ok_or(SpanContextError::NoActiveSpan)?;
    tracer
        .inject(&span.context())
        .map_err(SpanContextError::Serialize)
}

pub(crate) fn deserialize(
    tracer: &dyn Tracer,
    bytes: &[u8],
) -> Result<SpanContext, SpanContextError> {
    tracer.extract(bytes).map_err(|e| {
        tracing::warn!(error = %e, "failed to deserialize span context");
        SpanContextError::Deserialize(e)
    })
}
