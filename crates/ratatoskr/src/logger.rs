//! Event logger: span lifecycle operations bound to an execution context.
//!
//! One [`EventLogger`] per subsystem. Spans are started against a
//! [`Context`] and every annotation names the context it applies to, so
//! nothing here relies on ambient state. Operations that need a span
//! tolerate its absence: they report through the diagnostic channel and
//! return, never panicking and never failing the caller.

use std::fmt::Display;
use std::panic::Location;
use std::sync::Arc;

use ratatoskr_sink::EventSink;
use ratatoskr_tracer::{SharedTracer, SpanOptions, TagValue, global_tracer};

use crate::codec::{self, SpanContextError};
use crate::context::{ActiveSpanState, Context};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Misuse, TracingDiagnostics};
use crate::metadata::Value;

/// Tag and record key naming the emitting subsystem.
pub(crate) const SYSTEM_KEY: &str = "system";
/// Tag and log key marking a span as failed.
pub(crate) const ERROR_KEY: &str = "error";

#[derive(Clone)]
enum TracerHandle {
    /// Resolve the global registry at each call.
    Global,
    /// Use one fixed backend, registry changes notwithstanding.
    Fixed(SharedTracer),
}

/// Structured event logger for one subsystem.
///
/// Cheap to clone; clones share the same sinks. The logger stamps its
/// system name onto every span it starts and every record it emits.
#[derive(Clone)]
pub struct EventLogger {
    system: String,
    tracer: TracerHandle,
    sink: Option<Arc<dyn EventSink>>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl EventLogger {
    /// Logger for the named subsystem.
    ///
    /// An empty name is tolerated: a warning is logged and `"undefined"`
    /// is used instead.
    pub fn new(system: impl Into<String>) -> Self {
        let mut system = system.into();
        if system.is_empty() {
            tracing::warn!("missing system name for event logger, using \"undefined\"");
            system = "undefined".to_string();
        }
        Self {
            system,
            tracer: TracerHandle::Global,
            sink: None,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Use a fixed tracing backend instead of resolving the global
    /// registry per call.
    pub fn with_tracer(mut self, tracer: SharedTracer) -> Self {
        self.tracer = TracerHandle::Fixed(tracer);
        self
    }

    /// Attach the sink that receives event records. Without one, event
    /// recording is a no-op.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Route misuse diagnostics to `sink` instead of the logging backend.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Subsystem name stamped on spans and records.
    pub fn system(&self) -> &str {
        &self.system
    }

    pub(crate) fn tracer(&self) -> SharedTracer {
        match &self.tracer {
            TracerHandle::Global => global_tracer(),
            TracerHandle::Fixed(tracer) => Arc::clone(tracer),
        }
    }

    pub(crate) fn sink(&self) -> Option<&Arc<dyn EventSink>> {
        self.sink.as_ref()
    }

    /// Start a span named `name` and derive a context bound to it.
    ///
    /// The span is created as a child of any span already bound to `ctx`,
    /// or as a trace root otherwise, and is tagged with this logger's
    /// system name. The parent context is left untouched and remains
    /// usable. Never blocks, never fails.
    pub fn start(&self, ctx: &Context, name: &str) -> Context {
        let options = match ctx.span() {
            Some(parent) => SpanOptions::child_of(parent.context()),
            None => SpanOptions::root(),
        };
        self.start_with_options(ctx, name, options)
    }

    /// Continue a trace whose span state arrived from another process.
    ///
    /// `parent` must be bytes produced by [`serialize_context`]. On decode
    /// failure the error is returned and no context is derived. The new
    /// span is parented under the remote span and additionally tagged as
    /// an inbound cross-process edge.
    ///
    /// [`serialize_context`]: EventLogger::serialize_context
    pub fn start_from_parent_state(
        &self,
        ctx: &Context,
        name: &str,
        parent: &[u8],
    ) -> Result<Context, SpanContextError> {
        let remote = codec::deserialize(self.tracer().as_ref(), parent)?;
        let options = SpanOptions::child_of(remote).tag("span.kind", "server");
        Ok(self.start_with_options(ctx, name, options))
    }

    fn start_with_options(&self, ctx: &Context, name: &str, options: SpanOptions) -> Context {
        let span = self.tracer().start_span(name, options);
        span.set_tag(SYSTEM_KEY, TagValue::String(self.system.clone()));
        ctx.with_span(span, Arc::new(ActiveSpanState::default()))
    }

    /// Serialize the span state bound to `ctx` for cross-process
    /// transport. The bytes are opaque; feed them to
    /// [`start_from_parent_state`] on the other side.
    ///
    /// [`start_from_parent_state`]: EventLogger::start_from_parent_state
    pub fn serialize_context(&self, ctx: &Context) -> Result<Vec<u8>, SpanContextError> {
        codec::serialize(self.tracer().as_ref(), ctx)
    }

    /// Attach a timestamped key-value fact to the span bound to `ctx`.
    #[track_caller]
    pub fn log_kv(&self, ctx: &Context, key: &str, value: impl Into<Value>) {
        let Some(span) = ctx.span() else {
            self.report(Misuse::MissingSpan, "log_kv");
            return;
        };
        span.log_kv(key, to_tag_value(&value.into()));
    }

    /// Attach or overwrite a key-value tag on the span bound to `ctx`.
    #[track_caller]
    pub fn set_tag(&self, ctx: &Context, key: &str, value: impl Into<Value>) {
        let Some(span) = ctx.span() else {
            self.report(Misuse::MissingSpan, "set_tag");
            return;
        };
        span.set_tag(key, to_tag_value(&value.into()));
    }

    /// Mark the span bound to `ctx` as failed: tag `error = true` and log
    /// the error's message under `"error"`.
    ///
    /// `None` is a no-op. The missing-span check runs first either way.
    #[track_caller]
    pub fn set_err<E>(&self, ctx: &Context, err: Option<&E>)
    where
        E: Display + ?Sized,
    {
        let Some(span) = ctx.span() else {
            self.report(Misuse::MissingSpan, "set_err");
            return;
        };
        let Some(err) = err else { return };
        span.set_tag(ERROR_KEY, TagValue::Bool(true));
        span.log_kv(ERROR_KEY, TagValue::String(err.to_string()));
    }

    /// Finish the span bound to `ctx`, fixing its end timestamp.
    ///
    /// The underlying finish runs at most once per started span. A repeat
    /// call reports one double-finish diagnostic and leaves the span
    /// alone; annotating after finish is passed through to the backend.
    #[track_caller]
    pub fn finish(&self, ctx: &Context) {
        let Some((span, state)) = ctx.span_binding() else {
            self.report(Misuse::MissingSpan, "finish");
            return;
        };
        if state.try_finish() {
            span.finish();
        } else {
            self.report(Misuse::DoubleFinish, "finish");
        }
    }

    /// [`set_err`] followed by [`finish`].
    ///
    /// [`set_err`]: EventLogger::set_err
    /// [`finish`]: EventLogger::finish
    #[track_caller]
    pub fn finish_with_err<E>(&self, ctx: &Context, err: Option<&E>)
    where
        E: Display + ?Sized,
    {
        self.set_err(ctx, err);
        self.finish(ctx);
    }

    #[track_caller]
    fn report(&self, misuse: Misuse, operation: &'static str) {
        let location = Location::caller();
        self.diagnostics.report(Diagnostic {
            misuse,
            operation,
            file: location.file(),
            line: location.line(),
        });
    }
}

/// Flatten a metadata value for the span boundary: scalars map directly,
/// composites cross as their JSON rendering.
pub(crate) fn to_tag_value(value: &Value) -> TagValue {
    match value {
        Value::String(s) | Value::Error(s) => TagValue::String(s.clone()),
        Value::Int(n) => TagValue::Int(*n),
        Value::Float(n) => TagValue::Float(*n),
        Value::Bool(b) => TagValue::Bool(*b),
        composite => TagValue::String(composite.to_string()),
    }
}
