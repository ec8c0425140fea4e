//! Bridge from finished spans to the event stream.
//!
//! Wiring this recorder into a [`BasicTracer`] makes every finished span
//! show up as one JSON line on an [`EventSink`], next to the records the
//! event recorder emits.
//!
//! [`BasicTracer`]: ratatoskr_tracer::BasicTracer

use std::sync::Arc;

use ratatoskr_sink::EventSink;
use ratatoskr_tracer::{FinishedSpan, SpanRecorder};

/// Span recorder that encodes each finished span onto an event sink.
pub struct SinkSpanRecorder {
    sink: Arc<dyn EventSink>,
}

impl SinkSpanRecorder {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

impl SpanRecorder for SinkSpanRecorder {
    fn record_span(&self, span: &FinishedSpan) {
        if !self.sink.is_active() {
            return;
        }
        match serde_json::to_vec(span) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                self.sink.write(&bytes);
            }
            Err(e) => {
                tracing::error!(error = %e, operation = %span.operation_name, "failed to encode finished span");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatoskr_sink::CaptureSink;
    use ratatoskr_tracer::{BasicTracer, SpanOptions, TagValue, Tracer};

    #[test]
    fn test_finished_spans_land_on_the_sink() {
        let sink = Arc::new(CaptureSink::new());
        let tracer = BasicTracer::new(Arc::new(SinkSpanRecorder::new(sink.clone())));

        let span = tracer.start_span("fetch_block", SpanOptions::root());
        span.set_tag("system", TagValue::from("bitswap"));
        span.finish();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record: serde_json::Value = serde_json::from_str(&records[0]).unwrap();
        assert_eq!(record["operation_name"], "fetch_block");
        assert_eq!(record["tags"]["system"], "bitswap");
        assert!(record["context"]["trace_id"].is_string());
    }

    #[test]
    fn test_inactive_sink_drops_spans() {
        let sink = Arc::new(CaptureSink::inactive());
        let tracer = BasicTracer::new(Arc::new(SinkSpanRecorder::new(sink.clone())));

        tracer.start_span("fetch_block", SpanOptions::root()).finish();

        assert!(sink.records().is_empty());
    }
}
