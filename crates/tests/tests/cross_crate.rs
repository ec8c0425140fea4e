//! Cross-crate integration and E2E tests
//!
//! These tests verify that the crates work together correctly
//! and test full request flows through the event façade.

use std::sync::Arc;

use ratatoskr::{
    CapturingDiagnostics, Context, EventLogger, Metadata, Misuse, SinkSpanRecorder,
    SpanContextError, pair,
};
use ratatoskr_sink::{FileSink, SinkConfig};
use ratatoskr_tracer::{BasicTracer, InMemorySpanRecorder, SharedTracer, TagValue};

/// Logger backed by its own recorder, standing in for one process.
fn process_logger(system: &str) -> (EventLogger, Arc<InMemorySpanRecorder>) {
    let recorder = Arc::new(InMemorySpanRecorder::new());
    let tracer: SharedTracer = Arc::new(BasicTracer::new(recorder.clone()));
    (EventLogger::new(system).with_tracer(tracer), recorder)
}

/// E2E Test: Full request flow through one process
///
/// This test verifies the complete flow:
/// 1. Ambient metadata is bound to the root context
/// 2. A request span opens and a nested lookup span under it
/// 3. Events are recorded against both contexts into a JSONL file
/// 4. Both spans finish and the file holds decodable records
#[test]
fn test_e2e_request_flow() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("events").join("engine.jsonl");

    let (logger, recorder) = process_logger("engine");
    let sink = Arc::new(FileSink::new(SinkConfig::new(&path)).unwrap());
    let logger = logger.with_sink(sink);

    let ambient = Context::new().with_loggable(&Metadata::from_iter([("session", "s-1")]));
    let request = logger.start(&ambient, "handle_request");
    logger.record_event(&request, "request_received", &[&pair("path", "/query")]);

    let lookup = logger.start(&request, "resolve_path");
    logger.log_kv(&lookup, "segments", 3i64);
    logger.record_event(&lookup, "path_resolved", &[]);
    logger.finish(&lookup);

    logger.finish(&request);

    // Both spans reached the backend, child parented under the request.
    let spans = recorder.finished_spans();
    assert_eq!(spans.len(), 2);
    let resolve = &spans[0];
    let handle = &spans[1];
    assert_eq!(resolve.operation_name, "resolve_path");
    assert_eq!(resolve.parent_span_id, Some(handle.context.span_id));
    assert_eq!(resolve.context.trace_id, handle.context.trace_id);
    assert_eq!(handle.tag("system"), Some(&TagValue::from("engine")));

    // Both events landed in the file with ambient metadata folded in.
    let records = FileSink::read_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["event"], "request_received");
    assert_eq!(records[0]["system"], "engine");
    assert_eq!(records[0]["session"], "s-1");
    assert_eq!(records[0]["path"], "/query");
    assert_eq!(records[1]["event"], "path_resolved");
    assert!(records[1]["time"].is_string());
}

/// E2E Test: Trace continuation across a process boundary
///
/// This test verifies the cross-process flow:
/// 1. A gateway process opens a span and serializes its state
/// 2. An engine process, with its own tracer, continues from the bytes
/// 3. Both sides agree on the trace id and the parent edge
#[test]
fn test_e2e_cross_process_continuation() {
    let (gateway, gateway_recorder) = process_logger("gateway");
    let (engine, engine_recorder) = process_logger("engine");

    let gateway_ctx = gateway.start(&Context::new(), "handle_request");
    let wire = gateway.serialize_context(&gateway_ctx).unwrap();

    let engine_ctx = engine
        .start_from_parent_state(&Context::new(), "execute_query", &wire)
        .unwrap();
    engine.finish(&engine_ctx);
    gateway.finish(&gateway_ctx);

    let gateway_span = &gateway_recorder.finished_spans()[0];
    let engine_span = &engine_recorder.finished_spans()[0];

    assert_eq!(
        engine_span.context.trace_id, gateway_span.context.trace_id,
        "Expected both processes to share one trace"
    );
    assert_eq!(
        engine_span.parent_span_id,
        Some(gateway_span.context.span_id)
    );
    assert_eq!(engine_span.tag("span.kind"), Some(&TagValue::from("server")));
    assert_eq!(engine_span.tag("system"), Some(&TagValue::from("engine")));
}

/// Corrupt parent state is a typed error, not a panic, and starts nothing.
#[test]
fn test_malformed_parent_state_rejected() {
    let (engine, recorder) = process_logger("engine");

    let err = engine
        .start_from_parent_state(&Context::new(), "execute_query", b"{not json")
        .unwrap_err();

    assert!(matches!(err, SpanContextError::Deserialize(_)));
    assert_eq!(recorder.span_count(), 0, "No span may start on bad input");
}

/// E2E Test: Concurrent children from one shared context
///
/// This test verifies context immutability under concurrency:
/// 1. One request context is shared by several tasks
/// 2. Each task derives, annotates, and finishes its own child span
/// 3. Every child hangs off the same parent and the parent is unaffected
#[tokio::test]
async fn test_concurrent_children_from_one_context() {
    let (logger, recorder) = process_logger("engine");
    let parent = logger.start(&Context::new(), "handle_request");

    let mut handles = Vec::new();
    for worker in 0..8 {
        let logger = logger.clone();
        let parent = parent.clone();
        handles.push(tokio::spawn(async move {
            let child = logger.start(&parent, "worker");
            logger.log_kv(&child, "worker", i64::from(worker));
            logger.finish(&child);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    logger.finish(&parent);

    let spans = recorder.finished_spans();
    assert_eq!(spans.len(), 9);

    let request = spans
        .iter()
        .find(|s| s.operation_name == "handle_request")
        .unwrap();
    assert!(request.parent_span_id.is_none());

    let children: Vec<_> = spans
        .iter()
        .filter(|s| s.operation_name == "worker")
        .collect();
    assert_eq!(children.len(), 8);
    for child in children {
        assert_eq!(child.parent_span_id, Some(request.context.span_id));
        assert_eq!(child.context.trace_id, request.context.trace_id);
    }
}

/// Racing finishes on one span reach the backend exactly once; the losers
/// each produce a double-finish diagnostic.
#[test]
fn test_racing_finish_reaches_backend_once() {
    let (logger, recorder) = process_logger("engine");
    let diagnostics = Arc::new(CapturingDiagnostics::new());
    let logger = logger.with_diagnostics(diagnostics.clone());

    let ctx = logger.start(&Context::new(), "contended");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let logger = logger.clone();
            let ctx = ctx.clone();
            scope.spawn(move || logger.finish(&ctx));
        }
    });

    assert_eq!(recorder.span_count(), 1);
    assert_eq!(diagnostics.count_of(Misuse::DoubleFinish), 3);
}

/// E2E Test: Spans and events interleaved on one sink
///
/// This test verifies the span-to-sink bridge:
/// 1. The tracer's recorder streams finished spans into the same file
///    the event recorder writes to
/// 2. Both record shapes decode from the shared JSONL stream
#[test]
fn test_spans_and_events_share_one_sink() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("stream.jsonl");
    let sink = Arc::new(FileSink::new(SinkConfig::new(&path)).unwrap());

    let tracer: SharedTracer = Arc::new(BasicTracer::new(Arc::new(SinkSpanRecorder::new(
        sink.clone(),
    ))));
    let logger = EventLogger::new("engine")
        .with_tracer(tracer)
        .with_sink(sink);

    let ctx = logger.start(&Context::new(), "compact");
    logger.record_event(&ctx, "compaction_started", &[&pair("level", 2i64)]);
    logger.finish(&ctx);

    let records = FileSink::read_records(&path).unwrap();
    assert_eq!(records.len(), 2);

    let event = &records[0];
    assert_eq!(event["event"], "compaction_started");
    assert_eq!(event["level"], 2);

    let span = &records[1];
    assert_eq!(span["operation_name"], "compact");
    assert_eq!(span["tags"], serde_json::json!({"system": "engine"}));
    assert!(span["context"]["trace_id"].is_string());
}
