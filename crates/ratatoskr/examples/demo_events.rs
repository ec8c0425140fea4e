//! Demo of the event façade simulating a gateway -> engine request flow
//! across a process boundary.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use ratatoskr::{Context, EventLogger, Loggable, Metadata, pair, uuid};
use ratatoskr_sink::{FileSink, SinkConfig};
use ratatoskr_tracer::{BasicTracer, InMemorySpanRecorder, set_global_tracer};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Domain-specific event data (similar to what a storage engine would define)
struct QueryStats {
    rows: i64,
    elapsed_ms: i64,
    cache_hit: bool,
}

impl Loggable for QueryStats {
    fn to_metadata(&self) -> Metadata {
        Metadata::from_iter([
            ("rows", ratatoskr::Value::Int(self.rows)),
            ("elapsed_ms", ratatoskr::Value::Int(self.elapsed_ms)),
            ("cache_hit", ratatoskr::Value::Bool(self.cache_hit)),
        ])
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Gateway side: open the request trace, record the arrival, and ship the
/// span state to the engine as bytes.
fn gateway_request(log: &EventLogger) -> Result<(Context, Vec<u8>)> {
    let ctx = Context::new().with_loggable(&uuid("request_id"));
    let ctx = log.start(&ctx, "handle_request");

    log.set_tag(&ctx, "client", "cli");
    log.record_event(
        &ctx,
        "request_received",
        &[&pair("path", "/query"), &pair("payload_bytes", 512i64)],
    );

    let wire = log.serialize_context(&ctx)?;
    Ok((ctx, wire))
}

/// Engine side: continue the trace from the wire bytes and run the query
/// as a traced event.
fn engine_execute(log: &EventLogger, wire: &[u8]) -> Result<()> {
    let ctx = log.start_from_parent_state(&Context::new(), "execute_query", wire)?;

    let mut planning = log.begin_event(&ctx, "plan_query", Vec::new());
    planning.append(pair("strategy", "index_scan"));
    planning.append(pair("rows_estimated", 1400i64));
    planning.done();

    log.record_event(
        &ctx,
        "query_complete",
        &[&QueryStats {
            rows: 1377,
            elapsed_ms: 12,
            cache_hit: false,
        }],
    );
    log.finish(&ctx);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    // One recording tracer for the whole process, plus a file sink for
    // event records. Each run starts from an empty file.
    let recorder = Arc::new(InMemorySpanRecorder::new());
    set_global_tracer(Arc::new(BasicTracer::new(recorder.clone())));

    let path = Path::new(".ratatoskr/events.jsonl");
    let _ = std::fs::remove_file(path);
    let sink = Arc::new(FileSink::new(SinkConfig::new(path))?);

    let gateway = EventLogger::new("gateway").with_sink(sink.clone());
    let engine = EventLogger::new("engine").with_sink(sink.clone());

    // "Process A" handles the request and serializes its span state.
    let (gateway_ctx, wire) = gateway_request(&gateway)?;
    println!("serialized span state: {} bytes", wire.len());

    // "Process B" picks the bytes up and continues the same trace.
    engine_execute(&engine, &wire)?;

    gateway.finish(&gateway_ctx);

    // Print summary
    let spans = recorder.finished_spans();
    println!("\nFinished spans: {}", spans.len());
    for span in &spans {
        println!(
            "  {} (system {}, trace {})",
            span.operation_name,
            span.tag("system").map(ToString::to_string).unwrap_or_default(),
            span.context.trace_id
        );
    }

    let single_trace = spans
        .iter()
        .all(|s| s.context.trace_id == spans[0].context.trace_id);
    println!("Single trace across both processes: {single_trace}");

    let records = FileSink::read_records(sink.path())?;
    println!("\nEvent records in {}: {}", sink.path().display(), records.len());
    if let Some(sample) = records.first() {
        println!("\n--- First Record JSON ---");
        println!("{}", serde_json::to_string_pretty(sample)?);
    }

    Ok(())
}
