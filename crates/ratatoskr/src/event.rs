//! Event recording: one-shot records and events in progress.
//!
//! `record_event` emits a single JSON record assembled from ambient
//! context metadata and per-event loggables. `begin_event` opens a traced
//! event instead: a span plus an [`EventInProgress`] handle collecting
//! metadata until finalization.

use std::fmt::Display;

use chrono::{SecondsFormat, Utc};

use crate::context::Context;
use crate::loggable::Loggable;
use crate::logger::{ERROR_KEY, EventLogger, SYSTEM_KEY};
use crate::metadata::{Metadata, Value};

/// Reserved record key holding the event name.
const EVENT_KEY: &str = "event";
/// Reserved record key holding the record timestamp.
const TIME_KEY: &str = "time";

/// Transient aggregation of one record's inputs before encoding.
struct Entry<'a> {
    system: &'a str,
    event: &'a str,
    loggables: &'a [&'a dyn Loggable],
}

impl Entry<'_> {
    /// Fold ambient and per-event metadata into one map, then stamp the
    /// reserved keys over whatever the fold produced.
    fn assemble(&self, ambient: Option<&Metadata>) -> Metadata {
        let mut accum = ambient.cloned().unwrap_or_default();
        for loggable in self.loggables {
            accum = accum.merge(loggable.to_metadata());
        }

        accum.insert(EVENT_KEY, self.event);
        accum.insert(SYSTEM_KEY, self.system);
        accum.insert(
            TIME_KEY,
            Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        );
        accum
    }
}

impl EventLogger {
    /// Emit one structured event record to the attached sink.
    ///
    /// Returns immediately, before any assembly work, when no sink is
    /// attached or the sink reports inactive. The record is the context's
    /// accumulated metadata folded with each loggable in order; the
    /// reserved keys `event`, `system`, and `time` overwrite colliding
    /// caller keys unconditionally. Encoding failures are logged and the
    /// record is dropped; nothing here returns an error.
    pub fn record_event(&self, ctx: &Context, event: &str, loggables: &[&dyn Loggable]) {
        let Some(sink) = self.sink() else { return };
        if !sink.is_active() {
            return;
        }

        let entry = Entry {
            system: self.system(),
            event,
            loggables,
        };
        let record = entry.assemble(ctx.metadata());

        match serde_json::to_vec(&record) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                sink.write(&bytes);
            }
            Err(e) => {
                tracing::error!(error = %e, event, "failed to encode event record");
            }
        }
    }

    /// Open a traced event: a span named `event` plus a handle collecting
    /// metadata while the event runs.
    ///
    /// Key-values of the initial loggables are logged onto the span
    /// immediately; the same loggables are walked again at finalization.
    pub fn begin_event(
        &self,
        ctx: &Context,
        event: &str,
        loggables: Vec<Box<dyn Loggable>>,
    ) -> EventInProgress {
        let ctx = self.start(ctx, event);
        for loggable in &loggables {
            let metadata = loggable.to_metadata();
            for (key, value) in &metadata {
                self.log_kv(&ctx, key, value.clone());
            }
        }

        EventInProgress {
            logger: self.clone(),
            ctx,
            loggables,
        }
    }
}

/// An event that is still happening.
///
/// Collects loggables while open and finalizes exactly once: the
/// finalizing methods consume the handle, so reuse after `done` is not
/// expressible. An abandoned handle leaks its span; there is no drop
/// magic here.
pub struct EventInProgress {
    logger: EventLogger,
    ctx: Context,
    loggables: Vec<Box<dyn Loggable>>,
}

impl EventInProgress {
    /// Context carrying the event's span, for direct lifecycle calls
    /// while the event is open.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Add metadata to be included when the event finalizes.
    pub fn append(&mut self, loggable: impl Loggable + 'static) {
        self.loggables.push(Box::new(loggable));
    }

    /// Record that the event failed: appends a `{"error": message}`
    /// loggable, promoted onto the span at finalization.
    pub fn set_error<E>(&mut self, err: &E)
    where
        E: Display + ?Sized,
    {
        self.loggables.push(Box::new(Metadata::from_iter([(
            ERROR_KEY,
            Value::Error(err.to_string()),
        )])));
    }

    /// Finalize the event: walk every collected loggable in order, log
    /// each key-value onto the span, route values under the literal key
    /// `"error"` through the error tagging as well, then finish the span.
    pub fn done(self) {
        let EventInProgress {
            logger,
            ctx,
            loggables,
        } = self;

        for loggable in &loggables {
            let metadata = loggable.to_metadata();
            for (key, value) in &metadata {
                if key.as_str() == ERROR_KEY {
                    logger.set_err(&ctx, Some(value));
                }
                logger.log_kv(&ctx, key, value.clone());
            }
        }
        logger.finish(&ctx);
    }

    /// [`set_error`] when `err` is present, then [`done`].
    ///
    /// [`set_error`]: EventInProgress::set_error
    /// [`done`]: EventInProgress::done
    pub fn done_with_err<E>(mut self, err: Option<&E>)
    where
        E: Display + ?Sized,
    {
        if let Some(err) = err {
            self.set_error(err);
        }
        self.done();
    }

    /// Alias for [`done`].
    ///
    /// [`done`]: EventInProgress::done
    pub fn close(self) {
        self.done();
    }
}
