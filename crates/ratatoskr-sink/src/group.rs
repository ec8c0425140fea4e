//! Fan-out sink delivering each record to every attached writer.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::EventSink;

/// Sink that mirrors every record to a set of writers.
///
/// The group starts empty and inactive. A writer that fails is dropped
/// from the group; when the last writer is gone the group reports
/// inactive again. `is_active` reads an atomic flag so recorders can
/// consult it without contending on the writer lock.
#[derive(Default)]
pub struct WriterGroup {
    writers: Mutex<Vec<Box<dyn Write + Send>>>,
    active: AtomicBool,
}

impl WriterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a writer. The group becomes active.
    pub fn add_writer(&self, writer: impl Write + Send + 'static) {
        let mut writers = self.writers.lock().unwrap();
        writers.push(Box::new(writer));
        self.active.store(true, Ordering::Release);
    }

    /// Number of currently attached writers.
    pub fn writer_count(&self) -> usize {
        self.writers.lock().unwrap().len()
    }
}

impl EventSink for WriterGroup {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn write(&self, record: &[u8]) {
        let mut writers = self.writers.lock().unwrap();
        writers.retain_mut(|writer| {
            match writer.write_all(record).and_then(|_| writer.flush()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping failed event writer");
                    false
                }
            }
        });
        if writers.is_empty() {
            self.active.store(false, Ordering::Release);
        }
    }
}
