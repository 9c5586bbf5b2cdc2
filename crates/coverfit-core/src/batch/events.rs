//! Events emitted by the batch executor.
//!
//! The executor never touches presentation state directly: it pushes
//! [`BatchEvent`]s into an [`EventSink`] and the presentation layer consumes
//! them on its own thread.

use std::path::PathBuf;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::types::{ProcessingOutcome, RunSummary, Severity};

/// Something the presentation layer may want to show.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Discovery finished; `total` files will be processed
    Discovered { root: PathBuf, total: usize },

    /// Human-readable log line
    Log { message: String, severity: Severity },

    /// Overall progress in percent (0.0 - 100.0)
    Progress(f64),

    /// One file went through the pipeline
    FileOutcome(ProcessingOutcome),

    /// The run reached a terminal state
    RunFinished(RunSummary),

    /// The run itself failed (not a single file)
    RunFailed { message: String },
}

impl BatchEvent {
    pub fn log(severity: Severity, message: impl Into<String>) -> Self {
        BatchEvent::Log {
            message: message.into(),
            severity,
        }
    }
}

/// Destination for batch events.
///
/// `emit` is called from the executor thread; implementations must not
/// assume they run on the presentation thread.
pub trait EventSink {
    fn emit(&self, event: BatchEvent);
}

/// Bounded channel sink. Blocks the executor when the consumer falls behind.
///
/// Must be used from a blocking context (the executor runs under
/// `spawn_blocking`).
impl EventSink for mpsc::Sender<BatchEvent> {
    fn emit(&self, event: BatchEvent) {
        if self.blocking_send(event).is_err() {
            tracing::trace!("Event receiver dropped; discarding event");
        }
    }
}

impl EventSink for mpsc::UnboundedSender<BatchEvent> {
    fn emit(&self, event: BatchEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Event receiver dropped; discarding event");
        }
    }
}

/// Collects events in memory.
impl EventSink for Mutex<Vec<BatchEvent>> {
    fn emit(&self, event: BatchEvent) {
        match self.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Discards every event.
impl EventSink for () {
    fn emit(&self, _event: BatchEvent) {}
}
