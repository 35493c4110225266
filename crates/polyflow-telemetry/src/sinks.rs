//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (collect in memory, log through `tracing`, append to a JSON-lines file).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::events::StepEvent;

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &StepEvent);

    /// Called when the step ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// Clones share the same buffer, so a test can keep one handle and
/// give the other to the bus.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<StepEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected events.
    pub fn events(&self) -> Vec<StepEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &StepEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &StepEvent) {
        let step = event.step.as_str();
        match self.level {
            tracing::Level::ERROR => tracing::error!(step, event = ?event.kind, "step_event"),
            tracing::Level::WARN => tracing::warn!(step, event = ?event.kind, "step_event"),
            tracing::Level::INFO => tracing::info!(step, event = ?event.kind, "step_event"),
            tracing::Level::DEBUG => tracing::debug!(step, event = ?event.kind, "step_event"),
            _ => tracing::trace!(step, event = ?event.kind, "step_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}

/// Appends one JSON object per event to a file.
pub struct JsonLinesSink {
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    /// Opens `path` in append mode, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl EventSink for JsonLinesSink {
    fn handle(&mut self, event: &StepEvent) {
        match serde_json::to_string(event) {
            Ok(line) => {
                if let Err(e) = writeln!(self.writer, "{line}") {
                    tracing::warn!(error = %e, "failed to write event");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }
    }

    fn finalize(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "failed to flush event log");
        }
    }

    fn name(&self) -> &str {
        "json_lines_sink"
    }
}
