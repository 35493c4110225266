//! Event bus — broadcast-style event dispatch with pluggable sinks.
//!
//! Steps emit through a shared reference; events queue on an `mpsc`
//! channel until the owner flushes them to the registered sinks.

use std::sync::mpsc;

use crate::events::StepEvent;
use crate::sinks::EventSink;

/// Broadcast event bus for step telemetry.
///
/// The producer side (`emit`) takes `&self`, so a step can report
/// without owning the bus. Each sink receives every flushed event.
pub struct EventBus {
    sender: mpsc::Sender<StepEvent>,
    receiver: mpsc::Receiver<StepEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Creates a bus that drops every event.
    pub fn disabled() -> Self {
        let mut bus = Self::new();
        bus.enabled = false;
        bus
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. Disabled bus drops events silently.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if the bus is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. If the bus is disabled, this is a no-op.
    pub fn emit(&self, event: StepEvent) {
        if !self.enabled {
            return;
        }
        // The bus owns the receiver, so this cannot fail while `self` lives.
        let _ = self.sender.send(event);
    }

    /// Flush all pending events to registered sinks.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Flushes pending events, then finalizes every sink.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
