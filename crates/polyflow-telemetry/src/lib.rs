//! # polyflow-telemetry
//!
//! Event bus for step telemetry. Steps emit structured events
//! (matrices read and written, decomposition summary, comparator
//! verdict, descent decision) that pluggable sinks consume.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, StepEvent, StepName};
