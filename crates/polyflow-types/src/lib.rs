//! # polyflow-types
//!
//! Shared error type, workflow constants, and the scalar alias
//! for the polyflow numeric workflow steps.
//!
//! This crate has zero numerical logic — it defines the vocabulary
//! that all other polyflow crates share.

pub mod constants;
pub mod error;
pub mod scalar;

pub use error::{FlowError, FlowResult};
pub use scalar::Scalar;
