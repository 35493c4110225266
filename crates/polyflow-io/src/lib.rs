//! # polyflow-io
//!
//! Text codec and file contract for the polyflow workflow steps.
//!
//! Defines how matrices and scalars look on disk and where each
//! step finds its inputs and leaves its outputs.

pub mod contract;
pub mod text;
pub mod validator;

pub use contract::{FileNames, FlowFile, Workspace};
