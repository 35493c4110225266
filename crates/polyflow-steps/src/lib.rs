//! # polyflow-steps
//!
//! The workflow steps. Each step is a pure core function plus a `run`
//! wrapper that does the file I/O against an explicit [`Workspace`].
//!
//! ## Steps
//!
//! - [`decompose`] — matrix → SVD factor files
//! - [`recompose`] — factor files → matrix product
//! - [`compare`] — Frobenius-norm tolerance gate
//! - [`descent`] — one scalar gradient-descent step
//! - [`generate`] — random square input matrices
//!
//! [`Workspace`]: polyflow_io::Workspace

pub mod compare;
pub mod config;
pub mod decompose;
pub mod descent;
pub mod generate;
pub mod recompose;

pub use config::FlowConfig;
pub use decompose::Factors;
pub use descent::Descent;
