//! # polyflow-math
//!
//! Linear algebra primitives for the polyflow workflow steps.
//!
//! Provides:
//! - A dense row-major [`Matrix`] with Frobenius norms and `faer` conversion
//! - Matrix products backed by `faer`
//! - Full and thin singular value decomposition

pub mod decomposition;
pub mod matrix;
pub mod product;

pub use decomposition::{svd, SvdFactors, SvdMode};
pub use matrix::Matrix;
pub use product::{chain_product, matmul};
