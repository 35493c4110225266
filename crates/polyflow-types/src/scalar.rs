//! Scalar type alias for matrix and step values.
//!
//! Every value on the file contract is a double, so the whole
//! workspace computes in `f64`.

/// The floating-point type used throughout the workflow steps.
pub type Scalar = f64;
