//! Workflow defaults: tolerances, step sizes, and contract file names.

/// Frobenius-norm tolerance of the comparator. A difference strictly
/// below this value passes.
pub const COMPARE_TOLERANCE: f64 = 1.0e-5;

/// Gradient magnitude above which the step-updater keeps descending.
pub const GRAD_THRESHOLD: f64 = 1.0e-3;

/// Fixed learning rate of the gradient step.
pub const LEARNING_RATE: f64 = 0.1;

/// Computed matrix read by the comparator.
pub const MATRIX_IN: &str = "matrix_in";

/// Expected matrix read by the comparator.
pub const MATRIX_OUT: &str = "matrix_out";

/// Left singular vectors (U).
pub const FACTOR_U: &str = "m1";

/// Square diagonal matrix of singular values.
pub const FACTOR_S: &str = "m2";

/// Right singular vectors, transposed (VT).
pub const FACTOR_VT: &str = "m3";

/// Current approximation, written by the previous iteration.
pub const APPROX_OLD: &str = "approx_old";

/// Gradient at the current approximation.
pub const GRAD: &str = "grad";

/// Next approximation, written when descent continues.
pub const APPROX_NEW: &str = "approx_new";

/// Final value, written when descent has converged.
pub const SOLUTION: &str = "solution";

/// Append-only audit trail of the step-updater.
pub const APPROX_LOG: &str = "approx_log";
