//! Comparator: the tolerance gate between a computed and an expected matrix.

use polyflow_io::{FlowFile, Workspace};
use polyflow_math::Matrix;
use polyflow_telemetry::{EventBus, EventKind, StepEvent, StepName};
use polyflow_types::{FlowError, FlowResult};

/// Checks `‖computed − expected‖_F < tolerance`.
///
/// Returns the norm on success, [`FlowError::ToleranceExceeded`] when the
/// norm reaches the tolerance, and [`FlowError::ShapeMismatch`] when the
/// shapes differ. A NaN norm never passes.
pub fn compare(computed: &Matrix, expected: &Matrix, tolerance: f64) -> FlowResult<f64> {
    let norm = computed.frobenius_distance(expected)?;
    if norm < tolerance {
        Ok(norm)
    } else {
        Err(FlowError::ToleranceExceeded { norm, tolerance })
    }
}

/// Compares the `matrix_in` and `matrix_out` files of `ws`.
pub fn run(ws: &Workspace, tolerance: f64, bus: &EventBus) -> FlowResult<f64> {
    let computed = ws.read_matrix(FlowFile::MatrixIn)?;
    let expected = ws.read_matrix(FlowFile::MatrixOut)?;

    let result = compare(&computed, &expected, tolerance);
    let norm = match &result {
        Ok(norm) => Some(*norm),
        Err(FlowError::ToleranceExceeded { norm, .. }) => Some(*norm),
        Err(_) => None,
    };
    if let Some(norm) = norm {
        bus.emit(StepEvent::new(
            StepName::Compare,
            EventKind::Compared {
                norm,
                tolerance,
                passed: result.is_ok(),
            },
        ));
    }
    result
}
