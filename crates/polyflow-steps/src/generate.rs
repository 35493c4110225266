//! Generator: random square test matrices.

use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use polyflow_io::text;
use polyflow_math::Matrix;
use polyflow_telemetry::{EventBus, EventKind, StepEvent, StepName};
use polyflow_types::{FlowError, FlowResult};

/// Fills an n×n matrix with uniform values in [0, 1).
///
/// Returns [`FlowError::TooLarge`] when n×n values cannot be allocated.
pub fn generate<R: Rng>(n: usize, rng: &mut R) -> FlowResult<Matrix> {
    let too_large = || FlowError::TooLarge { rows: n, cols: n };
    let len = n.checked_mul(n).ok_or_else(too_large)?;
    let mut data = Vec::<f64>::new();
    data.try_reserve_exact(len).map_err(|_| too_large())?;
    data.extend((0..len).map(|_| rng.gen_range(0.0..1.0)));
    Matrix::from_vec(n, n, data)
}

/// Writes a random n×n matrix to `output`.
///
/// A seed makes the output reproducible; without one the generator
/// draws its seed from the OS.
pub fn run<W: Write>(n: usize, seed: Option<u64>, output: W, bus: &EventBus) -> FlowResult<Matrix> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let m = generate(n, &mut rng)?;
    text::write_matrix(output, &m)?;
    bus.emit(StepEvent::new(
        StepName::Generate,
        EventKind::MatrixWritten {
            target: "-".into(),
            rows: n,
            cols: n,
        },
    ));
    Ok(m)
}
