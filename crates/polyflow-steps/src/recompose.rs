//! Recomposer: U, S, VT factor files → product on a writer.

use std::io::Write;

use polyflow_io::{text, FlowFile, Workspace};
use polyflow_math::{chain_product, Matrix};
use polyflow_telemetry::{EventBus, EventKind, StepEvent, StepName};
use polyflow_types::FlowResult;

/// Computes `U × S × VT`.
///
/// U must be m×k, S k×k, and VT k×n.
pub fn recompose(u: &Matrix, s: &Matrix, vt: &Matrix) -> FlowResult<Matrix> {
    chain_product(&[u, s, vt])
}

/// Reads the factor files of `ws`, multiplies them, and writes the
/// product to `output`.
pub fn run<W: Write>(ws: &Workspace, output: W, bus: &EventBus) -> FlowResult<Matrix> {
    let mut factors = Vec::with_capacity(3);
    for file in [FlowFile::FactorU, FlowFile::FactorS, FlowFile::FactorVt] {
        let m = ws.read_matrix(file)?;
        bus.emit(StepEvent::new(
            StepName::Recompose,
            EventKind::MatrixRead {
                source: ws.files().name(file).to_string(),
                rows: m.rows(),
                cols: m.cols(),
            },
        ));
        factors.push(m);
    }

    let a = recompose(&factors[0], &factors[1], &factors[2])?;
    text::write_matrix(output, &a)?;
    bus.emit(StepEvent::new(
        StepName::Recompose,
        EventKind::MatrixWritten {
            target: "-".into(),
            rows: a.rows(),
            cols: a.cols(),
        },
    ));
    Ok(a)
}
