//! Decomposer: matrix on a reader → SVD factor files.

use std::io::BufRead;

use polyflow_io::{text, FlowFile, Workspace};
use polyflow_math::{svd, Matrix, SvdFactors, SvdMode};
use polyflow_telemetry::{EventBus, EventKind, StepEvent, StepName};
use polyflow_types::FlowResult;

/// The three factor matrices written by the decomposer.
#[derive(Debug, Clone)]
pub struct Factors {
    /// Left singular vectors.
    pub u: Matrix,
    /// Square diagonal matrix of singular values.
    pub s: Matrix,
    /// Right singular vectors, transposed.
    pub vt: Matrix,
}

impl From<SvdFactors> for Factors {
    fn from(f: SvdFactors) -> Self {
        Self {
            s: f.sigma(),
            u: f.u,
            vt: f.vt,
        }
    }
}

/// Decomposes `a` into `(U, diag(S), VT)`.
pub fn decompose(a: &Matrix, mode: SvdMode) -> FlowResult<Factors> {
    svd(a, mode).map(Factors::from)
}

/// Reads a matrix from `input` and writes its factors to the
/// U, S, and VT files of `ws`.
///
/// The three files are replaced together: if parsing, the decomposition,
/// or any write fails, the previous factor files are left as they were.
pub fn run<R: BufRead>(
    input: R,
    ws: &Workspace,
    mode: SvdMode,
    bus: &EventBus,
) -> FlowResult<Factors> {
    let a = text::read_matrix(input)?;
    bus.emit(StepEvent::new(
        StepName::Decompose,
        EventKind::MatrixRead {
            source: "-".into(),
            rows: a.rows(),
            cols: a.cols(),
        },
    ));

    let f = svd(&a, mode)?;
    bus.emit(StepEvent::new(
        StepName::Decompose,
        EventKind::Decomposed {
            rank_bound: f.rank_bound(),
            largest: f.singular_values.first().copied().unwrap_or(0.0),
            smallest: f.singular_values.last().copied().unwrap_or(0.0),
        },
    ));

    let factors = Factors::from(f);
    let outputs = [
        (FlowFile::FactorU, &factors.u),
        (FlowFile::FactorS, &factors.s),
        (FlowFile::FactorVt, &factors.vt),
    ];
    ws.write_matrices(&outputs)?;
    for (file, m) in outputs {
        bus.emit(StepEvent::new(
            StepName::Decompose,
            EventKind::MatrixWritten {
                target: ws.files().name(file).to_string(),
                rows: m.rows(),
                cols: m.cols(),
            },
        ));
    }
    Ok(factors)
}
