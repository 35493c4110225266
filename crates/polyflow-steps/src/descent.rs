//! Step-updater: one gradient-descent step on a scalar.
//!
//! Two outcomes. While |grad| is above the threshold the step continues
//! and writes the next approximation; otherwise it converges and writes
//! the current value as the solution. Callers tell the outcomes apart by
//! which of the two files exists.

use polyflow_io::text::format_scalar;
use polyflow_io::{FlowFile, Workspace};
use polyflow_telemetry::{EventBus, EventKind, StepEvent, StepName};
use polyflow_types::{FlowResult, Scalar};

/// Result of one descent step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Descent {
    /// |grad| > threshold: `new = old - learning_rate * grad`.
    Continue { old: Scalar, new: Scalar },
    /// |grad| <= threshold: `old` is the solution.
    Converged { value: Scalar },
}

impl Descent {
    /// Returns true once descent has converged.
    pub fn is_converged(&self) -> bool {
        matches!(self, Descent::Converged { .. })
    }

    /// Lines appended to the audit log for this step.
    pub fn log_lines(&self) -> Vec<String> {
        match *self {
            Descent::Continue { old, new } => vec![
                format!("old: {}", format_scalar(old)),
                format!("new: {}", format_scalar(new)),
            ],
            Descent::Converged { value } => vec![format!("old: {}", format_scalar(value))],
        }
    }
}

/// Decides one step without touching the filesystem.
pub fn decide(old: Scalar, grad: Scalar, grad_threshold: f64, learning_rate: f64) -> Descent {
    if grad.abs() > grad_threshold {
        Descent::Continue {
            old,
            new: old - learning_rate * grad,
        }
    } else {
        Descent::Converged { value: old }
    }
}

/// Reads `approx_old` and `grad` from `ws`, then writes `approx_new` or
/// `solution` and appends to `approx_log`.
///
/// Both inputs are parsed before anything is written.
pub fn run(
    ws: &Workspace,
    grad_threshold: f64,
    learning_rate: f64,
    bus: &EventBus,
) -> FlowResult<Descent> {
    let old = ws.read_scalar(FlowFile::ApproxOld)?;
    let grad = ws.read_scalar(FlowFile::Grad)?;

    let step = decide(old, grad, grad_threshold, learning_rate);
    match step {
        Descent::Continue { new, .. } => ws.write_scalar(FlowFile::ApproxNew, new)?,
        Descent::Converged { value } => ws.write_scalar(FlowFile::Solution, value)?,
    }
    ws.append_lines(FlowFile::ApproxLog, &step.log_lines())?;

    bus.emit(StepEvent::new(
        StepName::Update,
        EventKind::Descent {
            old,
            grad,
            new: match step {
                Descent::Continue { new, .. } => Some(new),
                Descent::Converged { .. } => None,
            },
            converged: step.is_converged(),
        },
    ));
    Ok(step)
}
