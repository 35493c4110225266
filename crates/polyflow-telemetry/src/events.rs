//! Step event types.
//!
//! Structured events emitted by the workflow steps. Events are small
//! value types carrying just enough data to audit a run.

use serde::{Deserialize, Serialize};

/// Which workflow step emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Decompose,
    Recompose,
    Compare,
    Update,
    Generate,
}

impl StepName {
    /// Short name, as used for the CLI subcommand.
    pub fn as_str(self) -> &'static str {
        match self {
            StepName::Decompose => "svd",
            StepName::Recompose => "mult",
            StepName::Compare => "cmp",
            StepName::Update => "subtract",
            StepName::Generate => "gen",
        }
    }
}

/// A workflow event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Emitting step.
    pub step: StepName,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A matrix was read from a file or stream.
    MatrixRead {
        /// File name, or `-` for standard input.
        source: String,
        rows: usize,
        cols: usize,
    },

    /// A matrix was written to a file or stream.
    MatrixWritten {
        /// File name, or `-` for standard output.
        target: String,
        rows: usize,
        cols: usize,
    },

    /// SVD completed.
    Decomposed {
        /// Number of singular values.
        rank_bound: usize,
        /// Largest singular value (0 for an empty matrix).
        largest: f64,
        /// Smallest singular value (0 for an empty matrix).
        smallest: f64,
    },

    /// Comparator result.
    Compared {
        /// Frobenius norm of the difference.
        norm: f64,
        tolerance: f64,
        passed: bool,
    },

    /// Step-updater result.
    Descent {
        old: f64,
        grad: f64,
        /// Next approximation; `None` once converged.
        new: Option<f64>,
        converged: bool,
    },
}

impl StepEvent {
    /// Creates a new event for the given step.
    pub fn new(step: StepName, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
