//! Singular value decomposition.
//!
//! Wraps `faer`'s dense SVD and returns the factors as row-major
//! [`Matrix`] values with V already transposed, matching the
//! `A = U · diag(S) · VT` convention of the factor files.

use faer::linalg::solvers::{Svd, SvdError};
use serde::{Deserialize, Serialize};

use polyflow_types::{FlowError, FlowResult, Scalar};

use crate::matrix::Matrix;

/// Which factor shapes to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvdMode {
    /// U is m×m and VT is n×n.
    #[default]
    Full,
    /// U is m×k and VT is k×n with k = min(m, n).
    Thin,
}

/// Result of an SVD: `A = U · diag(singular_values) · VT`.
#[derive(Debug, Clone)]
pub struct SvdFactors {
    /// Left singular vectors.
    pub u: Matrix,
    /// Singular values, non-increasing, length min(m, n).
    pub singular_values: Vec<Scalar>,
    /// Right singular vectors, transposed.
    pub vt: Matrix,
}

impl SvdFactors {
    /// Number of singular values, min(m, n).
    pub fn rank_bound(&self) -> usize {
        self.singular_values.len()
    }

    /// Singular values expanded into a square diagonal matrix.
    pub fn sigma(&self) -> Matrix {
        Matrix::from_diagonal(&self.singular_values)
    }
}

/// Computes the SVD of `a`.
///
/// A matrix with a zero dimension decomposes into empty factors
/// of the requested shapes without calling into `faer`.
pub fn svd(a: &Matrix, mode: SvdMode) -> FlowResult<SvdFactors> {
    let (m, n) = a.shape();
    let k = m.min(n);

    if k == 0 {
        let (u, vt) = match mode {
            SvdMode::Full => (Matrix::identity(m), Matrix::identity(n)),
            SvdMode::Thin => (Matrix::zeros(m, 0), Matrix::zeros(0, n)),
        };
        return Ok(SvdFactors {
            u,
            singular_values: Vec::new(),
            vt,
        });
    }

    let mat = a.to_faer();
    let result = match mode {
        SvdMode::Full => Svd::new(mat.as_ref()),
        SvdMode::Thin => Svd::new_thin(mat.as_ref()),
    }
    .map_err(|e: SvdError| FlowError::Decomposition(format!("{e:?}")))?;

    let u = Matrix::from_faer(result.U());
    let s_diag = result.S();
    let singular_values: Vec<Scalar> = (0..k).map(|i| s_diag[i]).collect();
    let vt = Matrix::from_faer(result.V()).transpose();

    Ok(SvdFactors {
        u,
        singular_values,
        vt,
    })
}
