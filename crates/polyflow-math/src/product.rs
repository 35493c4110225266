//! Dense matrix products backed by `faer`.

use polyflow_types::{FlowError, FlowResult};

use crate::matrix::Matrix;

/// Computes `lhs × rhs`.
///
/// Returns [`FlowError::ShapeMismatch`] unless `lhs.cols() == rhs.rows()`.
pub fn matmul(lhs: &Matrix, rhs: &Matrix) -> FlowResult<Matrix> {
    if lhs.cols() != rhs.rows() {
        return Err(FlowError::ShapeMismatch {
            op: "multiply",
            left: lhs.shape(),
            right: rhs.shape(),
        });
    }
    let product = &lhs.to_faer() * &rhs.to_faer();
    Ok(Matrix::from_faer(product.as_ref()))
}

/// Multiplies a chain of matrices left to right.
///
/// An empty chain has no defined shape and is rejected.
pub fn chain_product(factors: &[&Matrix]) -> FlowResult<Matrix> {
    let (first, rest) = factors.split_first().ok_or(FlowError::EmptyChain)?;
    rest.iter()
        .try_fold((*first).clone(), |acc, next| matmul(&acc, next))
}
