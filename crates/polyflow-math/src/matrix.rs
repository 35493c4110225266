//! Dense row-major matrix.
//!
//! This is the in-memory form of the text matrices on the file contract.
//! Heavy numerical work (products, SVD) goes through `faer`; the
//! conversions live here so every caller shares one layout convention.

use faer::{Mat, MatRef};
use serde::{Deserialize, Serialize};

use polyflow_types::{FlowError, FlowResult, Scalar};

/// Dense rectangular matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row-major values (length = rows * cols).
    data: Vec<Scalar>,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates the n×n identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    /// Expands a vector into a square diagonal matrix.
    pub fn from_diagonal(diag: &[Scalar]) -> Self {
        let n = diag.len();
        let mut m = Self::zeros(n, n);
        for (i, &d) in diag.iter().enumerate() {
            m.data[i * n + i] = d;
        }
        m
    }

    /// Creates a matrix from a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<Scalar>) -> FlowResult<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(FlowError::BufferLength {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Creates a matrix from nested rows.
    ///
    /// All rows must have the length of the first one. Errors report
    /// the offending row as a 1-based line number.
    pub fn from_rows(rows: Vec<Vec<Scalar>>) -> FlowResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(FlowError::RaggedRow {
                    line: i + 1,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns true if the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at `(i, j)`.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Scalar {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j]
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[Scalar] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterates over rows as slices. Yields nothing for a 0-column matrix.
    pub fn row_iter(&self) -> impl Iterator<Item = &[Scalar]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Flat row-major view of all elements.
    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        t
    }

    /// Elementwise difference `self - other`.
    pub fn sub(&self, other: &Matrix) -> FlowResult<Matrix> {
        if self.shape() != other.shape() {
            return Err(FlowError::ShapeMismatch {
                op: "subtract",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Squared Frobenius norm: Σ a_ij².
    pub fn frobenius_norm_sq(&self) -> Scalar {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Frobenius norm: sqrt(Σ a_ij²).
    pub fn frobenius_norm(&self) -> Scalar {
        self.frobenius_norm_sq().sqrt()
    }

    /// Frobenius norm of `self - other`.
    pub fn frobenius_distance(&self, other: &Matrix) -> FlowResult<Scalar> {
        Ok(self.sub(other)?.frobenius_norm())
    }

    /// Copies into a column-major `faer` matrix.
    pub fn to_faer(&self) -> Mat<Scalar> {
        Mat::from_fn(self.rows, self.cols, |i, j| self.data[i * self.cols + j])
    }

    /// Copies out of a `faer` matrix view.
    pub fn from_faer(mat: MatRef<'_, Scalar>) -> Self {
        let (rows, cols) = (mat.nrows(), mat.ncols());
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(mat[(i, j)]);
            }
        }
        Self { rows, cols, data }
    }
}
