//! Whitespace-separated text codec for matrices and scalars.
//!
//! Matrices are one row per line with values split on any whitespace;
//! blank lines are skipped. Scalars are the first line of a file.
//! Values are written in shortest round-trip form (`5.0`, `4.998`,
//! `1e-7`) so a written file reparses to the same bits.

use std::io::{BufRead, Write};

use polyflow_math::Matrix;
use polyflow_types::{FlowError, FlowResult, Scalar};

/// Formats a scalar in shortest round-trip form with a trailing `.0`
/// for integral values.
pub fn format_scalar(value: Scalar) -> String {
    format!("{value:?}")
}

fn parse_token(token: &str, line: usize) -> FlowResult<Scalar> {
    token.parse::<Scalar>().map_err(|_| FlowError::Parse {
        line,
        token: token.to_string(),
    })
}

/// Reads a matrix from text.
///
/// Every non-blank line is a row. All rows must have the same length.
pub fn read_matrix<R: BufRead>(reader: R) -> FlowResult<Matrix> {
    let mut rows: Vec<Vec<Scalar>> = Vec::new();
    let mut width: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let row = line
            .split_whitespace()
            .map(|tok| parse_token(tok, line_no))
            .collect::<FlowResult<Vec<_>>>()?;
        if row.is_empty() {
            continue;
        }
        match width {
            None => width = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(FlowError::RaggedRow {
                    line: line_no,
                    expected,
                    found: row.len(),
                });
            }
            Some(_) => {}
        }
        rows.push(row);
    }

    Matrix::from_rows(rows)
}

/// Parses a matrix from an in-memory string.
pub fn parse_matrix(text: &str) -> FlowResult<Matrix> {
    read_matrix(text.as_bytes())
}

/// Writes a matrix, one space-separated row per line.
pub fn write_matrix<W: Write>(mut writer: W, matrix: &Matrix) -> FlowResult<()> {
    for row in matrix.row_iter() {
        let line: Vec<String> = row.iter().map(|&v| format_scalar(v)).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders a matrix to a string in the same format as [`write_matrix`].
pub fn matrix_to_string(matrix: &Matrix) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_matrix(&mut buf, matrix);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parses a scalar from the first line of `text`.
pub fn parse_scalar(text: &str) -> FlowResult<Scalar> {
    let first = text.lines().next().map(str::trim).unwrap_or_default();
    if first.is_empty() {
        return Err(FlowError::EmptyScalar);
    }
    parse_token(first, 1)
}

/// Writes a scalar followed by a newline.
pub fn write_scalar<W: Write>(mut writer: W, value: Scalar) -> FlowResult<()> {
    writeln!(writer, "{}", format_scalar(value))?;
    writer.flush()?;
    Ok(())
}
