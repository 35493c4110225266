//! File contract between the workflow steps.
//!
//! Steps never talk to each other directly. Each one reads and writes
//! named files inside a working directory, and these types make that
//! directory and its file names explicit.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use polyflow_math::Matrix;
use polyflow_types::constants;
use polyflow_types::{FlowError, FlowResult, Scalar};

use crate::text;

/// A file slot on the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowFile {
    /// Computed matrix checked by the comparator.
    MatrixIn,
    /// Expected matrix checked by the comparator.
    MatrixOut,
    /// Left singular vectors.
    FactorU,
    /// Diagonal matrix of singular values.
    FactorS,
    /// Transposed right singular vectors.
    FactorVt,
    /// Current approximation.
    ApproxOld,
    /// Gradient at the current approximation.
    Grad,
    /// Next approximation.
    ApproxNew,
    /// Converged value.
    Solution,
    /// Step-updater audit log.
    ApproxLog,
}

impl FlowFile {
    /// Every slot, in contract order.
    pub fn all() -> &'static [FlowFile] {
        &[
            FlowFile::MatrixIn,
            FlowFile::MatrixOut,
            FlowFile::FactorU,
            FlowFile::FactorS,
            FlowFile::FactorVt,
            FlowFile::ApproxOld,
            FlowFile::Grad,
            FlowFile::ApproxNew,
            FlowFile::Solution,
            FlowFile::ApproxLog,
        ]
    }
}

/// File names for every contract slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub matrix_in: String,
    pub matrix_out: String,
    pub factor_u: String,
    pub factor_s: String,
    pub factor_vt: String,
    pub approx_old: String,
    pub grad: String,
    pub approx_new: String,
    pub solution: String,
    pub approx_log: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            matrix_in: constants::MATRIX_IN.to_string(),
            matrix_out: constants::MATRIX_OUT.to_string(),
            factor_u: constants::FACTOR_U.to_string(),
            factor_s: constants::FACTOR_S.to_string(),
            factor_vt: constants::FACTOR_VT.to_string(),
            approx_old: constants::APPROX_OLD.to_string(),
            grad: constants::GRAD.to_string(),
            approx_new: constants::APPROX_NEW.to_string(),
            solution: constants::SOLUTION.to_string(),
            approx_log: constants::APPROX_LOG.to_string(),
        }
    }
}

impl FileNames {
    /// File name assigned to `file`.
    pub fn name(&self, file: FlowFile) -> &str {
        match file {
            FlowFile::MatrixIn => &self.matrix_in,
            FlowFile::MatrixOut => &self.matrix_out,
            FlowFile::FactorU => &self.factor_u,
            FlowFile::FactorS => &self.factor_s,
            FlowFile::FactorVt => &self.factor_vt,
            FlowFile::ApproxOld => &self.approx_old,
            FlowFile::Grad => &self.grad,
            FlowFile::ApproxNew => &self.approx_new,
            FlowFile::Solution => &self.solution,
            FlowFile::ApproxLog => &self.approx_log,
        }
    }
}

/// A working directory plus the names of the contract files inside it.
///
/// All reads and writes resolve against `root`; nothing depends on the
/// process working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    files: FileNames,
}

impl Workspace {
    /// Workspace at `root` with the default file names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_files(root, FileNames::default())
    }

    /// Workspace at `root` with custom file names.
    pub fn with_files(root: impl Into<PathBuf>, files: FileNames) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// The working directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file name table.
    pub fn files(&self) -> &FileNames {
        &self.files
    }

    /// Full path of a contract file.
    pub fn path(&self, file: FlowFile) -> PathBuf {
        self.root.join(self.files.name(file))
    }

    /// Returns true if the contract file exists.
    pub fn exists(&self, file: FlowFile) -> bool {
        self.path(file).is_file()
    }

    /// Reads a matrix file.
    pub fn read_matrix(&self, file: FlowFile) -> FlowResult<Matrix> {
        let path = self.path(file);
        let handle = File::open(&path).map_err(|e| FlowError::file(&path, e))?;
        text::read_matrix(BufReader::new(handle))
    }

    /// Writes a matrix file, replacing any previous content.
    pub fn write_matrix(&self, file: FlowFile, matrix: &Matrix) -> FlowResult<()> {
        let path = self.path(file);
        let handle = File::create(&path).map_err(|e| FlowError::file(&path, e))?;
        text::write_matrix(handle, matrix)
    }

    /// Where `file` is written before being moved into place.
    pub fn staging_path(&self, file: FlowFile) -> PathBuf {
        self.root().join(format!(".{}.partial", self.files.name(file)))
    }

    /// Writes several matrix files as one unit.
    ///
    /// Every matrix is first written to its staging path. The contract
    /// names are replaced only after all writes succeed; on a failed write
    /// the staged files are removed and the previous files stay intact.
    pub fn write_matrices(&self, entries: &[(FlowFile, &Matrix)]) -> FlowResult<()> {
        let mut staged: Vec<(FlowFile, PathBuf)> = Vec::with_capacity(entries.len());
        for &(file, matrix) in entries {
            let tmp = self.staging_path(file);
            let written = File::create(&tmp)
                .map_err(|e| FlowError::file(&tmp, e))
                .and_then(|handle| text::write_matrix(handle, matrix));
            if let Err(e) = written {
                for (_, path) in &staged {
                    let _ = fs::remove_file(path);
                }
                if tmp.is_file() {
                    let _ = fs::remove_file(&tmp);
                }
                return Err(e);
            }
            staged.push((file, tmp));
        }
        for (file, tmp) in staged {
            let path = self.path(file);
            fs::rename(&tmp, &path).map_err(|e| FlowError::file(&path, e))?;
        }
        Ok(())
    }

    /// Reads a scalar file.
    pub fn read_scalar(&self, file: FlowFile) -> FlowResult<Scalar> {
        let path = self.path(file);
        let content = fs::read_to_string(&path).map_err(|e| FlowError::file(&path, e))?;
        text::parse_scalar(&content)
    }

    /// Writes a scalar file, replacing any previous content.
    pub fn write_scalar(&self, file: FlowFile, value: Scalar) -> FlowResult<()> {
        let path = self.path(file);
        let handle = File::create(&path).map_err(|e| FlowError::file(&path, e))?;
        text::write_scalar(handle, value)
    }

    /// Appends lines to a file, creating it if missing.
    pub fn append_lines<S: AsRef<str>>(&self, file: FlowFile, lines: &[S]) -> FlowResult<()> {
        let path = self.path(file);
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| FlowError::file(&path, e))?;
        for line in lines {
            writeln!(handle, "{}", line.as_ref()).map_err(|e| FlowError::file(&path, e))?;
        }
        Ok(())
    }
}
