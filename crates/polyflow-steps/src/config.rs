//! Step configuration.
//!
//! Tolerances, step size, SVD factor shape, and contract file names.
//! Every field has a default, so an empty TOML file is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use polyflow_io::validator::validate_file_names;
use polyflow_io::{FileNames, Workspace};
use polyflow_math::SvdMode;
use polyflow_types::constants::{COMPARE_TOLERANCE, GRAD_THRESHOLD, LEARNING_RATE};
use polyflow_types::{FlowError, FlowResult};

/// Configuration shared by all workflow steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Comparator passes when the Frobenius distance is strictly below this.
    pub compare_tolerance: f64,

    /// Step-updater keeps descending while |grad| is above this.
    pub grad_threshold: f64,

    /// Gradient step size.
    pub learning_rate: f64,

    /// Factor shapes written by the decomposer.
    pub svd_mode: SvdMode,

    /// Contract file names.
    pub files: FileNames,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            compare_tolerance: COMPARE_TOLERANCE,
            grad_threshold: GRAD_THRESHOLD,
            learning_rate: LEARNING_RATE,
            svd_mode: SvdMode::Full,
            files: FileNames::default(),
        }
    }
}

impl FlowConfig {
    /// Parses a config from TOML text and validates it.
    pub fn from_toml_str(content: &str) -> FlowResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FlowError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> FlowResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| FlowError::file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> FlowResult<String> {
        toml::to_string(self).map_err(|e| FlowError::Serialization(e.to_string()))
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> FlowResult<()> {
        positive("compare_tolerance", self.compare_tolerance)?;
        positive("grad_threshold", self.grad_threshold)?;
        positive("learning_rate", self.learning_rate)?;
        validate_file_names(&self.files)
    }

    /// Workspace rooted at `root` using this config's file names.
    pub fn workspace(&self, root: impl Into<std::path::PathBuf>) -> Workspace {
        Workspace::with_files(root, self.files.clone())
    }
}

fn positive(field: &str, value: f64) -> FlowResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FlowError::InvalidConfig(format!(
            "{field} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}
