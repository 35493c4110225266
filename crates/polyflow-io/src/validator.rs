//! Contract validation.
//!
//! Catches unusable file name tables before a step touches the disk.

use std::collections::HashSet;

use polyflow_types::{FlowError, FlowResult};

use crate::contract::{FileNames, FlowFile};

/// Validates a file name table.
///
/// Checks:
/// - Every name is non-empty
/// - Names are plain file names (no path separators, not `.` or `..`)
/// - No two slots share a name
pub fn validate_file_names(files: &FileNames) -> FlowResult<()> {
    let mut seen = HashSet::new();
    for &slot in FlowFile::all() {
        let name = files.name(slot);
        if name.trim().is_empty() {
            return Err(FlowError::InvalidConfig(format!(
                "File name for {slot:?} is empty"
            )));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(FlowError::InvalidConfig(format!(
                "File name for {slot:?} must not contain a path separator: '{name}'"
            )));
        }
        if name == "." || name == ".." {
            return Err(FlowError::InvalidConfig(format!(
                "File name for {slot:?} must not be '{name}'"
            )));
        }
        if !seen.insert(name) {
            return Err(FlowError::InvalidConfig(format!(
                "File name '{name}' is used by more than one slot"
            )));
        }
    }
    Ok(())
}
