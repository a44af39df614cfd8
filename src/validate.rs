//! Local input validation.
//!
//! Runs before any request is issued; a validation failure means no network
//! traffic at all. Mirrors the checks the server enforces on its creation
//! form: a required project name, a `.csv` input dataframe, and a `.json`
//! parameter file.

use crate::consts::validation::{INPUT_DATAFRAME_EXTENSION, PARAM_FILE_EXTENSION};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Project name is required")]
    MissingProjectName,

    #[error("Please select a CSV file.")]
    NotACsvFile,

    #[error("Please select a JSON file.")]
    NotAJsonFile,
}

/// A project name must be non-empty after trimming.
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingProjectName);
    }
    Ok(())
}

/// The input dataframe must end in `.csv`, case-insensitively.
pub fn validate_input_dataframe(path: &Path) -> Result<(), ValidationError> {
    if !has_extension(path, INPUT_DATAFRAME_EXTENSION) {
        return Err(ValidationError::NotACsvFile);
    }
    Ok(())
}

/// The parameter file must end in `.json`, case-insensitively.
pub fn validate_param_file(path: &Path) -> Result<(), ValidationError> {
    if !has_extension(path, PARAM_FILE_EXTENSION) {
        return Err(ValidationError::NotAJsonFile);
    }
    Ok(())
}

/// Suffix check on the file name, not `Path::extension`, so that names like
/// `archive.tar.csv` and dotfiles behave the same way the server's own
/// extension validator does.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            name.to_lowercase()
                .ends_with(&format!(".{}", extension.to_lowercase()))
        })
        .unwrap_or(false)
}
