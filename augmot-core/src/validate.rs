//! Validation rules shared by config loading and the interactive setup.

use crate::error::ConfigError;
use crate::types::{BiasRatio, ClassThresholds};
use std::path::{Path, PathBuf};

const AFFIRMATIVE: &[&str] = &["y", "Y", "yes", "YES", "Yes", "1"];
const DEFAULT_FOLDER: &[&str] = &["default", "DEFAULT", "Default"];

/// Whether a yes/no answer counts as "yes". Matching is exact.
pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE.contains(&answer.trim())
}

/// Whether an answer accepts the default results folder.
pub fn accepts_default_folder(answer: &str) -> bool {
    is_affirmative(answer) || DEFAULT_FOLDER.contains(&answer.trim())
}

/// Require `path` to exist on disk.
pub fn validate_folder(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(ConfigError::FolderNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Parse and range-check a bias ratio typed by a user.
pub fn parse_bias_ratio(text: &str) -> Result<BiasRatio, ConfigError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| ConfigError::ParseError {
            message: format!("'{}' is not a number", text.trim()),
        })?;
    BiasRatio::new(value)
}

/// Every threshold must be finite and non-negative.
pub fn validate_thresholds(thresholds: &ClassThresholds) -> Result<(), ConfigError> {
    for (class, &value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                class: class.clone(),
                value,
            });
        }
    }
    Ok(())
}

/// Method names become file names, so they must be a single path component.
pub fn validate_method_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name == "." || name == ".." {
        Some("must not be a relative directory")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigError::InvalidField {
            field: "augmentation.name".into(),
            reason: format!("'{}' {}", name, reason),
        }),
        None => Ok(()),
    }
}
