//! Error types for the augmot core library.
//!
//! Uses `thiserror` for public API error types, split into configuration
//! problems (caught once at load time) and runtime contract violations.

use std::path::PathBuf;

/// Top-level error type for the augmot core library.
#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    #[error("Unknown augmentation method: {identifier}")]
    UnknownMethod { identifier: String },

    #[error("Augmentation method already registered: {identifier}")]
    DuplicateMethod { identifier: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No map ratio for class '{class}'")]
    MissingClassRatio { class: String },

    #[error(
        "Affinity matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}"
    )]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Method returned {actual} {kind} features, expected {expected}")]
    FeatureCountMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Score {value} is outside [0, 1] and is not the skip value -1")]
    InvalidScore { value: f64 },

    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system and the setup validation rules.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Bias ratio {value} outside of permitted range [0, 1]")]
    InvalidBiasRatio { value: f64 },

    #[error("Folder does not exist: {path}")]
    FolderNotFound { path: PathBuf },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid threshold {value} for class '{class}'")]
    InvalidThreshold { class: String, value: f64 },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

impl AugmentError {
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt {
            message: msg.into(),
        }
    }

    pub fn unknown_method(identifier: impl Into<String>) -> Self {
        Self::UnknownMethod {
            identifier: identifier.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::ParseError {
            message: err.to_string(),
        }
    }
}

/// A type alias for results using the top-level `AugmentError`.
pub type Result<T> = std::result::Result<T, AugmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_method() {
        let err = AugmentError::unknown_method("vis_sim_3d");
        assert_eq!(err.to_string(), "Unknown augmentation method: vis_sim_3d");
    }

    #[test]
    fn test_error_display_config() {
        let err = AugmentError::Config(ConfigError::InvalidBiasRatio { value: 1.5 });
        assert_eq!(
            err.to_string(),
            "Configuration error: Bias ratio 1.5 outside of permitted range [0, 1]"
        );
    }

    #[test]
    fn test_error_display_folder() {
        let err = ConfigError::FolderNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert_eq!(err.to_string(), "Folder does not exist: /no/such/dir");
    }

    #[test]
    fn test_error_display_shape() {
        let err = AugmentError::ShapeMismatch {
            expected_rows: 2,
            expected_cols: 3,
            rows: 3,
            cols: 2,
        };
        assert_eq!(err.to_string(), "Affinity matrix is 3x2, expected 2x3");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AugmentError = io_err.into();
        assert!(matches!(err, AugmentError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AugmentError = serde_err.into();
        assert!(matches!(err, AugmentError::Serialization(_)));
    }
}
