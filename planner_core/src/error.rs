//! Error types for the planner_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for planner_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persisted document is malformed or incomplete
    #[error("Data file {path:?} is corrupted: {reason}")]
    DataCorruption { path: PathBuf, reason: String },

    /// An exercise type with this code already exists
    #[error("Exercise type with code '{0}' already exists")]
    DuplicateCode(String),

    /// A unit is missing parameters required by its exercise type
    #[error("Missing parameters for exercise type '{code}': {}", .missing.join(", "))]
    MissingParameters { code: String, missing: Vec<String> },

    /// A parameter value or declaration doesn't fit its declared type
    #[error("Invalid parameter '{name}' (expected {expected}): {reason}")]
    InvalidParameter {
        name: String,
        expected: String,
        reason: String,
    },

    /// Generic input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Background save failed
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Whether this is a recoverable input problem the caller should report and move past
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateCode(_)
                | Error::MissingParameters { .. }
                | Error::InvalidParameter { .. }
                | Error::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters_message_lists_keys() {
        let err = Error::MissingParameters {
            code: "SPRINT".into(),
            missing: vec!["distance_m".into(), "repetitions".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing parameters for exercise type 'SPRINT': distance_m, repetitions"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_corruption_is_not_validation() {
        let err = Error::DataCorruption {
            path: PathBuf::from("data.json"),
            reason: "missing field `players`".into(),
        };
        assert!(!err.is_validation());
    }
}
