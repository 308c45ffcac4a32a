//! Error taxonomy for configuration loading, normalization and manifest updates

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while turning a build configuration into a manifest
///
/// A blocked safe update is not represented here: it is a reported
/// [`Outcome`](crate::update::Outcome), not a failure of the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input document does not exist
    #[error("Configuration file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// The input document is not valid YAML
    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document matches neither known dialect
    #[error("Unrecognized configuration dialect: {0}")]
    UnrecognizedDialect(String),

    /// A dependency declaration fails its shape contract
    #[error("Malformed dependency '{entry}' at {location}")]
    MalformedDependency { entry: String, location: String },

    /// A model field has the wrong type or value
    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// Local file I/O failed
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Self-check produced a dependency list different from the expected one
    #[error("Self-check mismatch for {document}: expected {expected:?}, got {actual:?}")]
    SelfCheckMismatch {
        document: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(entry: impl Into<String>, location: impl Into<String>) -> Self {
        ConfigError::MalformedDependency {
            entry: entry.into(),
            location: location.into(),
        }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_dependency_names_entry_and_location() {
        let err = ConfigError::malformed("material", "libraries.androidx[0]");
        let msg = err.to_string();
        assert!(msg.contains("'material'"));
        assert!(msg.contains("libraries.androidx[0]"));
    }

    #[test]
    fn test_missing_input_file_message() {
        let err = ConfigError::MissingInputFile(PathBuf::from("/tmp/nope.yaml"));
        assert_eq!(err.to_string(), "Configuration file not found: /tmp/nope.yaml");
    }

    #[test]
    fn test_self_check_mismatch_lists_both_sides() {
        let err = ConfigError::SelfCheckMismatch {
            document: "flat".to_string(),
            expected: vec!["a:b:1".to_string()],
            actual: vec![],
        };
        let msg = err.to_string();
        assert!(msg.contains("a:b:1"));
        assert!(msg.contains("[]"));
    }
}
