//! Error types for entity resolution and code generation

use thiserror::Error;

/// Result type for entity operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Entity resolution errors
///
/// Every variant is fatal for a generation run: nothing is written when any
/// of them is returned.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Root message not found for {path}: expected message '{expected}'")]
    MissingRootMessage { path: String, expected: String },

    #[error("Missing required attribute '{attribute}' on <{element}> in {path}")]
    MissingAttribute {
        path: String,
        element: String,
        attribute: String,
    },

    #[error("Array message '{message}' in {path} has no definition message")]
    MissingDefinition { path: String, message: String },

    #[error("Version mismatch in {path}: '{reference}' requests version {requested} but {target} resolved to version {resolved}")]
    VersionMismatch {
        path: String,
        reference: String,
        target: String,
        requested: String,
        resolved: String,
    },

    #[error("Unsupported combination in {path}: message '{message}' declares multiple parents and multiple interfaces")]
    UnsupportedCombination { path: String, message: String },

    #[error("Cyclic entity reference: {}", cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },

    #[error("Document not loaded: {path}")]
    UnknownDocument { path: String },

    #[error("Invalid entity reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("Unknown operation method '{method}' in {path}")]
    UnknownMethod { path: String, method: String },

    #[error("XML error in {path}: {message}")]
    Xml { path: String, message: String },

    #[error("Incompatible tool version {current}, required: {required}")]
    IncompatibleVersion { current: String, required: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

impl SchemaError {
    pub(crate) fn missing_attribute(path: &str, element: &str, attribute: &str) -> Self {
        SchemaError::MissingAttribute {
            path: path.to_string(),
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn xml(path: &str, message: impl std::fmt::Display) -> Self {
        SchemaError::Xml {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = SchemaError::CyclicReference {
            cycle: vec!["a/A".into(), "b/B".into(), "a/A".into()],
        };
        assert_eq!(err.to_string(), "Cyclic entity reference: a/A -> b/B -> a/A");
    }

    #[test]
    fn test_version_mismatch_names_offending_path() {
        let err = SchemaError::VersionMismatch {
            path: "club/Member".into(),
            reference: "navajo://common/Person.2".into(),
            target: "common/Person".into(),
            requested: "2".into(),
            resolved: "3".into(),
        };
        let message = err.to_string();
        assert!(message.contains("club/Member"));
        assert!(message.contains("navajo://common/Person.2"));
    }
}
