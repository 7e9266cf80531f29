//! Error types for spork-store

use std::path::PathBuf;

use thiserror::Error;

/// What kind of object a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Cookbook,
    Environment,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Cookbook => write!(f, "cookbook"),
            ObjectKind::Environment => write!(f, "environment"),
        }
    }
}

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested object does not exist in this store
    #[error("{kind} not found: {name}")]
    NotFound { kind: ObjectKind, name: String },

    /// More than one directory could receive a manifest write
    #[error("cannot choose where to save {name}.json: {} candidate directories", .candidates.len())]
    AmbiguousTarget {
        name: String,
        candidates: Vec<PathBuf>,
        /// Rendered manifest the caller may print instead of writing.
        rendered: String,
    },

    /// Cookbook metadata present but unreadable
    #[error("invalid metadata for cookbook {cookbook}: {reason}")]
    InvalidMetadata { cookbook: String, reason: String },

    /// Remote store answered with a non-success status
    #[error("remote store returned {status} for {name}")]
    Remote { status: u16, name: String },

    /// Transport-level HTTP failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn environment_not_found(name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: ObjectKind::Environment,
            name: name.into(),
        }
    }

    pub fn cookbook_not_found(name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: ObjectKind::Cookbook,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_kind_and_object() {
        let err = StoreError::cookbook_not_found("apache2");
        assert_eq!(err.to_string(), "cookbook not found: apache2");
        assert!(err.is_not_found());

        let err = StoreError::environment_not_found("production");
        assert_eq!(err.to_string(), "environment not found: production");
    }

    #[test]
    fn ambiguous_target_reports_candidate_count() {
        let err = StoreError::AmbiguousTarget {
            name: "staging".to_string(),
            candidates: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            rendered: "{}".to_string(),
        };
        assert!(err.to_string().contains("staging.json"));
        assert!(err.to_string().contains("2 candidate"));
        assert!(!err.is_not_found());
    }
}
