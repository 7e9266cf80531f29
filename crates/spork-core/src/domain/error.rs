//! Domain-level error taxonomy for Spork.

use spork_store::{ObjectKind, StoreError};

/// Notification channel identifiers, used in errors and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Paste,
    Chat,
    Metrics,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Paste => write!(f, "paste"),
            Channel::Chat => write!(f, "chat"),
            Channel::Metrics => write!(f, "metrics"),
        }
    }
}

/// Spork domain errors.
#[derive(Debug, thiserror::Error)]
pub enum SporkError {
    #[error("{0}")]
    Usage(String),

    #[error("{version} isn't a valid version number")]
    InvalidVersionFormat { version: String },

    #[error("cookbook not found: {0}")]
    CookbookNotFound(String),

    #[error("environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("the environment {0} does not exist on the server")]
    RemoteEnvironmentNotFound(String),

    #[error("multiple storage paths configured, not sure where to save {environment}.json")]
    AmbiguousPersistenceTarget {
        environment: String,
        /// Pretty manifest to show the operator instead.
        rendered: String,
    },

    #[error("source sync failed: {0}")]
    SourceSync(String),

    #[error("{channel} notification failed: {message}")]
    Notification { channel: Channel, message: String },

    #[error("storage error: {0}")]
    Store(StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SporkError {
    /// Whether the error ends the run. Non-fatal errors are reported and the
    /// run continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SporkError::InvalidVersionFormat { .. }
                | SporkError::AmbiguousPersistenceTarget { .. }
                | SporkError::SourceSync(_)
                | SporkError::Notification { .. }
        )
    }
}

impl From<StoreError> for SporkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound {
                kind: ObjectKind::Cookbook,
                name,
            } => SporkError::CookbookNotFound(name),
            StoreError::NotFound {
                kind: ObjectKind::Environment,
                name,
            } => SporkError::EnvironmentNotFound(name),
            StoreError::AmbiguousTarget { name, rendered, .. } => {
                SporkError::AmbiguousPersistenceTarget {
                    environment: name,
                    rendered,
                }
            }
            other => SporkError::Store(other),
        }
    }
}

/// Result type for Spork domain operations.
pub type Result<T> = std::result::Result<T, SporkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_onto_domain_variants() {
        let err: SporkError = StoreError::cookbook_not_found("ntp").into();
        assert!(matches!(err, SporkError::CookbookNotFound(ref n) if n == "ntp"));

        let err: SporkError = StoreError::environment_not_found("prod").into();
        assert!(matches!(err, SporkError::EnvironmentNotFound(ref n) if n == "prod"));
    }

    #[test]
    fn other_store_errors_are_wrapped() {
        let err: SporkError = StoreError::Remote {
            status: 500,
            name: "prod".to_string(),
        }
        .into();
        assert!(matches!(err, SporkError::Store(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn invalid_version_display_matches_operator_message() {
        let err = SporkError::InvalidVersionFormat {
            version: "notaversion".to_string(),
        };
        assert_eq!(err.to_string(), "notaversion isn't a valid version number");
    }

    #[test]
    fn fatality() {
        assert!(SporkError::Usage("x".into()).is_fatal());
        assert!(SporkError::CookbookNotFound("x".into()).is_fatal());
        assert!(!SporkError::SourceSync("x".into()).is_fatal());
        assert!(!SporkError::Notification {
            channel: Channel::Chat,
            message: "refused".into()
        }
        .is_fatal());
    }
}
