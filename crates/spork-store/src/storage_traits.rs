//! Storage trait definitions for Spork
//!
//! These traits define the data-access seams the promotion engine relies on:
//! - `CookbookSource`: enumerate cookbooks and read their current version
//! - `EnvironmentStore`: load/save environment manifests in the working tree
//! - `RemoteEnvironmentStore`: load/upload environment manifests on a server
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::schema::Environment;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// CookbookSource
// ---------------------------------------------------------------------------

/// Read-only view of the cookbooks available in a source tree.
///
/// Guarantees:
/// - `list_cookbooks` returns each name once, in a stable order.
/// - `cookbook_version` returns `StoreError::NotFound` for unknown names.
#[async_trait]
pub trait CookbookSource: Send + Sync {
    /// Every cookbook name known to the source.
    async fn list_cookbooks(&self) -> StoreResult<Vec<String>>;

    /// The raw version string from the named cookbook's metadata.
    async fn cookbook_version(&self, name: &str) -> StoreResult<String>;
}

// ---------------------------------------------------------------------------
// EnvironmentStore
// ---------------------------------------------------------------------------

/// Where a saved manifest ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedManifest {
    pub path: PathBuf,
}

/// Environment manifests kept alongside the cookbooks.
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    /// Load the manifest for `name`. Returns `StoreError::NotFound` if absent.
    async fn load(&self, name: &str) -> StoreResult<Environment>;

    /// Persist the manifest as `name`, the name it was loaded under. The
    /// document's own `name` field does not pick the target.
    ///
    /// Returns `StoreError::AmbiguousTarget` (carrying the rendered manifest)
    /// when the store cannot decide which location to write.
    async fn save(&self, name: &str, environment: &Environment) -> StoreResult<SavedManifest>;
}

// ---------------------------------------------------------------------------
// RemoteEnvironmentStore
// ---------------------------------------------------------------------------

/// Environment manifests held by a configuration server.
///
/// `load` must return `StoreError::NotFound` only for a genuine not-found
/// response; every other failure is surfaced as-is.
#[async_trait]
pub trait RemoteEnvironmentStore: Send + Sync {
    /// Fetch the server's current copy of `name`.
    async fn load(&self, name: &str) -> StoreResult<Environment>;

    /// Replace the server's copy of `name` with `environment`.
    async fn upload(&self, name: &str, environment: &Environment) -> StoreResult<()>;
}
