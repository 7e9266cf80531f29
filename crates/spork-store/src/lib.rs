//! Spork-Store: cookbook and environment storage for Spork
//!
//! This crate is the data-access layer for the promotion engine. It reads
//! cookbook metadata from a chef repository, loads and saves environment
//! manifests, and talks to a remote environment store over HTTP.
//!
//! ## Key Components
//!
//! - `Environment`: the manifest document (constraint table + opaque fields)
//! - `FsCookbookSource` / `FsEnvironmentStore`: working-tree backends
//! - `HttpEnvironmentStore`: remote backend
//! - `fakes`: in-memory backends for tests

mod error;
pub mod fakes;
pub mod fs;
pub mod http;
mod schema;
pub mod storage_traits;

pub use error::{ObjectKind, StoreError};
pub use fs::{environments_dir_for, repo_root_for, FsCookbookSource, FsEnvironmentStore};
pub use http::{HttpEnvironmentStore, RemoteConfig};
pub use schema::{ConstraintTable, Environment};
pub use storage_traits::{
    CookbookSource, EnvironmentStore, RemoteEnvironmentStore, SavedManifest, StoreResult,
};
