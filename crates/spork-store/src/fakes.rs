//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryCookbookSource`, `MemoryEnvironmentStore`, and
//! `MemoryRemoteStore` that satisfy the trait contracts without touching
//! the filesystem or the network. The remote fake counts every call so
//! tests can assert that no remote traffic happened.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::schema::Environment;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryCookbookSource
// ---------------------------------------------------------------------------

/// Cookbook source backed by a `BTreeMap<name, version>`.
#[derive(Debug, Default)]
pub struct MemoryCookbookSource {
    cookbooks: BTreeMap<String, String>,
}

impl MemoryCookbookSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookbook(mut self, name: &str, version: &str) -> Self {
        self.cookbooks.insert(name.to_string(), version.to_string());
        self
    }
}

#[async_trait]
impl CookbookSource for MemoryCookbookSource {
    async fn list_cookbooks(&self) -> StoreResult<Vec<String>> {
        Ok(self.cookbooks.keys().cloned().collect())
    }

    async fn cookbook_version(&self, name: &str) -> StoreResult<String> {
        self.cookbooks
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::cookbook_not_found(name))
    }
}

// ---------------------------------------------------------------------------
// MemoryEnvironmentStore
// ---------------------------------------------------------------------------

/// Local environment store backed by a `HashMap<name, Environment>`.
///
/// `ambiguous()` builds a store that refuses every save the way a
/// multi-directory filesystem store does.
#[derive(Debug, Default)]
pub struct MemoryEnvironmentStore {
    environments: Mutex<HashMap<String, Environment>>,
    saves: AtomicUsize,
    ambiguous: bool,
}

impl MemoryEnvironmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ambiguous() -> Self {
        Self {
            ambiguous: true,
            ..Self::default()
        }
    }

    pub fn with_environment(self, environment: Environment) -> Self {
        self.environments
            .lock()
            .unwrap()
            .insert(environment.name.clone(), environment);
        self
    }

    /// Current stored copy, if any.
    pub fn get(&self, name: &str) -> Option<Environment> {
        self.environments.lock().unwrap().get(name).cloned()
    }

    /// Number of successful writes.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnvironmentStore for MemoryEnvironmentStore {
    async fn load(&self, name: &str) -> StoreResult<Environment> {
        self.get(name)
            .ok_or_else(|| StoreError::environment_not_found(name))
    }

    async fn save(&self, name: &str, environment: &Environment) -> StoreResult<SavedManifest> {
        if self.ambiguous {
            return Err(StoreError::AmbiguousTarget {
                name: name.to_string(),
                candidates: vec![PathBuf::from("memory-a"), PathBuf::from("memory-b")],
                rendered: environment.to_pretty_json()?,
            });
        }
        self.environments
            .lock()
            .unwrap()
            .insert(name.to_string(), environment.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(SavedManifest {
            path: PathBuf::from(format!("memory/{name}.json")),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryRemoteStore
// ---------------------------------------------------------------------------

/// Remote store fake. Counts loads and uploads; can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    environments: Mutex<HashMap<String, Environment>>,
    calls: AtomicUsize,
    fail_status: Option<u16>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call answers with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_environment(self, environment: Environment) -> Self {
        self.environments
            .lock()
            .unwrap()
            .insert(environment.name.clone(), environment);
        self
    }

    pub fn get(&self, name: &str) -> Option<Environment> {
        self.environments.lock().unwrap().get(name).cloned()
    }

    /// Total number of load + upload calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self, name: &str) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_status {
            Some(status) => Err(StoreError::Remote {
                status,
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteEnvironmentStore for MemoryRemoteStore {
    async fn load(&self, name: &str) -> StoreResult<Environment> {
        self.check_failure(name)?;
        self.get(name)
            .ok_or_else(|| StoreError::environment_not_found(name))
    }

    async fn upload(&self, name: &str, environment: &Environment) -> StoreResult<()> {
        self.check_failure(name)?;
        self.environments
            .lock()
            .unwrap()
            .insert(name.to_string(), environment.clone());
        Ok(())
    }
}
