//! Filesystem-backed cookbook source and environment store.
//!
//! Layout follows a conventional chef repository:
//!
//! ```text
//! <repo>/cookbooks/<name>/metadata.{json,rb}
//! <repo>/environments/<env>.json
//! ```
//!
//! Environment directories are derived from cookbook paths by replacing the
//! `cookbooks` segment with `environments`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::StoreError;
use crate::schema::Environment;
use crate::storage_traits::{CookbookSource, EnvironmentStore, SavedManifest, StoreResult};

const METADATA_JSON: &str = "metadata.json";
const METADATA_RB: &str = "metadata.rb";

/// Map a cookbook directory onto its sibling environments directory.
pub fn environments_dir_for(cookbook_path: &Path) -> PathBuf {
    PathBuf::from(
        cookbook_path
            .to_string_lossy()
            .replace("cookbooks", "environments"),
    )
}

/// Map a cookbook directory onto the repository root containing it.
///
/// A bare relative `cookbooks` maps onto the current directory.
pub fn repo_root_for(cookbook_path: &Path) -> PathBuf {
    let root = cookbook_path.to_string_lossy().replace("cookbooks", "");
    if root.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(root)
    }
}

// ---------------------------------------------------------------------------
// FsCookbookSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CookbookEntry {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct JsonMetadata {
    name: Option<String>,
    version: Option<String>,
}

/// Cookbooks discovered under one or more cookbook directories.
#[derive(Debug, Clone)]
pub struct FsCookbookSource {
    paths: Vec<PathBuf>,
}

impl FsCookbookSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Scan every cookbook path. The first path wins on duplicate names.
    fn scan(&self) -> StoreResult<BTreeMap<String, CookbookEntry>> {
        let mut found = BTreeMap::new();
        for root in &self.paths {
            if !root.is_dir() {
                debug!(path = %root.display(), "cookbook path missing, skipping");
                continue;
            }
            for entry in fs::read_dir(root)? {
                let dir = entry?.path();
                if !dir.is_dir() {
                    continue;
                }
                if let Some(name) = cookbook_name(&dir)? {
                    found.entry(name).or_insert(CookbookEntry { dir });
                }
            }
        }
        Ok(found)
    }
}

fn rb_field(field: &str) -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let cell = if field == "name" { &NAME } else { &VERSION };
    cell.get_or_init(|| {
        Regex::new(&format!(r#"(?m)^\s*{field}\s+['"]([^'"]+)['"]"#))
            .expect("metadata.rb pattern is valid")
    })
}

fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// The cookbook's name if `dir` holds cookbook metadata.
fn cookbook_name(dir: &Path) -> StoreResult<Option<String>> {
    let json = dir.join(METADATA_JSON);
    if json.is_file() {
        let meta: JsonMetadata = serde_json::from_str(&fs::read_to_string(&json)?)?;
        return Ok(meta.name.or_else(|| dir_name(dir)));
    }
    let rb = dir.join(METADATA_RB);
    if rb.is_file() {
        let text = fs::read_to_string(&rb)?;
        let name = rb_field("name")
            .captures(&text)
            .map(|c| c[1].to_string())
            .or_else(|| dir_name(dir));
        return Ok(name);
    }
    Ok(None)
}

fn read_version(name: &str, dir: &Path) -> StoreResult<String> {
    let json = dir.join(METADATA_JSON);
    if json.is_file() {
        let meta: JsonMetadata = serde_json::from_str(&fs::read_to_string(&json)?)?;
        return meta.version.ok_or_else(|| StoreError::InvalidMetadata {
            cookbook: name.to_string(),
            reason: "metadata.json has no version".to_string(),
        });
    }
    let text = fs::read_to_string(dir.join(METADATA_RB))?;
    rb_field("version")
        .captures(&text)
        .map(|c| c[1].to_string())
        .ok_or_else(|| StoreError::InvalidMetadata {
            cookbook: name.to_string(),
            reason: "metadata.rb has no version line".to_string(),
        })
}

#[async_trait]
impl CookbookSource for FsCookbookSource {
    async fn list_cookbooks(&self) -> StoreResult<Vec<String>> {
        Ok(self.scan()?.into_keys().collect())
    }

    async fn cookbook_version(&self, name: &str) -> StoreResult<String> {
        let cookbooks = self.scan()?;
        let entry = cookbooks
            .get(name)
            .ok_or_else(|| StoreError::cookbook_not_found(name))?;
        read_version(name, &entry.dir)
    }
}

// ---------------------------------------------------------------------------
// FsEnvironmentStore
// ---------------------------------------------------------------------------

/// Environment manifests stored as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FsEnvironmentStore {
    dirs: Vec<PathBuf>,
}

impl FsEnvironmentStore {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// One environments directory per cookbook path.
    pub fn for_cookbook_paths(cookbook_paths: &[PathBuf]) -> Self {
        Self::new(
            cookbook_paths
                .iter()
                .map(|p| environments_dir_for(p))
                .collect(),
        )
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

#[async_trait]
impl EnvironmentStore for FsEnvironmentStore {
    async fn load(&self, name: &str) -> StoreResult<Environment> {
        let file_name = format!("{name}.json");
        for dir in &self.dirs {
            let path = dir.join(&file_name);
            if path.is_file() {
                debug!(path = %path.display(), "loading environment manifest");
                return Ok(Environment::from_json(&fs::read_to_string(&path)?)?);
            }
        }
        Err(StoreError::environment_not_found(name))
    }

    async fn save(&self, name: &str, environment: &Environment) -> StoreResult<SavedManifest> {
        let rendered = environment.to_pretty_json()?;
        let dir = match self.dirs.as_slice() {
            [dir] => dir,
            _ => {
                return Err(StoreError::AmbiguousTarget {
                    name: name.to_string(),
                    candidates: self.dirs.clone(),
                    rendered,
                })
            }
        };

        let path = dir.join(format!("{name}.json"));
        let mut file = File::create(&path)?;
        writeln!(file, "{rendered}")?;
        Ok(SavedManifest { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environments_dir_replaces_cookbooks_segment() {
        assert_eq!(
            environments_dir_for(Path::new("/srv/chef/cookbooks")),
            PathBuf::from("/srv/chef/environments")
        );
        assert_eq!(
            repo_root_for(Path::new("/srv/chef/cookbooks")),
            PathBuf::from("/srv/chef/")
        );
    }

    #[test]
    fn rb_patterns_accept_either_quote_style() {
        let text = "name 'ntp'\nmaintainer \"ops\"\nversion \"1.4.2\"\n";
        assert_eq!(&rb_field("name").captures(text).unwrap()[1], "ntp");
        assert_eq!(&rb_field("version").captures(text).unwrap()[1], "1.4.2");
    }

    #[test]
    fn rb_version_ignores_commented_lines() {
        let text = "# version '9.9.9'\nversion '0.1.0'\n";
        assert_eq!(&rb_field("version").captures(text).unwrap()[1], "0.1.0");
    }
}
