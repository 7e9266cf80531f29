//! Filesystem backend tests for FsCookbookSource and FsEnvironmentStore.
//!
//! Each test builds a throwaway chef repository under a tempdir:
//! `<tmp>/cookbooks/<name>/metadata.*` and `<tmp>/environments/<env>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use spork_store::storage_traits::*;
use spork_store::{Environment, FsCookbookSource, FsEnvironmentStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_json_cookbook(cookbooks: &Path, name: &str, version: &str) {
    let dir = cookbooks.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("metadata.json"),
        format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
    )
    .unwrap();
}

fn write_rb_cookbook(cookbooks: &Path, name: &str, version: &str) {
    let dir = cookbooks.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("metadata.rb"),
        format!("name '{name}'\nmaintainer 'ops'\nversion '{version}'\n"),
    )
    .unwrap();
}

fn make_repo() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let cookbooks = dir.path().join("cookbooks");
    fs::create_dir_all(&cookbooks).unwrap();
    fs::create_dir_all(dir.path().join("environments")).unwrap();
    (dir, cookbooks)
}

// ===========================================================================
// FsCookbookSource
// ===========================================================================

#[tokio::test]
async fn lists_cookbooks_sorted_from_both_metadata_formats() {
    let (_dir, cookbooks) = make_repo();
    write_json_cookbook(&cookbooks, "ntp", "1.0.0");
    write_rb_cookbook(&cookbooks, "apache2", "2.3.1");
    fs::create_dir_all(cookbooks.join("not-a-cookbook")).unwrap();
    fs::write(cookbooks.join("README.md"), "hello").unwrap();

    let source = FsCookbookSource::new(vec![cookbooks]);
    let names = source.list_cookbooks().await.unwrap();

    assert_eq!(names, vec!["apache2".to_string(), "ntp".to_string()]);
}

#[tokio::test]
async fn reads_version_from_metadata() {
    let (_dir, cookbooks) = make_repo();
    write_json_cookbook(&cookbooks, "ntp", "1.4.0");
    write_rb_cookbook(&cookbooks, "apache2", "2.3.1");

    let source = FsCookbookSource::new(vec![cookbooks]);

    assert_eq!(source.cookbook_version("ntp").await.unwrap(), "1.4.0");
    assert_eq!(source.cookbook_version("apache2").await.unwrap(), "2.3.1");
}

#[tokio::test]
async fn unknown_cookbook_is_not_found() {
    let (_dir, cookbooks) = make_repo();
    let source = FsCookbookSource::new(vec![cookbooks]);

    let err = source.cookbook_version("missing").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn first_cookbook_path_wins_on_duplicate_names() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("site-cookbooks");
    let second = dir.path().join("cookbooks");
    write_json_cookbook(&first, "ntp", "9.0.0");
    write_json_cookbook(&second, "ntp", "1.0.0");

    let source = FsCookbookSource::new(vec![first, second]);

    assert_eq!(source.list_cookbooks().await.unwrap(), vec!["ntp"]);
    assert_eq!(source.cookbook_version("ntp").await.unwrap(), "9.0.0");
}

#[tokio::test]
async fn metadata_without_version_is_invalid() {
    let (_dir, cookbooks) = make_repo();
    let ntp = cookbooks.join("ntp");
    fs::create_dir_all(&ntp).unwrap();
    fs::write(ntp.join("metadata.rb"), "name 'ntp'\n").unwrap();

    let source = FsCookbookSource::new(vec![cookbooks]);
    let err = source.cookbook_version("ntp").await.unwrap_err();

    assert!(
        matches!(err, StoreError::InvalidMetadata { ref cookbook, .. } if cookbook == "ntp"),
        "unexpected error: {err:?}"
    );
}

// ===========================================================================
// FsEnvironmentStore
// ===========================================================================

#[tokio::test]
async fn load_save_preserves_opaque_fields() {
    let (dir, cookbooks) = make_repo();
    fs::write(
        dir.path().join("environments/production.json"),
        r#"{"name": "production", "description": "live", "cookbook_versions": {"ntp": "= 1.0.0"}}"#,
    )
    .unwrap();

    let store = FsEnvironmentStore::for_cookbook_paths(&[cookbooks]);
    let mut env = store.load("production").await.unwrap();
    env.cookbook_versions
        .insert("ntp".to_string(), "= 1.1.0".to_string());

    let saved = store.save("production", &env).await.unwrap();
    assert_eq!(saved.path, dir.path().join("environments/production.json"));

    let text = fs::read_to_string(&saved.path).unwrap();
    assert!(text.ends_with("}\n"));
    let reloaded = Environment::from_json(&text).unwrap();
    assert_eq!(reloaded.cookbook_versions["ntp"], "= 1.1.0");
    assert_eq!(reloaded.extra["description"], "live");
}

#[tokio::test]
async fn load_missing_environment_is_not_found() {
    let (_dir, cookbooks) = make_repo();
    let store = FsEnvironmentStore::for_cookbook_paths(&[cookbooks]);

    let err = store.load("nowhere").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn save_with_two_directories_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a/environments");
    let b = dir.path().join("b/environments");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();

    let store = FsEnvironmentStore::new(vec![a.clone(), b.clone()]);
    let env = Environment::new("staging").with_constraint("ntp", "= 1.0.0");

    let err = store.save("staging", &env).await.unwrap_err();
    match err {
        StoreError::AmbiguousTarget {
            candidates,
            rendered,
            ..
        } => {
            assert_eq!(candidates, vec![a.clone(), b.clone()]);
            assert!(rendered.contains("\"ntp\": \"= 1.0.0\""));
        }
        other => panic!("expected AmbiguousTarget, got {other:?}"),
    }
    assert!(!a.join("staging.json").exists());
    assert!(!b.join("staging.json").exists());
}

#[tokio::test]
async fn save_targets_the_loaded_file_not_the_document_name() {
    let (dir, cookbooks) = make_repo();
    let prod = dir.path().join("environments/prod.json");
    fs::write(
        &prod,
        r#"{"name": "production", "cookbook_versions": {"ntp": "= 1.0.0"}}"#,
    )
    .unwrap();

    let store = FsEnvironmentStore::for_cookbook_paths(&[cookbooks]);
    let mut env = store.load("prod").await.unwrap();
    env.cookbook_versions
        .insert("ntp".to_string(), "= 2.0.0".to_string());

    let saved = store.save("prod", &env).await.unwrap();

    assert_eq!(saved.path, prod);
    assert!(!dir.path().join("environments/production.json").exists());
    let reloaded = Environment::from_json(&fs::read_to_string(&prod).unwrap()).unwrap();
    assert_eq!(reloaded.cookbook_versions["ntp"], "= 2.0.0");
    assert_eq!(reloaded.name, "production");
}
