//! Decide which version a cookbook is promoted to.

use spork_store::CookbookSource;
use tracing::debug;

use crate::domain::{Result, Version};

/// Resolve the target version for `cookbook`.
///
/// An operator-supplied `explicit` version always wins; it must be a valid
/// three-component version or the call fails with `InvalidVersionFormat`.
/// Otherwise the version comes from the cookbook's own metadata, failing
/// with `CookbookNotFound` when the source has no such cookbook.
pub async fn resolve_version(
    explicit: Option<&str>,
    source: &dyn CookbookSource,
    cookbook: &str,
) -> Result<Version> {
    if let Some(version) = explicit {
        return version.parse();
    }

    let raw = source.cookbook_version(cookbook).await?;
    debug!(cookbook = %cookbook, version = %raw, "version read from cookbook metadata");
    Version::from_metadata(&raw)
}
