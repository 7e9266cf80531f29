//! Apply a resolved version to an environment's constraint table.

use crate::domain::{Environment, Version, VersionConstraint};

/// Return a new snapshot of `environment` with `cookbook` pinned to `version`.
///
/// Every other constraint and every passthrough field is carried over
/// unchanged. The version is assumed to be validated already.
pub fn apply_constraint(environment: &Environment, cookbook: &str, version: Version) -> Environment {
    let mut next = environment.clone();
    next.cookbook_versions.insert(
        cookbook.to_string(),
        VersionConstraint::pinned(version).to_string(),
    );
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_the_named_cookbook() {
        let before = Environment::new("production").with_constraint("app", "= 2.2.0");
        let after = apply_constraint(&before, "app", Version::new(2, 3, 1));

        assert_eq!(after.cookbook_versions["app"], "= 2.3.1");
        assert_eq!(before.cookbook_versions["app"], "= 2.2.0");
    }

    #[test]
    fn adds_a_constraint_for_an_unpinned_cookbook() {
        let before = Environment::new("dev");
        let after = apply_constraint(&before, "ntp", Version::new(1, 0, 0));

        assert_eq!(after.cookbook_versions.len(), 1);
        assert_eq!(after.cookbook_versions["ntp"], "= 1.0.0");
    }

    #[test]
    fn leaves_other_fields_alone() {
        let mut before = Environment::new("production")
            .with_constraint("app", "= 2.2.0")
            .with_constraint("db", "~> 3.0");
        before
            .extra
            .insert("description".to_string(), serde_json::json!("live"));

        let after = apply_constraint(&before, "app", Version::new(3, 0, 0));

        assert_eq!(after.cookbook_versions["db"], "~> 3.0");
        assert_eq!(after.extra, before.extra);
        assert_eq!(after.name, before.name);
    }
}
