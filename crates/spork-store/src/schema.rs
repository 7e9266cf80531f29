//! Environment manifest document.
//!
//! An environment manifest is a JSON document with a `name`, a
//! `cookbook_versions` table mapping cookbook names to constraint strings,
//! and any number of other fields this crate does not interpret. Unknown
//! fields are carried through load/save untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cookbook name → constraint string (e.g. `"= 1.2.3"`).
pub type ConstraintTable = BTreeMap<String, String>;

/// A named deployment environment and its pinned cookbook constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,

    #[serde(default)]
    pub cookbook_versions: ConstraintTable,

    /// Every other manifest field (description, attributes, json_class, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Environment {
    /// Create an environment with an empty constraint table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cookbook_versions: ConstraintTable::new(),
            extra: Map::new(),
        }
    }

    /// Builder helper used mostly by tests and fixtures.
    pub fn with_constraint(mut self, cookbook: &str, constraint: &str) -> Self {
        self.cookbook_versions
            .insert(cookbook.to_string(), constraint.to_string());
        self
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Render the manifest as pretty-printed JSON.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "name": "production",
        "description": "live traffic",
        "json_class": "Chef::Environment",
        "chef_type": "environment",
        "cookbook_versions": { "apache2": "= 1.0.0", "ntp": "~> 2.0" },
        "default_attributes": { "tz": "UTC" },
        "override_attributes": {}
    }"#;

    #[test]
    fn passthrough_fields_survive_roundtrip() {
        let env = Environment::from_json(MANIFEST).unwrap();
        assert_eq!(env.name, "production");
        assert_eq!(env.cookbook_versions["apache2"], "= 1.0.0");
        assert_eq!(env.extra["json_class"], "Chef::Environment");
        assert_eq!(env.extra["default_attributes"]["tz"], "UTC");

        let rendered = env.to_pretty_json().unwrap();
        let reparsed = Environment::from_json(&rendered).unwrap();
        assert_eq!(reparsed, env);
    }

    #[test]
    fn missing_cookbook_versions_defaults_to_empty() {
        let env = Environment::from_json(r#"{"name": "dev"}"#).unwrap();
        assert!(env.cookbook_versions.is_empty());
        assert!(env.extra.is_empty());
    }

    #[test]
    fn non_constraint_values_are_kept_opaque() {
        let env = Environment::from_json(MANIFEST).unwrap();
        assert_eq!(env.cookbook_versions["ntp"], "~> 2.0");
    }
}
