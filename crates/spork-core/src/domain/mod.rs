//! Domain models for Spork.
//!
//! Canonical definitions for the core entities:
//! - `Version`: three-component numeric cookbook version
//! - `VersionConstraint`: the `= x.y.z` pin written into a manifest
//! - `ChangeRecord`: one cookbook whose constraint changed
//! - `NotificationEvent`: what gets announced after an upload

pub mod change;
pub mod constraint;
pub mod error;
pub mod version;

// Re-export main types and errors
pub use change::{ChangeRecord, NotificationEvent};
pub use constraint::VersionConstraint;
pub use error::{Channel, Result, SporkError};
pub use version::{is_valid_version, Version};

pub use spork_store::{ConstraintTable, Environment};

/// Reserved cookbook name meaning "every cookbook in the source tree".
pub const ALL_COOKBOOKS: &str = "all";
