//! Spork Core Library
//!
//! Promotion engine for chef environments: pins cookbook versions into
//! environment manifests, reports what changed, and optionally uploads the
//! result and announces it.

pub mod config;
pub mod diff;
pub mod domain;
pub mod git;
pub mod notify;
pub mod obs;
pub mod orchestrator;
pub mod resolver;
pub mod telemetry;
pub mod updater;

pub use config::{ConfigSources, LoadedConfig, SporkConfig};

pub use diff::diff_tables;

pub use domain::{
    is_valid_version, Channel, ChangeRecord, ConstraintTable, Environment, NotificationEvent,
    Result, SporkError, Version, VersionConstraint, ALL_COOKBOOKS,
};

pub use git::{is_git_available, sync_source_tree, SyncOutcome};

pub use notify::{ChannelOutcome, DispatchReport, NotificationDispatcher};

pub use orchestrator::{
    Capabilities, CookbookSelection, EnvironmentOutcome, LocalSave, PromoteArgs, PromotionPlan,
    PromotionReport, Promoter, RemoteOutcome, SkippedCookbook,
};

pub use resolver::resolve_version;

pub use telemetry::init_tracing;

pub use updater::apply_constraint;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
