//! Promotion orchestration.
//!
//! A run resolves its target environments and cookbook selection, optionally
//! syncs the source tree, then for each environment in order:
//!
//! 1. loads the manifest,
//! 2. resolves and applies a version for each selected cookbook,
//! 3. diffs the pre-promotion snapshot against the result,
//! 4. saves it locally (or hands back the rendered JSON when the save target
//!    is ambiguous),
//! 5. with `remote`, uploads it and dispatches notifications.
//!
//! A fatal error in any environment ends the run; environments already
//! processed stay processed.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use spork_store::{CookbookSource, EnvironmentStore, RemoteEnvironmentStore, StoreError};
use tracing::{info, Instrument};

use crate::config::SporkConfig;
use crate::diff::diff_tables;
use crate::domain::{
    ChangeRecord, Environment, NotificationEvent, Result, SporkError, Version, ALL_COOKBOOKS,
};
use crate::git::{sync_source_tree, SyncOutcome};
use crate::notify::{DispatchReport, NotificationDispatcher};
use crate::obs::{
    emit_cookbook_promoted, emit_cookbook_skipped, emit_environment_saved,
    emit_environment_uploaded, emit_promotion_finished, emit_promotion_started, PromotionSpan,
};
use crate::resolver::resolve_version;
use crate::updater::apply_constraint;

const MISSING_ARGS: &str = "You must specify a cookbook name and an environment";
const MISSING_COOKBOOK: &str =
    "Default environments loaded from config, but you must specify a cookbook name";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Raw operator input for one `promote` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoteArgs {
    /// Positional arguments: `[ENVIRONMENT] COOKBOOK`.
    pub names: Vec<String>,
    /// Explicit target version; overrides cookbook metadata.
    pub version: Option<String>,
    /// Upload to the remote store and notify.
    pub remote: bool,
    /// Acting operator, shown in notifications.
    pub user: String,
}

/// Which cookbooks a run promotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookbookSelection {
    One(String),
    /// Every cookbook the source knows about.
    All,
}

impl CookbookSelection {
    pub fn from_name(name: &str) -> Self {
        if name == ALL_COOKBOOKS {
            CookbookSelection::All
        } else {
            CookbookSelection::One(name.to_string())
        }
    }
}

impl std::fmt::Display for CookbookSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CookbookSelection::One(name) => write!(f, "{name}"),
            CookbookSelection::All => write!(f, "{ALL_COOKBOOKS}"),
        }
    }
}

/// Fully resolved targets for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionPlan {
    pub environments: Vec<String>,
    pub cookbooks: CookbookSelection,
    pub version: Option<String>,
    pub remote: bool,
    pub user: String,
}

impl PromotionPlan {
    /// Resolve positional arguments against `default_environments`.
    ///
    /// Two positionals always mean `ENVIRONMENT COOKBOOK`. A single
    /// positional is a cookbook only when default environments are
    /// configured. Anything else is a usage error.
    pub fn resolve(args: &PromoteArgs, config: &SporkConfig) -> Result<Self> {
        let defaults = config
            .default_environments
            .as_ref()
            .filter(|envs| !envs.is_empty());

        let (environments, cookbook) = match (args.names.as_slice(), defaults) {
            ([environment, cookbook], _) => (vec![environment.clone()], cookbook),
            ([cookbook], Some(defaults)) => (defaults.clone(), cookbook),
            ([], Some(_)) => return Err(SporkError::Usage(MISSING_COOKBOOK.to_string())),
            _ => return Err(SporkError::Usage(MISSING_ARGS.to_string())),
        };

        Ok(Self {
            environments,
            cookbooks: CookbookSelection::from_name(cookbook),
            version: args.version.clone(),
            remote: args.remote,
            user: args.user.clone(),
        })
    }
}

/// Optional runtime capabilities, detected once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub git: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            git: crate::git::is_git_available(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Where the promoted manifest went locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSave {
    Saved(PathBuf),
    /// No single save location; the operator gets the rendered manifest.
    PrintedOnly(String),
    /// Nothing was promoted, so nothing was written.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCookbook {
    pub cookbook: String,
    pub reason: String,
}

/// Upload and notification results for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutcome {
    /// Server copy before upload → promoted copy.
    pub changes: Vec<ChangeRecord>,
    pub dispatch: DispatchReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOutcome {
    pub environment: String,
    pub promoted: Vec<(String, Version)>,
    pub skipped: Vec<SkippedCookbook>,
    /// Pre-promotion snapshot → promoted snapshot.
    pub changes: Vec<ChangeRecord>,
    pub manifest: String,
    pub local: LocalSave,
    pub remote: Option<RemoteOutcome>,
}

impl EnvironmentOutcome {
    /// Closing line for the operator.
    pub fn confirmation(&self) -> String {
        match (&self.local, &self.remote) {
            (LocalSave::Unchanged, _) => format!(
                "Nothing promoted in {}; environment left unchanged.",
                self.environment
            ),
            (_, Some(_)) => "Promotion complete, and environment uploaded.".to_string(),
            (_, None) => format!(
                "Promotion complete! Please remember to upload your changed {}.json to the Chef Server.",
                self.environment
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionReport {
    pub run_id: uuid::Uuid,
    /// Present when source sync is enabled in config.
    pub sync: Option<SyncOutcome>,
    pub environments: Vec<EnvironmentOutcome>,
}

impl PromotionReport {
    pub fn skipped_count(&self) -> usize {
        self.environments.iter().map(|e| e.skipped.len()).sum()
    }

    pub fn promoted_count(&self) -> usize {
        self.environments.iter().map(|e| e.promoted.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Promoter
// ---------------------------------------------------------------------------

/// Runs promotions against injected storage backends.
pub struct Promoter<'a> {
    config: &'a SporkConfig,
    capabilities: Capabilities,
    cookbooks: &'a dyn CookbookSource,
    environments: &'a dyn EnvironmentStore,
    remote: Option<&'a dyn RemoteEnvironmentStore>,
}

impl<'a> Promoter<'a> {
    pub fn new(
        config: &'a SporkConfig,
        capabilities: Capabilities,
        cookbooks: &'a dyn CookbookSource,
        environments: &'a dyn EnvironmentStore,
    ) -> Self {
        Self {
            config,
            capabilities,
            cookbooks,
            environments,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: &'a dyn RemoteEnvironmentStore) -> Self {
        self.remote = Some(remote);
        self
    }

    fn network_timeout(&self) -> Duration {
        self.config.timeouts.network()
    }

    /// Resolve `args` and run the promotion.
    pub async fn promote(&self, args: &PromoteArgs) -> Result<PromotionReport> {
        let plan = PromotionPlan::resolve(args, self.config)?;
        self.run(&plan).await
    }

    pub async fn run(&self, plan: &PromotionPlan) -> Result<PromotionReport> {
        if plan.remote && self.remote.is_none() {
            return Err(SporkError::Usage(
                "--remote needs chef_server_url in spork-config.yml".to_string(),
            ));
        }

        let span = PromotionSpan::new(&plan.user);
        let run_id = span.run_id();
        async move {
            emit_promotion_started(&plan.environments, &plan.cookbooks.to_string(), plan.remote);

            let sync = if self.config.git.enabled {
                Some(
                    sync_source_tree(
                        &self.config.cookbook_path,
                        self.capabilities.git,
                        self.network_timeout(),
                    )
                    .await,
                )
            } else {
                None
            };

            let mut environments = Vec::with_capacity(plan.environments.len());
            for name in &plan.environments {
                environments.push(self.promote_environment(plan, name).await?);
            }

            let report = PromotionReport {
                run_id,
                sync,
                environments,
            };
            emit_promotion_finished(
                report.environments.len(),
                report.promoted_count(),
                report.skipped_count(),
            );
            Ok(report)
        }
        .instrument(span.span())
        .await
    }

    async fn selected_cookbooks(&self, selection: &CookbookSelection) -> Result<Vec<String>> {
        match selection {
            CookbookSelection::One(name) => Ok(vec![name.clone()]),
            CookbookSelection::All => Ok(self.cookbooks.list_cookbooks().await?),
        }
    }

    async fn promote_environment(
        &self,
        plan: &PromotionPlan,
        name: &str,
    ) -> Result<EnvironmentOutcome> {
        info!(environment = %name, "promoting environment");
        let original = self.environments.load(name).await?;
        let cookbooks = self.selected_cookbooks(&plan.cookbooks).await?;
        if plan.cookbooks == CookbookSelection::All {
            info!(environment = %name, count = cookbooks.len(), "promoting all cookbooks");
        }

        let mut current = original.clone();
        let mut promoted = Vec::new();
        let mut skipped = Vec::new();
        for cookbook in cookbooks {
            match resolve_version(plan.version.as_deref(), self.cookbooks, &cookbook).await {
                Ok(version) => {
                    current = apply_constraint(&current, &cookbook, version);
                    emit_cookbook_promoted(name, &cookbook, &version);
                    promoted.push((cookbook, version));
                }
                Err(e) if !e.is_fatal() => {
                    emit_cookbook_skipped(name, &cookbook, &e);
                    skipped.push(SkippedCookbook {
                        cookbook,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let manifest = current.to_pretty_json()?;
        if promoted.is_empty() {
            return Ok(EnvironmentOutcome {
                environment: name.to_string(),
                promoted,
                skipped,
                changes: Vec::new(),
                manifest,
                local: LocalSave::Unchanged,
                remote: None,
            });
        }

        let changes = diff_tables(&original.cookbook_versions, &current.cookbook_versions);
        let local = self.save_local(name, &current).await?;
        emit_environment_saved(
            name,
            &match &local {
                LocalSave::Saved(path) => path.display().to_string(),
                _ => "stdout".to_string(),
            },
            changes.len(),
        );

        let remote = if plan.remote {
            Some(self.publish_remote(name, &current, &plan.user).await?)
        } else {
            None
        };

        Ok(EnvironmentOutcome {
            environment: name.to_string(),
            promoted,
            skipped,
            changes,
            manifest,
            local,
            remote,
        })
    }

    /// Save `environment` as `name`, the name it was loaded under.
    async fn save_local(&self, name: &str, environment: &Environment) -> Result<LocalSave> {
        let err = match self.environments.save(name, environment).await {
            Ok(saved) => return Ok(LocalSave::Saved(saved.path)),
            Err(e) => SporkError::from(e),
        };
        match err {
            SporkError::AmbiguousPersistenceTarget { rendered, .. } => {
                tracing::warn!(
                    environment = %name,
                    "multiple cookbook paths defined, not sure where to save the environment file"
                );
                Ok(LocalSave::PrintedOnly(rendered))
            }
            e => Err(e),
        }
    }

    /// Upload `promoted` and notify. Remote failures, including timeouts,
    /// are fatal for the environment; notification failures are not.
    async fn publish_remote(
        &self,
        name: &str,
        promoted: &Environment,
        user: &str,
    ) -> Result<RemoteOutcome> {
        let remote = self
            .remote
            .ok_or_else(|| SporkError::Usage("no remote store configured".to_string()))?;

        let server = match bounded(self.network_timeout(), remote.load(name)).await {
            Ok(env) => env,
            Err(e) if e.is_not_found() => {
                return Err(SporkError::RemoteEnvironmentNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let changes = diff_tables(&server.cookbook_versions, &promoted.cookbook_versions);
        bounded(self.network_timeout(), remote.upload(name, promoted)).await?;
        emit_environment_uploaded(name, changes.len());

        let event = NotificationEvent::new(name, changes.clone(), user);
        let dispatch = NotificationDispatcher::new(self.config)
            .dispatch(&event)
            .await;

        Ok(RemoteOutcome { changes, dispatch })
    }
}

/// Bound a remote-store call by `limit`.
async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = spork_store::StoreResult<T>>,
) -> spork_store::StoreResult<T> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(StoreError::Http(format!("timed out after {limit:?}"))))
}
