//! Git integration for keeping the chef repository current.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{Result, SporkError};

/// Whether a usable `git` binary is on PATH.
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run `git pull` in `repo_dir`, returning git's stdout.
///
/// The pull talks to the network, so it is killed once `limit` elapses.
pub async fn pull(repo_dir: &Path, limit: Duration) -> Result<String> {
    let child = tokio::process::Command::new("git")
        .arg("pull")
        .current_dir(repo_dir)
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(limit, child)
        .await
        .map_err(|_| SporkError::SourceSync(format!("git pull timed out after {limit:?}")))?
        .map_err(|e| SporkError::SourceSync(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SporkError::SourceSync(format!(
            "git pull failed: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// What happened when syncing the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Pulled,
    /// Nothing attempted; the string says why.
    Skipped(String),
    /// Attempted and failed; never fatal.
    Failed(String),
}

/// Pull the repository that holds `cookbook_paths`, tolerating every failure.
///
/// `git_available` is the capability detected once at startup; `limit`
/// bounds the pull itself.
pub async fn sync_source_tree(
    cookbook_paths: &[std::path::PathBuf],
    git_available: bool,
    limit: Duration,
) -> SyncOutcome {
    if !git_available {
        info!(event = "source_sync.skipped", "git not available, skipping git pull");
        return SyncOutcome::Skipped("Git not available, skipping git pull".to_string());
    }

    let cookbook_path = match cookbook_paths {
        [single] => single,
        _ => {
            let reason = "multiple cookbook paths defined, can't tell which git repo to pull";
            warn!(event = "source_sync.skipped", paths = cookbook_paths.len(), "{reason}");
            return SyncOutcome::Skipped(reason.to_string());
        }
    };

    let repo = spork_store::repo_root_for(cookbook_path);
    if !is_git_repo(&repo) {
        let reason = format!(
            "the root of your chef repo ({}) doesn't look like a git repo, skipping git pull",
            repo.display()
        );
        warn!(event = "source_sync.skipped", "{reason}");
        return SyncOutcome::Skipped(reason);
    }

    info!(repo = %repo.display(), "pulling latest changes from git");
    match pull(&repo, limit).await {
        Ok(stdout) => {
            info!(event = "source_sync.pulled", output = %stdout);
            SyncOutcome::Pulled
        }
        Err(e) => {
            warn!(event = "source_sync.failed", error = %e);
            SyncOutcome::Failed(e.to_string())
        }
    }
}
