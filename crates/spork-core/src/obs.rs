//! Structured observability hooks for promotion runs.
//!
//! This module provides:
//! - Run-scoped tracing spans via `PromotionSpan`
//! - Emission functions for key lifecycle events: start, per-cookbook
//!   promotion, persistence, notification, finish
//!
//! Events are emitted at `info!` level (configurable via `SPORK_LOG` or
//! `RUST_LOG`). For JSON output, pass `--json` to the CLI.

use tracing::{info, warn};

use crate::domain::{Channel, Version};

/// Run-scoped span tagged with a fresh run id and the acting user.
///
/// # Example
///
/// ```ignore
/// let span = PromotionSpan::new("deployer");
/// promoter.run(&plan).instrument(span.span()).await
/// // Every event inside now carries run_id and user.
/// ```
pub struct PromotionSpan {
    run_id: uuid::Uuid,
    span: tracing::Span,
}

impl PromotionSpan {
    pub fn new(user: &str) -> Self {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("spork.promote", run_id = %run_id, user = %user);
        Self { run_id, span }
    }

    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Handle for `Instrument::instrument`.
    pub fn span(&self) -> tracing::Span {
        self.span.clone()
    }
}

/// Emit event: promotion run started.
pub fn emit_promotion_started(environments: &[String], cookbook: &str, remote: bool) {
    info!(
        event = "promotion.started",
        environments = %environments.join(","),
        cookbook = %cookbook,
        remote = remote,
    );
}

/// Emit event: a cookbook constraint was set.
pub fn emit_cookbook_promoted(environment: &str, cookbook: &str, version: &Version) {
    info!(
        event = "cookbook.promoted",
        environment = %environment,
        cookbook = %cookbook,
        version = %version,
    );
}

/// Emit event: a cookbook was left untouched (warning level).
pub fn emit_cookbook_skipped(environment: &str, cookbook: &str, reason: &dyn std::fmt::Display) {
    warn!(
        event = "cookbook.skipped",
        environment = %environment,
        cookbook = %cookbook,
        reason = %reason,
    );
}

/// Emit event: manifest persisted (or printed) locally.
pub fn emit_environment_saved(environment: &str, target: &str, changes: usize) {
    info!(
        event = "environment.saved",
        environment = %environment,
        target = %target,
        changes = changes,
    );
}

/// Emit event: manifest uploaded to the remote store.
pub fn emit_environment_uploaded(environment: &str, changes: usize) {
    info!(event = "environment.uploaded", environment = %environment, changes = changes);
}

/// Emit event: a notification channel delivered.
pub fn emit_notification_delivered(channel: Channel) {
    info!(event = "notification.delivered", channel = %channel);
}

/// Emit event: a notification channel failed (warning level).
pub fn emit_notification_failed(channel: Channel, error: &dyn std::fmt::Display) {
    warn!(event = "notification.failed", channel = %channel, error = %error);
}

/// Emit event: promotion run finished.
pub fn emit_promotion_finished(environments: usize, promoted: usize, skipped: usize) {
    info!(
        event = "promotion.finished",
        environments = environments,
        promoted = promoted,
        skipped = skipped,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_span_create() {
        let a = PromotionSpan::new("deployer");
        let b = PromotionSpan::new("deployer");
        assert_ne!(a.run_id(), b.run_id());
    }
}
