//! Spork - cookbook promotion CLI
//!
//! The `spork` command pins cookbook versions into chef environment
//! manifests.
//!
//! ## Commands
//!
//! - `promote`: Pin a cookbook (or `all`) into one or more environments,
//!   optionally uploading the result and announcing it

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use spork_core::{
    Capabilities, ChangeRecord, ConfigSources, EnvironmentOutcome, LocalSave, PromoteArgs,
    Promoter, PromotionReport, SporkConfig, SporkError, SyncOutcome,
};
use spork_store::{FsCookbookSource, FsEnvironmentStore, HttpEnvironmentStore, RemoteConfig};

#[derive(Parser)]
#[command(name = "spork")]
#[command(author = "Spork Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cookbook version promotion for chef environments", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pin a cookbook version into environment manifests
    ///
    /// `spork promote [ENVIRONMENT] COOKBOOK`. ENVIRONMENT may be omitted
    /// when `default_environments` is configured. COOKBOOK may be `all`.
    Promote {
        /// [ENVIRONMENT] COOKBOOK
        names: Vec<String>,

        /// Pin this version instead of the one in cookbook metadata
        #[arg(long = "version", value_name = "VERSION")]
        target_version: Option<String>,

        /// Upload the promoted environment and send notifications
        #[arg(long)]
        remote: bool,

        /// Cookbook directory (repeatable); overrides `cookbook_path` from config
        #[arg(long = "cookbook-path", value_name = "DIR")]
        cookbook_path: Vec<PathBuf>,

        /// Operator name shown in notifications
        #[arg(long, env = "USER", default_value = "unknown")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    spork_core::init_tracing(cli.json, level);

    match cli.command {
        command @ Commands::Promote { .. } => {
            let (args, cookbook_path) = promote_args(command);
            cmd_promote(&args, cookbook_path, cli.verbose).await
        }
    }
}

/// Split the parsed subcommand into engine input and the path override.
/// Positional count is checked by the engine so a bad count is a usage error.
fn promote_args(command: Commands) -> (PromoteArgs, Vec<PathBuf>) {
    match command {
        Commands::Promote {
            names,
            target_version,
            remote,
            cookbook_path,
            user,
        } => (
            PromoteArgs {
                names,
                version: target_version,
                remote,
                user,
            },
            cookbook_path,
        ),
    }
}

/// One-line message for an error that stopped (or interrupted) a run.
fn render_error(err: &SporkError) -> String {
    match err {
        SporkError::Usage(message) => format!("USAGE: {message}"),
        e if e.is_fatal() => format!("ERROR: {e}"),
        e => format!("WARNING: {e}"),
    }
}

/// Load config from the standard locations, then apply CLI overrides.
fn load_config(cookbook_path: Vec<PathBuf>) -> Result<SporkConfig> {
    let anchor = cookbook_path
        .first()
        .cloned()
        .unwrap_or_else(|| SporkConfig::default().cookbook_path[0].clone());
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let sources = ConfigSources::standard(&anchor, home.as_deref());

    let loaded = SporkConfig::load(&sources).context("Failed to load spork configuration")?;
    info!(files = loaded.loaded_files.len(), "configuration loaded");

    let mut config = loaded.config;
    if !cookbook_path.is_empty() {
        config.cookbook_path = cookbook_path;
    }
    Ok(config)
}

async fn cmd_promote(
    args: &PromoteArgs,
    cookbook_path: Vec<PathBuf>,
    verbose: bool,
) -> Result<ExitCode> {
    let config = load_config(cookbook_path)?;
    let capabilities = Capabilities::detect();

    let cookbooks = FsCookbookSource::new(config.cookbook_path.clone());
    let environments = FsEnvironmentStore::for_cookbook_paths(&config.cookbook_path);
    let remote = match (&config.chef_server_url, args.remote) {
        (Some(url), true) => Some(
            HttpEnvironmentStore::new(RemoteConfig::new(url, config.timeouts.network()))
                .context("Failed to build remote environment client")?,
        ),
        _ => None,
    };

    let mut promoter = Promoter::new(&config, capabilities, &cookbooks, &environments);
    if let Some(remote) = remote.as_ref() {
        promoter = promoter.with_remote(remote);
    }

    let report = match promoter.promote(args).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", render_error(&e));
            return Ok(ExitCode::FAILURE);
        }
    };
    print!("{}", render_report(&report, verbose));

    if report.skipped_count() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn render_changes(out: &mut String, heading: &str, changes: &[ChangeRecord]) {
    if changes.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push('\n');
    for change in changes {
        out.push_str(&format!("  {change}\n"));
    }
}

fn render_environment(out: &mut String, outcome: &EnvironmentOutcome, verbose: bool) {
    out.push_str(&format!("Environment: {}\n", outcome.environment));

    for (cookbook, version) in &outcome.promoted {
        out.push_str(&format!("Adding version constraint {cookbook} = {version}\n"));
    }
    for skipped in &outcome.skipped {
        out.push_str(&format!("Skipping {}: {}\n", skipped.cookbook, skipped.reason));
    }

    render_changes(
        out,
        &format!("Local changes in {}:", outcome.environment),
        &outcome.changes,
    );

    match &outcome.local {
        LocalSave::Saved(path) => {
            out.push_str(&format!("Saved {}\n", path.display()));
            if verbose {
                out.push_str(&outcome.manifest);
                out.push('\n');
            }
        }
        LocalSave::PrintedOnly(manifest) => {
            out.push_str(
                "Multiple cookbook paths defined, not sure where to save the environment file.\n\
                 Promoted environment, paste it where it belongs:\n",
            );
            out.push_str(manifest);
            out.push('\n');
        }
        LocalSave::Unchanged => {}
    }

    if let Some(remote) = &outcome.remote {
        render_changes(
            out,
            &format!("Constraints updated on server for {}:", outcome.environment),
            &remote.changes,
        );
        if let Some(reference) = &remote.dispatch.paste_ref {
            out.push_str(&format!("Change summary: {reference}\n"));
        }
        for (channel, reason) in remote.dispatch.failures() {
            out.push_str(&format!("Warning: {channel} notification failed: {reason}\n"));
        }
    }

    out.push_str(&outcome.confirmation());
    out.push('\n');
}

/// Operator-facing summary of a run.
fn render_report(report: &PromotionReport, verbose: bool) -> String {
    let mut out = String::new();
    match &report.sync {
        Some(SyncOutcome::Pulled) => out.push_str("Pulled latest changes from git\n"),
        Some(SyncOutcome::Skipped(reason)) => out.push_str(&format!("{reason}\n")),
        Some(SyncOutcome::Failed(reason)) => {
            out.push_str(&format!("Warning: git pull failed, continuing: {reason}\n"))
        }
        None => {}
    }
    for (i, outcome) in report.environments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_environment(&mut out, outcome, verbose);
    }
    out
}
