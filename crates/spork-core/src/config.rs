//! Cascading configuration for Spork.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `<repo>/config/spork-config.yml` (repository-local)
//! 3. `/etc/spork-config.yml` (system-wide)
//! 4. `~/.chef/spork-config.yml` (per-user)
//! 5. `SPORK__*` environment variables (`SPORK__GIT__ENABLED=true`)
//!
//! Later sources override earlier ones key by key; nested tables merge.
//! The result is loaded once and passed explicitly to the engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Result;

pub const CONFIG_FILE_NAME: &str = "spork-config.yml";
pub const SYSTEM_CONFIG_PATH: &str = "/etc/spork-config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SporkConfig {
    /// Cookbook directories; environments live beside them.
    pub cookbook_path: Vec<PathBuf>,
    /// Environments to promote into when only a cookbook is given.
    pub default_environments: Option<Vec<String>>,
    /// Base URL of the remote environment store, needed for `--remote`.
    pub chef_server_url: Option<String>,
    pub git: GitConfig,
    pub gist: GistConfig,
    pub irccat: IrccatConfig,
    pub graphite: GraphiteConfig,
    pub timeouts: TimeoutConfig,
}

impl Default for SporkConfig {
    fn default() -> Self {
        Self {
            cookbook_path: vec![PathBuf::from("cookbooks")],
            default_environments: None,
            chef_server_url: None,
            git: GitConfig::default(),
            gist: GistConfig::default(),
            irccat: IrccatConfig::default(),
            graphite: GraphiteConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Pull the repository before promoting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub enabled: bool,
}

/// Paste/snippet publication through an external command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GistConfig {
    pub enabled: bool,
    /// Use `chef_path` instead of `path` (command bundled with the chef install).
    pub in_chef: bool,
    pub chef_path: Option<String>,
    pub path: Option<String>,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            in_chef: false,
            chef_path: None,
            path: Some("gist".to_string()),
        }
    }
}

impl GistConfig {
    /// The command to run, honouring `in_chef`.
    pub fn command(&self) -> Option<&str> {
        if self.in_chef {
            self.chef_path.as_deref()
        } else {
            self.path.as_deref()
        }
    }
}

/// Chat relay (irccat-style: one line per TCP connection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrccatConfig {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub channel: String,
}

impl Default for IrccatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server: "localhost".to_string(),
            port: 12345,
            channel: "#chef".to_string(),
        }
    }
}

/// Graphite plaintext metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphiteConfig {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub namespace: String,
}

impl Default for GraphiteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server: "localhost".to_string(),
            port: 2003,
            namespace: "chef".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for each remote-store request and notification channel.
    pub network_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { network_secs: 10 }
    }
}

impl TimeoutConfig {
    pub fn network(&self) -> Duration {
        Duration::from_secs(self.network_secs)
    }
}

/// Candidate config files, lowest precedence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    pub files: Vec<PathBuf>,
}

impl ConfigSources {
    /// The standard repo-local, system-wide and per-user locations.
    pub fn standard(cookbook_path: &Path, home: Option<&Path>) -> Self {
        let mut files = vec![
            spork_store::repo_root_for(cookbook_path)
                .join("config")
                .join(CONFIG_FILE_NAME),
            PathBuf::from(SYSTEM_CONFIG_PATH),
        ];
        if let Some(home) = home {
            files.push(home.join(".chef").join(CONFIG_FILE_NAME));
        }
        Self { files }
    }

    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }
}

/// A merged configuration plus the files that contributed to it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SporkConfig,
    pub loaded_files: Vec<PathBuf>,
}

impl SporkConfig {
    /// Merge defaults, every existing file in `sources`, then the environment.
    pub fn load(sources: &ConfigSources) -> Result<LoadedConfig> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&SporkConfig::default())?);

        let mut loaded_files = Vec::new();
        for path in &sources.files {
            if path.is_file() {
                info!(path = %path.display(), "loaded config file");
                loaded_files.push(path.clone());
            }
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SPORK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?.try_deserialize()?;
        Ok(LoadedConfig {
            config,
            loaded_files,
        })
    }
}
