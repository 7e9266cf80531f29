//! HTTP client for a remote environment store.
//!
//! Speaks a minimal REST shape:
//! - `GET  {base}/environments/{name}` → manifest JSON, 404 when absent
//! - `PUT  {base}/environments/{name}` ← manifest JSON

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::schema::Environment;
use crate::storage_traits::{RemoteEnvironmentStore, StoreResult};

/// Remote store connection settings
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Server base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        RemoteConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

/// Remote environment store over HTTP
pub struct HttpEnvironmentStore {
    config: RemoteConfig,
    http_client: reqwest::Client,
}

impl HttpEnvironmentStore {
    pub fn new(config: RemoteConfig) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("spork/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(HttpEnvironmentStore {
            config,
            http_client,
        })
    }

    fn environment_url(&self, name: &str) -> String {
        format!("{}/environments/{}", self.config.base_url, name)
    }
}

#[async_trait]
impl RemoteEnvironmentStore for HttpEnvironmentStore {
    async fn load(&self, name: &str) -> StoreResult<Environment> {
        let url = self.environment_url(name);
        debug!(%url, "fetching remote environment");

        let response = self.http_client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::environment_not_found(name)),
            status if status.is_success() => Ok(response.json::<Environment>().await?),
            status => Err(StoreError::Remote {
                status: status.as_u16(),
                name: name.to_string(),
            }),
        }
    }

    async fn upload(&self, name: &str, environment: &Environment) -> StoreResult<()> {
        let url = self.environment_url(name);
        info!(%url, "uploading environment");

        let response = self.http_client.put(&url).json(environment).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Remote {
                status: status.as_u16(),
                name: name.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = RemoteConfig::new("https://chef.example.com/", Duration::from_secs(5));
        assert_eq!(config.base_url, "https://chef.example.com");

        let store = HttpEnvironmentStore::new(config).unwrap();
        assert_eq!(
            store.environment_url("production"),
            "https://chef.example.com/environments/production"
        );
    }
}
