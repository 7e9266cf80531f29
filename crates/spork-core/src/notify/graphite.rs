//! Graphite plaintext protocol: `<path> <value> <timestamp>\n`.

use chrono::{DateTime, Utc};

use crate::domain::{Channel, Result, SporkError};

use super::send_line;

/// One deploy counter increment for `environment`.
pub fn render_metric(namespace: &str, environment: &str, at: DateTime<Utc>) -> String {
    format!("deploys.{namespace}.{environment} 1 {}\n", at.timestamp())
}

#[derive(Debug, Clone)]
pub struct MetricsChannel {
    server: String,
    port: u16,
}

impl MetricsChannel {
    pub fn new(server: &str, port: u16) -> Self {
        Self {
            server: server.to_string(),
            port,
        }
    }

    pub async fn send(&self, metric: &str) -> Result<()> {
        send_line(&self.server, self.port, metric)
            .await
            .map_err(|e| SporkError::Notification {
                channel: Channel::Metrics,
                message: format!("{}:{}: {e}", self.server, self.port),
            })
    }
}
