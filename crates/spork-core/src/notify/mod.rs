//! Best-effort change notifications.
//!
//! Three independently toggled channels run in a fixed order: paste first
//! (its output is linked from the chat line), then chat, then metrics.
//! A failing or slow channel is recorded and the next one still runs; the
//! dispatcher itself never fails.

pub mod chat;
pub mod graphite;
pub mod paste;

use std::future::Future;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::SporkConfig;
use crate::domain::{Channel, NotificationEvent, Result, SporkError};
use crate::obs::{emit_notification_delivered, emit_notification_failed};

pub use chat::{render_chat, ChatChannel};
pub use graphite::{render_metric, MetricsChannel};
pub use paste::{render_paste, PasteChannel};

/// Open a connection, write `payload`, close.
pub(crate) async fn send_line(server: &str, port: u16, payload: &str) -> std::io::Result<()> {
    let mut stream = TcpStream::connect((server, port)).await?;
    stream.write_all(payload.as_bytes()).await?;
    stream.shutdown().await
}

/// Result of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Disabled,
    Delivered,
    Failed(String),
}

impl ChannelOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ChannelOutcome::Failed(_))
    }
}

/// Per-channel results of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub paste: ChannelOutcome,
    /// What the paste command printed, when it ran.
    pub paste_ref: Option<String>,
    pub chat: ChannelOutcome,
    pub metrics: ChannelOutcome,
}

impl DispatchReport {
    /// `(channel, reason)` for every failed channel.
    pub fn failures(&self) -> Vec<(Channel, &str)> {
        [
            (Channel::Paste, &self.paste),
            (Channel::Chat, &self.chat),
            (Channel::Metrics, &self.metrics),
        ]
        .into_iter()
        .filter_map(|(channel, outcome)| match outcome {
            ChannelOutcome::Failed(reason) => Some((channel, reason.as_str())),
            _ => None,
        })
        .collect()
    }
}

/// Sends a [`NotificationEvent`] to every enabled channel.
pub struct NotificationDispatcher<'a> {
    config: &'a SporkConfig,
    timeout: Duration,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(config: &'a SporkConfig) -> Self {
        Self {
            config,
            timeout: config.timeouts.network(),
        }
    }

    /// Override the per-channel timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `fut` under the channel timeout, folding every failure into an outcome.
    async fn attempt<T>(
        &self,
        channel: Channel,
        fut: impl Future<Output = Result<T>>,
    ) -> (ChannelOutcome, Option<T>) {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SporkError::Notification {
                channel,
                message: format!("timed out after {}s", self.timeout.as_secs_f32()),
            }),
        };

        match result {
            Ok(value) => {
                emit_notification_delivered(channel);
                (ChannelOutcome::Delivered, Some(value))
            }
            Err(e) => {
                emit_notification_failed(channel, &e);
                (ChannelOutcome::Failed(e.to_string()), None)
            }
        }
    }

    pub async fn dispatch(&self, event: &NotificationEvent) -> DispatchReport {
        let gist = &self.config.gist;
        let (paste, paste_ref) = match (gist.enabled, gist.command()) {
            (false, _) => (ChannelOutcome::Disabled, None),
            (true, None) => (
                ChannelOutcome::Failed("no paste command configured".to_string()),
                None,
            ),
            (true, Some(command)) => {
                let channel = PasteChannel::new(command);
                let text = render_paste(event);
                self.attempt(Channel::Paste, channel.publish(&text)).await
            }
        };

        let irc = &self.config.irccat;
        let chat = if irc.enabled {
            let line = render_chat(&irc.channel, event, paste_ref.as_deref());
            let channel = ChatChannel::new(&irc.server, irc.port);
            self.attempt(Channel::Chat, channel.send(&line)).await.0
        } else {
            ChannelOutcome::Disabled
        };

        let graphite = &self.config.graphite;
        let metrics = if graphite.enabled {
            let metric = render_metric(
                &graphite.namespace,
                &event.environment,
                chrono::Utc::now(),
            );
            let channel = MetricsChannel::new(&graphite.server, graphite.port);
            self.attempt(Channel::Metrics, channel.send(&metric)).await.0
        } else {
            ChannelOutcome::Disabled
        };

        DispatchReport {
            paste,
            paste_ref,
            chat,
            metrics,
        }
    }
}
