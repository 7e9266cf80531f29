//! Chat relay: one line of text per TCP connection (irccat protocol).

use crate::domain::{Channel, NotificationEvent, Result, SporkError};

use super::send_line;

/// `<channel> CHEF: <user> uploaded environment <env> <paste-ref>\n`
pub fn render_chat(channel: &str, event: &NotificationEvent, paste_ref: Option<&str>) -> String {
    let line = format!(
        "{channel} CHEF: {} uploaded environment {} {}",
        event.user,
        event.environment,
        paste_ref.unwrap_or("")
    );
    format!("{}\n", line.trim_end())
}

#[derive(Debug, Clone)]
pub struct ChatChannel {
    server: String,
    port: u16,
}

impl ChatChannel {
    pub fn new(server: &str, port: u16) -> Self {
        Self {
            server: server.to_string(),
            port,
        }
    }

    pub async fn send(&self, message: &str) -> Result<()> {
        send_line(&self.server, self.port, message)
            .await
            .map_err(|e| SporkError::Notification {
                channel: Channel::Chat,
                message: format!("{}:{}: {e}", self.server, self.port),
            })
    }
}
