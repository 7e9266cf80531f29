//! Paste/snippet publication through an external command.
//!
//! The rendered change summary is written to the command's stdin; whatever
//! the command prints (typically a URL) becomes the paste reference that the
//! chat message links to.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::{Channel, NotificationEvent, Result, SporkError};

/// Multi-line summary: header naming environment, time and user, then one
/// line per change record.
pub fn render_paste(event: &NotificationEvent) -> String {
    format!(
        "Environment {} uploaded at {} by {}\n\nConstraints updated on server in this version:\n\n{}",
        event.environment,
        event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        event.user,
        event.render_changes()
    )
}

/// Runs a paste command such as `gist` or `gist -p`.
#[derive(Debug, Clone)]
pub struct PasteChannel {
    command: String,
}

impl PasteChannel {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    fn failed(&self, message: String) -> SporkError {
        SporkError::Notification {
            channel: Channel::Paste,
            message,
        }
    }

    /// Feed `text` to the command and return its trimmed stdout.
    pub async fn publish(&self, text: &str) -> Result<String> {
        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| self.failed("empty paste command".to_string()))?;

        let mut child = Command::new(program)
            .args(words)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.failed(format!("failed to run {program}: {e}")))?;

        // stdin is dropped at the end of this block so the command sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| self.failed(format!("writing to {program}: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.failed(format!("waiting for {program}: {e}")))?;
        if !output.status.success() {
            return Err(self.failed(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
