//! Change records and notification events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cookbook whose constraint differs between two manifest snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub cookbook: String,
    pub old: String,
    /// `None` when the cookbook is gone from the newer snapshot.
    pub new: Option<String>,
}

impl ChangeRecord {
    pub fn new(cookbook: &str, old: &str, new: Option<&str>) -> Self {
        Self {
            cookbook: cookbook.to_string(),
            old: old.to_string(),
            new: new.map(ToString::to_string),
        }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} changed to {}",
            self.cookbook,
            self.old,
            self.new.as_deref().unwrap_or("")
        )
    }
}

/// A single "environment changed" announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<ChangeRecord>,
    pub user: String,
}

impl NotificationEvent {
    pub fn new(environment: &str, changes: Vec<ChangeRecord>, user: &str) -> Self {
        Self {
            environment: environment.to_string(),
            timestamp: Utc::now(),
            changes,
            user: user.to_string(),
        }
    }

    /// Change records, one `"<cookbook>: <old> changed to <new>"` per line.
    pub fn render_changes(&self) -> String {
        self.changes.iter().map(|c| format!("{c}\n")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_record_display() {
        let c = ChangeRecord::new("app", "= 2.2.0", Some("= 2.3.1"));
        assert_eq!(c.to_string(), "app: = 2.2.0 changed to = 2.3.1");

        let gone = ChangeRecord::new("old", "= 0.1.0", None);
        assert_eq!(gone.to_string(), "old: = 0.1.0 changed to ");
    }

    #[test]
    fn render_changes_is_one_line_per_record() {
        let event = NotificationEvent::new(
            "production",
            vec![
                ChangeRecord::new("a", "= 1.0.0", Some("= 1.1.0")),
                ChangeRecord::new("b", "= 2.0.0", Some("= 2.0.1")),
            ],
            "deployer",
        );
        assert_eq!(
            event.render_changes(),
            "a: = 1.0.0 changed to = 1.1.0\nb: = 2.0.0 changed to = 2.0.1\n"
        );
    }
}
