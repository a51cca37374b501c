/// Task status definitions for tracking crawl progress
///
/// Everything that varies by status is read from [`STATUS_TABLE`]; adding a
/// status means adding one variant and one table row.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a crawl task on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    // ===== Active States =====
    /// Task accepted, work not started yet
    Pending,

    /// Backend is crawling the task's URLs
    Running,

    // ===== Terminal States =====
    /// All URLs were attempted
    Completed,

    /// The task as a whole failed
    Failed,

    /// The task was cancelled before finishing
    Cancelled,
}

/// Something a user can do with a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    View,
    Cancel,
    Delete,
}

/// Per-status presentation and policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusProfile {
    pub status: TaskStatus,
    pub wire_name: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub terminal: bool,
    pub actions: &'static [TaskAction],
}

/// Status lookup table, indexed by `TaskStatus as usize`
pub static STATUS_TABLE: [StatusProfile; 5] = [
    StatusProfile {
        status: TaskStatus::Pending,
        wire_name: "pending",
        label: "Pending",
        color: "orange",
        terminal: false,
        actions: &[TaskAction::View],
    },
    StatusProfile {
        status: TaskStatus::Running,
        wire_name: "running",
        label: "Running",
        color: "blue",
        terminal: false,
        actions: &[TaskAction::View, TaskAction::Cancel],
    },
    StatusProfile {
        status: TaskStatus::Completed,
        wire_name: "completed",
        label: "Completed",
        color: "green",
        terminal: true,
        actions: &[TaskAction::View, TaskAction::Delete],
    },
    StatusProfile {
        status: TaskStatus::Failed,
        wire_name: "failed",
        label: "Failed",
        color: "red",
        terminal: true,
        actions: &[TaskAction::View, TaskAction::Delete],
    },
    StatusProfile {
        status: TaskStatus::Cancelled,
        wire_name: "cancelled",
        label: "Cancelled",
        color: "default",
        terminal: true,
        actions: &[TaskAction::View, TaskAction::Delete],
    },
];

impl TaskStatus {
    /// Returns this status's row of [`STATUS_TABLE`]
    pub fn profile(self) -> &'static StatusProfile {
        &STATUS_TABLE[self as usize]
    }

    /// Returns true if no further transitions can happen
    pub fn is_terminal(self) -> bool {
        self.profile().terminal
    }

    /// Returns true for `pending` and `running`
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub fn label(self) -> &'static str {
        self.profile().label
    }

    pub fn color(self) -> &'static str {
        self.profile().color
    }

    /// Returns true if `action` is offered for a task in this status
    pub fn allows(self, action: TaskAction) -> bool {
        self.profile().actions.contains(&action)
    }

    /// Parses the wire representation
    pub fn from_wire(s: &str) -> Option<Self> {
        STATUS_TABLE
            .iter()
            .find(|p| p.wire_name == s)
            .map(|p| p.status)
    }

    /// Returns all statuses in lifecycle order
    pub fn all() -> impl Iterator<Item = TaskStatus> {
        STATUS_TABLE.iter().map(|p| p.status)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().wire_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_discriminant() {
        for (i, profile) in STATUS_TABLE.iter().enumerate() {
            assert_eq!(profile.status as usize, i, "row {} out of order", i);
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());

        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_allowed_actions() {
        assert!(TaskStatus::Running.allows(TaskAction::Cancel));
        assert!(!TaskStatus::Running.allows(TaskAction::Delete));

        assert!(!TaskStatus::Pending.allows(TaskAction::Cancel));
        assert!(!TaskStatus::Pending.allows(TaskAction::Delete));

        for status in [TaskStatus::Completed, TaskStatus::Failed, TaskStatus::Cancelled] {
            assert!(status.allows(TaskAction::Delete));
            assert!(!status.allows(TaskAction::Cancel));
        }

        assert!(TaskStatus::all().all(|s| s.allows(TaskAction::View)));
    }

    #[test]
    fn test_wire_names_match_serde() {
        for status in TaskStatus::all() {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
            assert_eq!(TaskStatus::from_wire(&status.to_string()), Some(status));
        }
        assert_eq!(TaskStatus::from_wire("paused"), None);
    }

    #[test]
    fn test_labels_and_colors() {
        assert_eq!(TaskStatus::Running.label(), "Running");
        assert_eq!(TaskStatus::Failed.color(), "red");
        assert_eq!(TaskStatus::Cancelled.color(), "default");
    }
}
