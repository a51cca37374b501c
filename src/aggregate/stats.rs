use crate::api::{ProjectInfo, TaskInfo};
use crate::state::TaskStatus;
use serde::Serialize;

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// URLs crawled successfully across all tasks
    pub total_crawls: u64,
    /// Tasks currently running
    pub active_tasks: usize,
    pub total_projects: usize,
    /// Percentage of tasks that completed, rounded
    pub success_rate: u32,
}

impl DashboardStats {
    /// Derives dashboard numbers from task and project listings
    pub fn derive(tasks: &[TaskInfo], projects: &[ProjectInfo]) -> Self {
        let counts = TaskCounts::from_tasks(tasks);
        Self {
            total_crawls: tasks.iter().map(|t| u64::from(t.completed_urls)).sum(),
            active_tasks: counts.running,
            total_projects: projects.len(),
            success_rate: counts.success_rate(),
        }
    }
}

/// Task totals per status, for list headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[TaskInfo]) -> Self {
        let mut counts = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Running => counts.running += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    /// `round(100 × completed / total)`, 0 for an empty collection
    pub fn success_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.completed as f64 / self.total as f64).round() as u32
    }
}
