//! In-memory task collection
//!
//! The board never patches a task in place from local knowledge. It only
//! takes whole snapshots from the backend, with one exception: once a task
//! has been seen in a terminal status, later snapshots cannot move it.

use crate::api::TaskInfo;
use crate::state::TaskStatus;
use std::fmt;

/// A task status change observed between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub task_id: String,
    /// `None` when the task was not on the board before
    pub from: Option<TaskStatus>,
    pub to: TaskStatus,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "{}: {} -> {}", self.task_id, from, self.to),
            None => write!(f, "{}: new ({})", self.task_id, self.to),
        }
    }
}

/// Latest known snapshot of every task
#[derive(Debug, Default, Clone)]
pub struct TaskBoard {
    tasks: Vec<TaskInfo>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in the order the backend listed them
    pub fn tasks(&self) -> &[TaskInfo] {
        &self.tasks
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskInfo> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replaces the whole collection with a fresh listing
    ///
    /// Tasks missing from `incoming` are dropped. Returns the status changes
    /// relative to the previous collection.
    pub fn replace_all(&mut self, incoming: Vec<TaskInfo>) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let mut next = Vec::with_capacity(incoming.len());

        for task in incoming {
            let previous = self.get(&task.task_id);
            let merged = reconcile(previous, task);
            if let Some(t) = transition(previous, &merged) {
                transitions.push(t);
            }
            next.push(merged);
        }

        self.tasks = next;
        transitions
    }

    /// Inserts or updates a single task snapshot
    pub fn apply_one(&mut self, task: TaskInfo) -> Option<Transition> {
        match self.tasks.iter().position(|t| t.task_id == task.task_id) {
            Some(index) => {
                let merged = reconcile(Some(&self.tasks[index]), task);
                let change = transition(Some(&self.tasks[index]), &merged);
                self.tasks[index] = merged;
                change
            }
            None => {
                let merged = reconcile(None, task);
                let change = transition(None, &merged);
                self.tasks.insert(0, merged);
                change
            }
        }
    }

    /// Removes a task; returns it if it was present
    pub fn remove(&mut self, task_id: &str) -> Option<TaskInfo> {
        let index = self.tasks.iter().position(|t| t.task_id == task_id)?;
        Some(self.tasks.remove(index))
    }

    pub fn has_running(&self) -> bool {
        self.tasks.iter().any(|t| t.status == TaskStatus::Running)
    }

    pub fn running_count(&self) -> usize {
        self.count(TaskStatus::Running)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

// Terminal status wins over whatever a later snapshot says.
fn reconcile(previous: Option<&TaskInfo>, mut incoming: TaskInfo) -> TaskInfo {
    for violation in incoming.invariant_violations() {
        tracing::warn!("Task {} snapshot is inconsistent: {}", incoming.task_id, violation);
    }

    let Some(previous) = previous.filter(|p| p.is_terminal()) else {
        return incoming;
    };

    if incoming.status != previous.status {
        tracing::warn!(
            "Ignoring {} -> {} for task {}: task already finished",
            previous.status,
            incoming.status,
            previous.task_id
        );
        return previous.clone();
    }

    // Results and completion time are fixed once known.
    if previous.results.is_some() {
        incoming.results = previous.results.clone();
    }
    if previous.completed_at.is_some() {
        incoming.completed_at = previous.completed_at.clone();
    }
    incoming
}

fn transition(previous: Option<&TaskInfo>, current: &TaskInfo) -> Option<Transition> {
    let from = previous.map(|p| p.status);
    if from == Some(current.status) {
        return None;
    }
    Some(Transition {
        task_id: current.task_id.clone(),
        from,
        to: current.status,
    })
}
