use crate::tracker::TaskTracker;
use crate::ApiError;
use std::fmt;

/// Outcome of a sequential multi-task operation
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Task ids handled, with the server's message for each
    pub succeeded: Vec<(String, String)>,
    /// The task that stopped the run, if any
    pub failed: Option<(String, ApiError)>,
    /// Task ids never attempted because of the failure
    pub skipped: Vec<String>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded", self.succeeded.len())?;
        if let Some((id, err)) = &self.failed {
            write!(f, ", failed on {}: {}", id, err)?;
        }
        if !self.skipped.is_empty() {
            write!(f, ", {} skipped", self.skipped.len())?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum BulkAction {
    Cancel,
    Delete,
}

/// Cancels tasks one by one, stopping at the first rejection
pub async fn cancel_many(tracker: &TaskTracker, task_ids: &[String]) -> BulkReport {
    run(tracker, task_ids, BulkAction::Cancel).await
}

/// Deletes tasks one by one, stopping at the first failure
pub async fn delete_many(tracker: &TaskTracker, task_ids: &[String]) -> BulkReport {
    run(tracker, task_ids, BulkAction::Delete).await
}

/// Deletes every task currently known in a terminal status
pub async fn delete_finished(tracker: &TaskTracker) -> BulkReport {
    let finished: Vec<String> = tracker
        .snapshot()
        .into_iter()
        .filter(|t| t.status.is_terminal())
        .map(|t| t.task_id)
        .collect();
    run(tracker, &finished, BulkAction::Delete).await
}

// Talks to the client directly so the collection is re-fetched once at the
// end rather than after every task.
async fn run(tracker: &TaskTracker, task_ids: &[String], action: BulkAction) -> BulkReport {
    let mut report = BulkReport::default();

    for (index, task_id) in task_ids.iter().enumerate() {
        let result = match action {
            BulkAction::Cancel => tracker.client().cancel_task(task_id).await,
            BulkAction::Delete => tracker.client().delete_task(task_id).await,
        };
        match result {
            Ok(message) => report.succeeded.push((task_id.clone(), message)),
            Err(e) => {
                tracing::warn!("Bulk operation stopped at task {}: {}", task_id, e);
                report.failed = Some((task_id.clone(), e));
                report.skipped = task_ids[index + 1..].to_vec();
                break;
            }
        }
    }

    if !task_ids.is_empty() {
        if let Err(e) = tracker.fetch_all().await {
            tracing::warn!("Refresh after bulk operation failed: {}", e);
        }
    }

    tracing::info!("Bulk operation: {}", report);
    report
}

