use crate::api::{BatchCrawlRequest, CrawlClient, TaskInfo};
use crate::config::TrackerConfig;
use crate::state::{TaskAction, TaskStatus};
use crate::tracker::board::{TaskBoard, Transition};
use crate::ApiResult;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

/// Default delay between two refreshes while work is in flight
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Tracks backend tasks for one view
///
/// The tracker owns the task collection. State only changes from backend
/// snapshots: every mutation is followed by a full re-fetch. Responses to
/// requests that were started before [`close_view`](Self::close_view) are
/// discarded.
pub struct TaskTracker {
    client: Arc<CrawlClient>,
    board: Mutex<TaskBoard>,
    /// Submitted tasks not yet observed outside `pending`
    awaiting: Mutex<HashSet<String>>,
    generation: AtomicU64,
    wake: Notify,
    poll_interval: Duration,
}

impl TaskTracker {
    /// Creates a tracker polling at `poll_interval`
    pub fn new(client: Arc<CrawlClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            board: Mutex::new(TaskBoard::new()),
            awaiting: Mutex::new(HashSet::new()),
            generation: AtomicU64::new(0),
            wake: Notify::new(),
            poll_interval,
        }
    }

    /// Creates a tracker from the `[tracker]` configuration table
    pub fn from_config(client: Arc<CrawlClient>, config: &TrackerConfig) -> Self {
        Self::new(client, Duration::from_secs(config.poll_interval_secs))
    }

    pub fn client(&self) -> &CrawlClient {
        &self.client
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // ===== View liveness =====

    /// Current view generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Marks the current view as gone
    ///
    /// Requests already in flight still complete, but their responses no
    /// longer touch the task collection.
    pub fn close_view(&self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        self.awaiting_guard().clear();
        tracing::debug!("Closed view generation {}", previous);
    }

    fn is_live(&self, generation: u64) -> bool {
        let live = self.generation() == generation;
        if !live {
            tracing::debug!("Discarding response from closed view generation {}", generation);
        }
        live
    }

    // ===== Reads =====

    /// Refreshes the whole collection from the backend
    ///
    /// Returns the status changes the refresh revealed. A response that
    /// arrives after the view closed is discarded and yields no changes.
    pub async fn fetch_all(&self) -> ApiResult<Vec<Transition>> {
        let generation = self.generation();
        let tasks = self.client.list_tasks().await?;
        if !self.is_live(generation) {
            return Ok(Vec::new());
        }

        let transitions = self.board_guard().replace_all(tasks);
        self.settle_awaiting();
        for t in &transitions {
            tracing::info!("Task {}", t);
        }
        Ok(transitions)
    }

    /// Refreshes one task and returns the tracker's view of it
    ///
    /// The returned snapshot honours the terminal-status freeze.
    pub async fn fetch_one(&self, task_id: &str) -> ApiResult<TaskInfo> {
        let generation = self.generation();
        let task = self.client.get_task(task_id).await?;
        if !self.is_live(generation) {
            return Ok(task);
        }

        let mut board = self.board_guard();
        if let Some(t) = board.apply_one(task.clone()) {
            tracing::info!("Task {}", t);
        }
        let current = board.get(task_id).cloned().unwrap_or(task);
        drop(board);

        self.settle_awaiting();
        Ok(current)
    }

    /// Returns a copy of the current collection
    pub fn snapshot(&self) -> Vec<TaskInfo> {
        self.board_guard().tasks().to_vec()
    }

    pub fn get(&self, task_id: &str) -> Option<TaskInfo> {
        self.board_guard().get(task_id).cloned()
    }

    /// Returns true while a refresh loop has something to watch
    pub fn should_poll(&self) -> bool {
        self.board_guard().has_running() || !self.awaiting_guard().is_empty()
    }

    // ===== Mutations =====

    /// Submits a batch and starts tracking the returned task
    pub async fn submit_batch(&self, request: &BatchCrawlRequest) -> ApiResult<TaskInfo> {
        let generation = self.generation();
        let task = self.client.crawl_batch(request).await?;
        tracing::info!(
            "Submitted batch task {} ({} URLs, concurrency {})",
            task.task_id,
            request.urls.len(),
            request.concurrent_limit
        );
        self.track_submission(task.clone(), generation);
        Ok(task)
    }

    /// Records a freshly submitted task and wakes the poller
    ///
    /// Ignored if the view that submitted it has since closed; the task still
    /// exists on the backend and shows up on the next listing.
    pub fn track_submission(&self, task: TaskInfo, generation: u64) {
        if !self.is_live(generation) {
            return;
        }
        if !task.is_terminal() {
            self.awaiting_guard().insert(task.task_id.clone());
        }
        self.board_guard().apply_one(task);
        self.wake.notify_one();
    }

    /// Asks the backend to cancel a task, then refreshes
    ///
    /// The backend decides; a rejection comes back with its message intact.
    pub async fn cancel(&self, task_id: &str) -> ApiResult<String> {
        self.check_action(task_id, TaskAction::Cancel);
        let result = self.client.cancel_task(task_id).await;
        match &result {
            Ok(message) => tracing::info!("Cancel requested for task {}: {}", task_id, message),
            Err(e) => tracing::warn!("Cancel rejected for task {}: {}", task_id, e),
        }
        self.refresh_after_mutation().await;
        result
    }

    /// Deletes a task, then refreshes
    pub async fn delete(&self, task_id: &str) -> ApiResult<String> {
        self.check_action(task_id, TaskAction::Delete);
        let result = self.client.delete_task(task_id).await;
        match &result {
            Ok(message) => tracing::info!("Deleted task {}: {}", task_id, message),
            Err(e) => tracing::warn!("Delete failed for task {}: {}", task_id, e),
        }
        self.refresh_after_mutation().await;
        result
    }

    /// Removes finished tasks older than `max_age_hours` on the backend
    pub async fn cleanup(&self, max_age_hours: u32) -> ApiResult<String> {
        let message = self.client.cleanup_tasks(max_age_hours).await?;
        tracing::info!("Cleanup (older than {}h): {}", max_age_hours, message);
        self.refresh_after_mutation().await;
        Ok(message)
    }

    /// Wakes a parked poller for an immediate refresh
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    pub(crate) async fn woken(&self) {
        self.wake.notified().await
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.fetch_all().await {
            tracing::warn!("Refresh after mutation failed: {}", e);
        }
    }

    fn check_action(&self, task_id: &str, action: TaskAction) {
        if let Some(status) = self.board_guard().get(task_id).map(|t| t.status) {
            if !status.allows(action) {
                tracing::warn!(
                    "{:?} is not offered for {} task {}; sending anyway",
                    action,
                    status,
                    task_id
                );
            }
        }
    }

    // Stop waiting on tasks seen to leave `pending` or gone from the listing.
    fn settle_awaiting(&self) {
        let board = self.board_guard();
        self.awaiting_guard().retain(|id| {
            board
                .get(id)
                .map(|t| t.status == TaskStatus::Pending)
                .unwrap_or(false)
        });
    }

    // A poisoned lock only means another thread panicked mid-update; the
    // board is always replaced whole, so its contents stay usable.
    fn board_guard(&self) -> MutexGuard<'_, TaskBoard> {
        self.board.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn awaiting_guard(&self) -> MutexGuard<'_, HashSet<String>> {
        self.awaiting.lock().unwrap_or_else(|e| e.into_inner())
    }
}
