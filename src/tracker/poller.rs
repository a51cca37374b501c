use crate::api::TaskInfo;
use crate::tracker::board::Transition;
use crate::tracker::lifecycle::TaskTracker;
use crate::ApiResult;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background refresh loop for a [`TaskTracker`]
///
/// While any task is running, or a submitted batch has not yet been seen to
/// leave `pending`, the collection is refreshed every poll interval. Otherwise
/// the loop parks until a submission or [`TaskTracker::request_refresh`]
/// wakes it. Refresh failures are logged and retried on the next cycle.
pub struct Poller;

/// Handle to a spawned poller
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the loop and waits for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            tracing::warn!("Poller task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Poller {
    /// Spawns the refresh loop on the current tokio runtime
    pub fn spawn(tracker: Arc<TaskTracker>) -> PollerHandle {
        let (shutdown, mut stop) = watch::channel(false);
        let join = tokio::spawn(async move {
            tracing::debug!("Poller started ({:?} interval)", tracker.poll_interval());
            loop {
                if tracker.should_poll() {
                    tokio::select! {
                        _ = tokio::time::sleep(tracker.poll_interval()) => {}
                        _ = stop.changed() => break,
                    }
                } else {
                    tokio::select! {
                        _ = tracker.woken() => {}
                        _ = stop.changed() => break,
                    }
                }
                refresh(&tracker).await;
            }
            tracing::debug!("Poller stopped");
        });
        PollerHandle { shutdown, join }
    }

    /// Refreshes in the foreground until nothing is left to watch
    ///
    /// The first refresh must succeed; later failures are logged and the
    /// loop carries on. `on_cycle` sees the changes and the collection after
    /// every successful refresh.
    pub async fn run_until_idle<F>(tracker: &TaskTracker, mut on_cycle: F) -> ApiResult<()>
    where
        F: FnMut(&[Transition], &[TaskInfo]),
    {
        let transitions = tracker.fetch_all().await?;
        on_cycle(&transitions, &tracker.snapshot());

        while tracker.should_poll() {
            tokio::time::sleep(tracker.poll_interval()).await;
            match tracker.fetch_all().await {
                Ok(transitions) => on_cycle(&transitions, &tracker.snapshot()),
                Err(e) => tracing::warn!("Refresh failed, retrying: {}", e),
            }
        }
        Ok(())
    }
}

async fn refresh(tracker: &TaskTracker) {
    if let Err(e) = tracker.fetch_all().await {
        tracing::warn!("Refresh failed, retrying: {}", e);
    }
}
