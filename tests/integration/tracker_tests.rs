//! Task tracking and polling against a mock backend

use super::{client_for, envelope, task_json};
use crawlwatch::api::BatchCrawlRequest;
use crawlwatch::tracker::{Poller, TaskTracker};
use crawlwatch::TaskStatus;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAST_POLL: Duration = Duration::from_millis(50);

fn tracker_for(server: &MockServer) -> TaskTracker {
    TaskTracker::new(Arc::new(client_for(server)), FAST_POLL)
}

async fn list_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "GET" && r.url.path() == "/api/v1/tasks/")
        .count()
}

#[tokio::test]
async fn test_fetch_all_replaces_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([
                task_json("a", "running", 1, 0, 4),
                task_json("b", "completed", 2, 0, 2)
            ]),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "completed", 4, 0, 4)]),
        )))
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);

    let first = tracker.fetch_all().await.unwrap();
    assert_eq!(first.len(), 2);
    assert!(tracker.should_poll());

    let second = tracker.fetch_all().await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].from, Some(TaskStatus::Running));
    assert_eq!(second[0].to, TaskStatus::Completed);

    // "b" was deleted server-side and is gone locally too.
    assert_eq!(tracker.snapshot().len(), 1);
    assert!(!tracker.should_poll());
}

#[tokio::test]
async fn test_cancel_rejection_is_verbatim_and_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/a/cancel"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Task cannot be cancelled"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "completed", 3, 0, 3)]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let err = tracker.cancel("a").await.unwrap_err();

    assert_eq!(err.message(), "Task cannot be cancelled");
    assert_eq!(tracker.get("a").map(|t| t.status), Some(TaskStatus::Completed));
}

#[tokio::test]
async fn test_rejected_cancel_on_finished_task_keeps_snapshot() {
    let server = MockServer::start().await;

    let mut finished = task_json("a", "completed", 2, 0, 2);
    finished["completed_at"] = json!("2024-05-01T10:05:00");
    finished["results"] = json!([
        {"url": "https://a.com", "success": true},
        {"url": "https://b.com", "success": true}
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("", json!([finished]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Stale listing served after the rejected cancel.
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "running", 1, 0, 2)]),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/a/cancel"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Task is already completed and cannot be cancelled"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    tracker.fetch_all().await.unwrap();
    let before = tracker.get("a").unwrap();
    assert_eq!(before.status, TaskStatus::Completed);

    let err = tracker.cancel("a").await.unwrap_err();
    assert_eq!(err.message(), "Task is already completed and cannot be cancelled");
    assert_eq!(list_requests(&server).await, 2);

    let after = tracker.get("a").unwrap();
    assert_eq!(after.status, TaskStatus::Completed);
    assert_eq!(after.results, before.results);
    assert_eq!(after.results.as_ref().map(Vec::len), Some(2));
    assert_eq!(after.completed_at.as_deref(), Some("2024-05-01T10:05:00"));
}

#[tokio::test]
async fn test_cancel_success_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "running", 1, 0, 3)]),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "cancelled", 1, 0, 3)]),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/a/cancel"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("Task cancelled", json!(null))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    tracker.fetch_all().await.unwrap();

    let message = tracker.cancel("a").await.unwrap();
    assert_eq!(message, "Task cancelled");
    assert_eq!(tracker.get("a").map(|t| t.status), Some(TaskStatus::Cancelled));
    assert_eq!(list_requests(&server).await, 2);
}

#[tokio::test]
async fn test_completed_task_is_not_reverted_by_stale_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!(task_json("a", "completed", 3, 0, 3)),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "running", 2, 0, 3)]),
        )))
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let task = tracker.fetch_one("a").await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);

    let transitions = tracker.fetch_all().await.unwrap();
    assert!(transitions.is_empty());
    assert_eq!(tracker.get("a").map(|t| t.status), Some(TaskStatus::Completed));
}

#[tokio::test]
async fn test_response_after_close_view_is_discarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope("", json!([task_json("a", "running", 0, 0, 1)])))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let (result, _) = tokio::join!(tracker.fetch_all(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        tracker.close_view();
    });

    assert!(result.unwrap().is_empty());
    assert!(tracker.snapshot().is_empty());
}

#[tokio::test]
async fn test_run_until_idle_stops_when_nothing_runs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "running", 1, 0, 2)]),
        )))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "completed", 2, 0, 2)]),
        )))
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let mut cycles = 0;
    Poller::run_until_idle(&tracker, |_, _| cycles += 1)
        .await
        .unwrap();

    assert_eq!(cycles, 3);
    assert_eq!(list_requests(&server).await, 3);
    assert!(!tracker.should_poll());
}

#[tokio::test]
async fn test_refresh_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "running", 1, 0, 2)]),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "database locked"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "failed", 1, 1, 2)]),
        )))
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    Poller::run_until_idle(&tracker, |_, _| {}).await.unwrap();

    assert_eq!(list_requests(&server).await, 3);
    assert_eq!(tracker.get("a").map(|t| t.status), Some(TaskStatus::Failed));
}

#[tokio::test]
async fn test_spawned_poller_parks_until_submission() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Batch crawl task created",
            task_json("t-1", "pending", 0, 0, 1),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("t-1", "completed", 1, 0, 1)]),
        )))
        .mount(&server)
        .await;

    let tracker = Arc::new(tracker_for(&server));
    let handle = Poller::spawn(Arc::clone(&tracker));

    tokio::time::sleep(FAST_POLL * 4).await;
    assert_eq!(list_requests(&server).await, 0);

    let request = BatchCrawlRequest::new(["https://a.com"], None, None).unwrap();
    tracker.submit_batch(&request).await.unwrap();

    tokio::time::sleep(FAST_POLL * 6).await;
    assert_eq!(list_requests(&server).await, 1);
    assert_eq!(tracker.get("t-1").map(|t| t.status), Some(TaskStatus::Completed));
    assert!(!tracker.should_poll());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_manual_refresh_wakes_parked_poller() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("a", "completed", 1, 0, 1)]),
        )))
        .mount(&server)
        .await;

    let tracker = Arc::new(tracker_for(&server));
    let handle = Poller::spawn(Arc::clone(&tracker));

    tokio::time::sleep(FAST_POLL * 4).await;
    assert_eq!(list_requests(&server).await, 0);

    tracker.request_refresh();
    tokio::time::sleep(FAST_POLL * 6).await;

    // One refresh, then parked again since nothing is running.
    assert_eq!(list_requests(&server).await, 1);
    assert_eq!(tracker.get("a").map(|t| t.status), Some(TaskStatus::Completed));
    assert!(!tracker.should_poll());

    handle.shutdown().await;
}
