//! Batch submission and bulk operations against a mock backend

use super::{client_for, envelope, task_json};
use crawlwatch::aggregate::{delete_finished, delete_many, submit_batch};
use crawlwatch::tracker::TaskTracker;
use crawlwatch::{CrawlwatchError, TaskStatus, ValidationError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tracker_for(server: &MockServer) -> TaskTracker {
    TaskTracker::new(Arc::new(client_for(server)), Duration::from_millis(50))
}

#[tokio::test]
async fn test_submit_batch_tracks_pending_task() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/batch"))
        .and(body_json(json!({
            "urls": ["https://a.com", "https://b.com"],
            "concurrent_limit": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Batch crawl task created",
            task_json("t-1", "pending", 0, 0, 2),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let task = submit_batch(&tracker, "https://a.com\n\nhttps://b.com \n", None, Some(5))
        .await
        .unwrap();

    assert_eq!(task.task_id, "t-1");
    assert_eq!(tracker.get("t-1").map(|t| t.status), Some(TaskStatus::Pending));
    assert!(tracker.should_poll());
}

#[tokio::test]
async fn test_invalid_batch_is_never_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/batch"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let err = submit_batch(&tracker, "\n  \n", None, None).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlwatchError::Validation(ValidationError::EmptyBatch)
    ));
}

#[tokio::test]
async fn test_delete_many_stops_at_first_failure() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/tasks/a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("Task deleted", json!(null))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/tasks/b"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Task not found"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/tasks/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("c", "completed", 1, 0, 1)]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = tracker_for(&server);
    let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let report = delete_many(&tracker, &ids).await;

    assert!(!report.is_complete());
    assert_eq!(report.succeeded, vec![("a".to_string(), "Task deleted".to_string())]);
    let (failed_id, err) = report.failed.as_ref().unwrap();
    assert_eq!(failed_id, "b");
    assert_eq!(err.message(), "Task not found");
    assert_eq!(report.skipped, vec!["c".to_string()]);
    assert_eq!(tracker.snapshot().len(), 1);
}

#[tokio::test]
async fn test_delete_finished_only_touches_terminal_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([
                task_json("run", "running", 0, 0, 2),
                task_json("done", "completed", 2, 0, 2),
                task_json("bad", "failed", 0, 2, 2)
            ]),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!([task_json("run", "running", 1, 0, 2)]),
        )))
        .mount(&server)
        .await;

    for id in ["done", "bad"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v1/tasks/{}", id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope("Task deleted", json!(null))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let tracker = tracker_for(&server);
    tracker.fetch_all().await.unwrap();

    let report = delete_finished(&tracker).await;
    assert!(report.is_complete());
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(tracker.snapshot().len(), 1);
    assert!(tracker.should_poll());
}
