//! Submission client behaviour against a mock backend

use super::{client_for, envelope, task_json};
use crawlwatch::api::{BatchCrawlRequest, SingleCrawlRequest, StructuredExtractionRequest};
use crawlwatch::options::{CacheMode, CrawlConfig};
use crawlwatch::{CrawlClient, CrawlOutcome, TaskStatus};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_crawl_single_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/single"))
        .and(body_json(json!({
            "url": "https://example.com",
            "config": {"cache_mode": "enabled"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Crawl completed",
            json!({
                "url": "https://example.com",
                "success": true,
                "status_code": 200,
                "title": "Example",
                "markdown": "# Example"
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = CrawlConfig {
        cache_mode: Some(CacheMode::Enabled),
        ..Default::default()
    };
    let request = SingleCrawlRequest::new("https://example.com", Some(config)).unwrap();
    let outcome = client_for(&server).crawl_single(&request).await.unwrap();

    assert!(outcome.is_crawled());
    assert_eq!(outcome.result().title.as_deref(), Some("Example"));
    assert_eq!(outcome.result().content(), Some("# Example"));
}

#[tokio::test]
async fn test_page_failure_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Crawl completed",
            json!({
                "url": "https://example.com",
                "success": false,
                "status_code": 404,
                "error_message": "Page not found"
            }),
        )))
        .mount(&server)
        .await;

    let request = SingleCrawlRequest::new("https://example.com", None).unwrap();
    let outcome = client_for(&server).crawl_single(&request).await.unwrap();

    assert!(matches!(outcome, CrawlOutcome::PageFailed(_)));
    assert_eq!(outcome.failure_message(), Some("Page not found"));
}

#[tokio::test]
async fn test_envelope_failure_message_is_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Crawler not initialized",
            "data": null
        })))
        .mount(&server)
        .await;

    let request = SingleCrawlRequest::new("https://example.com", None).unwrap();
    let err = client_for(&server).crawl_single(&request).await.unwrap_err();

    assert!(!err.is_transport());
    assert_eq!(err.message(), "Crawler not initialized");
}

#[tokio::test]
async fn test_http_error_detail_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/extract"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "Structured extraction failed: LLM unavailable"})),
        )
        .mount(&server)
        .await;

    let request =
        StructuredExtractionRequest::new("https://example.com", "product names", None).unwrap();
    let err = client_for(&server)
        .extract_structured(&request)
        .await
        .unwrap_err();

    assert_eq!(err.message(), "Structured extraction failed: LLM unavailable");
}

#[tokio::test]
async fn test_malformed_body_is_an_envelope_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_tasks().await.unwrap_err();
    assert!(!err.is_transport());
    assert!(err.message().starts_with("malformed response from backend"));
}

#[tokio::test]
async fn test_transport_error_without_server() {
    let client = CrawlClient::new("http://127.0.0.1:1/api/v1/", Duration::from_secs(2)).unwrap();
    let request = SingleCrawlRequest::new("https://example.com", None).unwrap();

    let err = client.crawl_single(&request).await.unwrap_err();
    assert!(err.is_transport());
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn test_timeout_is_flagged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope("", json!([])))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = CrawlClient::new(
        &format!("{}/api/v1/", server.uri()),
        Duration::from_millis(300),
    )
    .unwrap();
    let err = client.list_tasks().await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_batch_submission_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/crawler/batch"))
        .and(body_json(json!({
            "urls": ["https://a.com", "https://b.com"],
            "concurrent_limit": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Batch crawl task created",
            task_json("t-1", "pending", 0, 0, 2),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let request = BatchCrawlRequest::new(["https://a.com", "https://b.com"], None, None).unwrap();
    let task = client_for(&server).crawl_batch(&request).await.unwrap();

    assert_eq!(task.task_id, "t-1");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.total_urls, 2);
}

#[tokio::test]
async fn test_progress_accepts_bare_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/t-1/progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-1",
            "status": "running",
            "progress": 33.333,
            "completed_urls": 1,
            "total_urls": 3,
            "failed_urls": 0
        })))
        .mount(&server)
        .await;

    let progress = client_for(&server).task_progress("t-1").await.unwrap();
    assert_eq!(progress.status, TaskStatus::Running);
    assert_eq!(progress.progress, 33);
    assert_eq!(progress.total_urls, 3);
}

#[tokio::test]
async fn test_progress_accepts_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/t-1/progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "",
            json!({
                "task_id": "t-1",
                "status": "completed",
                "progress": 100.0,
                "completed_urls": 3,
                "total_urls": 3,
                "failed_urls": 0
            }),
        )))
        .mount(&server)
        .await;

    let progress = client_for(&server).task_progress("t-1").await.unwrap();
    assert_eq!(progress.status, TaskStatus::Completed);
    assert_eq!(progress.progress, 100);
}

#[tokio::test]
async fn test_cleanup_sends_query_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/cleanup"))
        .and(query_param("max_age_hours", "12"))
        .and(body_json(json!({"max_age_hours": 12})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Cleaned up 4 old tasks",
            "data": {"cleaned_count": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let message = client_for(&server).cleanup_tasks(12).await.unwrap();
    assert_eq!(message, "Cleaned up 4 old tasks");
}

#[tokio::test]
async fn test_connection_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/crawler/test-connection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Crawler connection test successful",
            "details": {"url": "https://httpbin.org/html", "status_code": 200}
        })))
        .mount(&server)
        .await;

    assert!(client_for(&server).test_connection().await.unwrap());
}

#[tokio::test]
async fn test_connection_check_reports_backend_problem() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/crawler/test-connection"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "Connection test failed: browser missing"
        })))
        .mount(&server)
        .await;

    assert!(!client_for(&server).test_connection().await.unwrap());
}

#[tokio::test]
async fn test_project_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects/"))
        .and(query_param("name", "docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Project created",
            json!({
                "project_id": "p-1",
                "name": "docs",
                "created_at": "2024-05-01T10:00:00",
                "task_count": 0,
                "total_urls": 0
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/projects/p-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("Project deleted", json!(null))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let project = client.create_project("docs", None).await.unwrap();
    assert_eq!(project.project_id, "p-1");

    let message = client.delete_project("p-1").await.unwrap();
    assert_eq!(message, "Project deleted");
}
