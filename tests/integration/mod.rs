//! Integration tests against a mock crawl backend
//!
//! These tests use wiremock to stand in for the backend's HTTP API.

mod aggregate_tests;
mod client_tests;
mod tracker_tests;

use crawlwatch::CrawlClient;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

/// Creates a client rooted at the mock server's `/api/v1/` prefix
pub fn client_for(server: &MockServer) -> CrawlClient {
    CrawlClient::new(&format!("{}/api/v1/", server.uri()), Duration::from_secs(5))
        .expect("client should build")
}

/// Wraps `data` in a successful response envelope
pub fn envelope(message: &str, data: Value) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": data,
        "timestamp": "2024-05-01T10:00:00"
    })
}

/// A task record as the backend serializes it
pub fn task_json(id: &str, status: &str, completed: u32, failed: u32, total: u32) -> Value {
    let progress = if total == 0 {
        0.0
    } else {
        100.0 * f64::from(completed + failed) / f64::from(total)
    };
    json!({
        "task_id": id,
        "status": status,
        "progress": progress,
        "total_urls": total,
        "completed_urls": completed,
        "failed_urls": failed,
        "created_at": "2024-05-01T10:00:00",
        "updated_at": "2024-05-01T10:00:05"
    })
}
