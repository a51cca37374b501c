//! HTTP client for the crawl backend
//!
//! This module performs every request/response exchange with the backend:
//! - Building the HTTP client with the fixed request timeout
//! - Resolving endpoint paths under the common prefix
//! - Unwrapping the `{success, message, data, timestamp}` envelope
//! - Classifying failures as transport or envelope errors
//!
//! No call is retried here.

use crate::api::outcome::CrawlOutcome;
use crate::api::types::{
    ApiEnvelope, BatchCrawlRequest, CleanupRequest, CreateProjectRequest, CrawlResult,
    ProjectInfo, SingleCrawlRequest, StructuredExtractionRequest, TaskInfo, TaskProgress,
};
use crate::config::ServerConfig;
use crate::{ApiError, ApiResult, CrawlwatchError};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Request timeout applied to every backend call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Message used when neither the server nor the transport gave one
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

const USER_AGENT: &str = concat!("crawlwatch/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client for backend calls
///
/// # Arguments
///
/// * `timeout` - Total time allowed per request
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the crawl, task and project endpoints
#[derive(Debug, Clone)]
pub struct CrawlClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

// The progress endpoint may answer without the envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProgressBody {
    Wrapped(ApiEnvelope<TaskProgress>),
    Bare(TaskProgress),
}

impl CrawlClient {
    /// Creates a client for the backend rooted at `base_url`
    ///
    /// `base_url` includes the common path prefix, e.g.
    /// `http://localhost:8000/api/v1/`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CrawlwatchError> {
        let base_url = crate::url::validate_url(base_url)?;
        let http = build_http_client(timeout)?;
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// Creates a client from the `[server]` configuration table
    pub fn from_config(config: &ServerConfig) -> Result<Self, CrawlwatchError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ===== Crawl endpoints =====

    /// Crawls a single URL and returns its result
    pub async fn crawl_single(&self, request: &SingleCrawlRequest) -> ApiResult<CrawlOutcome> {
        let rb = self.request(Method::POST, &["crawler", "single"]).json(request);
        let result: CrawlResult = self.exchange_data(rb).await?;
        Ok(CrawlOutcome::from_result(result))
    }

    /// Submits a batch and returns the pending task handle
    pub async fn crawl_batch(&self, request: &BatchCrawlRequest) -> ApiResult<TaskInfo> {
        let rb = self.request(Method::POST, &["crawler", "batch"]).json(request);
        self.exchange_data(rb).await
    }

    /// Crawls a URL and extracts structured data from it
    pub async fn extract_structured(
        &self,
        request: &StructuredExtractionRequest,
    ) -> ApiResult<CrawlOutcome> {
        let rb = self.request(Method::POST, &["crawler", "extract"]).json(request);
        let result: CrawlResult = self.exchange_data(rb).await?;
        Ok(CrawlOutcome::from_result(result))
    }

    /// Checks that the backend and its crawler are reachable
    ///
    /// Returns `Ok(false)` if the backend answered but reported a problem,
    /// and `Err` only when no response arrived.
    pub async fn test_connection(&self) -> ApiResult<bool> {
        let rb = self.request(Method::GET, &["crawler", "test-connection"]);
        match self.exchange::<Value>(rb).await {
            Ok(envelope) => {
                tracing::debug!(
                    "Connection test: {} (details: {:?})",
                    envelope.message,
                    envelope.details
                );
                Ok(true)
            }
            Err(e @ ApiError::Transport { .. }) => Err(e),
            Err(e) => {
                tracing::warn!("Connection test failed: {}", e);
                Ok(false)
            }
        }
    }

    // ===== Task endpoints =====

    /// Fetches every task the backend tracks
    pub async fn list_tasks(&self) -> ApiResult<Vec<TaskInfo>> {
        let rb = self.request(Method::GET, &["tasks", ""]);
        let envelope: ApiEnvelope<Vec<TaskInfo>> = self.exchange(rb).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn get_task(&self, task_id: &str) -> ApiResult<TaskInfo> {
        let rb = self.request(Method::GET, &["tasks", task_id]);
        self.exchange_data(rb).await
    }

    pub async fn task_progress(&self, task_id: &str) -> ApiResult<TaskProgress> {
        let rb = self.request(Method::GET, &["tasks", task_id, "progress"]);
        match self.exchange_raw::<ProgressBody>(rb).await? {
            ProgressBody::Bare(progress) => Ok(progress),
            ProgressBody::Wrapped(envelope) => require_data(check_envelope(envelope)?),
        }
    }

    /// Asks the backend to cancel a task; returns the server message
    pub async fn cancel_task(&self, task_id: &str) -> ApiResult<String> {
        let rb = self.request(Method::POST, &["tasks", task_id, "cancel"]);
        self.exchange_message(rb).await
    }

    /// Deletes a task; returns the server message
    pub async fn delete_task(&self, task_id: &str) -> ApiResult<String> {
        let rb = self.request(Method::DELETE, &["tasks", task_id]);
        self.exchange_message(rb).await
    }

    /// Deletes terminal tasks older than `max_age_hours`
    pub async fn cleanup_tasks(&self, max_age_hours: u32) -> ApiResult<String> {
        let rb = self
            .request(Method::POST, &["tasks", "cleanup"])
            .query(&[("max_age_hours", max_age_hours)])
            .json(&CleanupRequest { max_age_hours });
        self.exchange_message(rb).await
    }

    // ===== Project endpoints =====

    pub async fn list_projects(&self) -> ApiResult<Vec<ProjectInfo>> {
        let rb = self.request(Method::GET, &["projects", ""]);
        let envelope: ApiEnvelope<Vec<ProjectInfo>> = self.exchange(rb).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ApiResult<ProjectInfo> {
        let mut query = vec![("name", name)];
        if let Some(description) = description {
            query.push(("description", description));
        }
        let rb = self
            .request(Method::POST, &["projects", ""])
            .query(&query)
            .json(&CreateProjectRequest { name, description });
        self.exchange_data(rb).await
    }

    pub async fn get_project(&self, project_id: &str) -> ApiResult<ProjectInfo> {
        let rb = self.request(Method::GET, &["projects", project_id]);
        self.exchange_data(rb).await
    }

    pub async fn delete_project(&self, project_id: &str) -> ApiResult<String> {
        let rb = self.request(Method::DELETE, &["projects", project_id]);
        self.exchange_message(rb).await
    }

    // ===== Plumbing =====

    /// Resolves `segments` under the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    async fn exchange_data<T: DeserializeOwned>(&self, rb: RequestBuilder) -> ApiResult<T> {
        require_data(self.exchange(rb).await?)
    }

    async fn exchange_message(&self, rb: RequestBuilder) -> ApiResult<String> {
        let envelope: ApiEnvelope<Value> = self.exchange(rb).await?;
        Ok(envelope.message)
    }

    /// Sends a request and returns its envelope if it reports success
    async fn exchange<T: DeserializeOwned>(&self, rb: RequestBuilder) -> ApiResult<ApiEnvelope<T>> {
        check_envelope(self.exchange_raw(rb).await?)
    }

    /// Sends a request and decodes a 2xx body as `T`
    async fn exchange_raw<T: DeserializeOwned>(&self, rb: RequestBuilder) -> ApiResult<T> {
        let response = rb
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !status.is_success() {
            let message = error_message_from_body(status, &body);
            tracing::debug!("Backend answered {}: {}", status, message);
            return Err(ApiError::Envelope {
                message,
                status: Some(status.as_u16()),
            });
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Envelope {
            message: format!("malformed response from backend: {}", e),
            status: Some(status.as_u16()),
        })
    }
}

fn check_envelope<T>(envelope: ApiEnvelope<T>) -> ApiResult<ApiEnvelope<T>> {
    if envelope.success {
        return Ok(envelope);
    }
    let message = if envelope.message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        envelope.message
    };
    Err(ApiError::Envelope {
        message,
        status: None,
    })
}

fn require_data<T>(envelope: ApiEnvelope<T>) -> ApiResult<T> {
    match envelope.data {
        Some(data) => Ok(data),
        None => Err(ApiError::Envelope {
            message: if envelope.message.is_empty() {
                "response carried no data".to_string()
            } else {
                format!("{} (response carried no data)", envelope.message)
            },
            status: None,
        }),
    }
}

/// Classifies a reqwest failure that produced no usable response
fn transport_error(error: reqwest::Error, timeout: Duration) -> ApiError {
    if error.is_timeout() {
        return ApiError::Transport {
            message: format!("request timed out after {}s", timeout.as_secs()),
            timed_out: true,
        };
    }
    let text = error.to_string();
    ApiError::Transport {
        message: if text.is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            text
        },
        timed_out: false,
    }
}

/// Picks the best message out of a non-2xx body
///
/// Order: `detail` (string, or the `msg` of each validation item), then an
/// envelope `message`, then the HTTP status line.
fn error_message_from_body(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            if !message.trim().is_empty() {
                return message.to_string();
            }
        }
    }

    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}
