//! Request and response shapes exchanged with the crawl backend

use crate::options::CrawlConfig;
use crate::state::TaskStatus;
use crate::url::validate_url;
use crate::ValidationError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Default number of URLs a batch may crawl in parallel
pub const DEFAULT_CONCURRENT_LIMIT: u32 = 3;

/// Largest batch the backend accepts
pub const MAX_BATCH_URLS: usize = 100;

/// Message used when a failed result carries no error message
pub const MISSING_ERROR_MESSAGE: &str = "crawl failed without an error message";

// ===== Requests =====

/// Crawl one URL and wait for its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleCrawlRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CrawlConfig>,
}

impl SingleCrawlRequest {
    pub fn new(url: &str, config: Option<CrawlConfig>) -> Result<Self, ValidationError> {
        validate_url(url)?;
        Ok(Self {
            url: url.trim().to_string(),
            config,
        })
    }
}

/// Crawl several URLs as one background task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchCrawlRequest {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CrawlConfig>,
    pub concurrent_limit: u32,
}

impl BatchCrawlRequest {
    /// Builds a batch request from candidate URLs
    ///
    /// Entries are trimmed, blanks dropped and duplicates removed keeping the
    /// first occurrence. Every remaining entry must be an absolute URL.
    pub fn new<I, S>(
        urls: I,
        config: Option<CrawlConfig>,
        concurrent_limit: Option<u32>,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut checked = Vec::new();
        for candidate in urls {
            let trimmed = candidate.as_ref().trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                continue;
            }
            validate_url(trimmed)?;
            checked.push(trimmed.to_string());
        }

        if checked.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if checked.len() > MAX_BATCH_URLS {
            return Err(ValidationError::BatchTooLarge {
                count: checked.len(),
                max: MAX_BATCH_URLS,
            });
        }

        let concurrent_limit = concurrent_limit.unwrap_or(DEFAULT_CONCURRENT_LIMIT);
        if concurrent_limit == 0 {
            return Err(ValidationError::TooSmall {
                field: "concurrent_limit",
                value: "0".to_string(),
                min: "1".to_string(),
            });
        }

        Ok(Self {
            urls: checked,
            config,
            concurrent_limit,
        })
    }
}

/// Crawl one URL and extract structured data described in natural language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredExtractionRequest {
    pub url: String,
    pub extraction_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CrawlConfig>,
}

impl StructuredExtractionRequest {
    pub fn new(
        url: &str,
        extraction_prompt: &str,
        config: Option<CrawlConfig>,
    ) -> Result<Self, ValidationError> {
        validate_url(url)?;
        let prompt = extraction_prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::Empty("extraction_prompt"));
        }
        Ok(Self {
            url: url.trim().to_string(),
            extraction_prompt: prompt.to_string(),
            config,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CleanupRequest {
    pub max_age_hours: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateProjectRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

// ===== Responses =====

/// Uniform wrapper around every backend response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Extra payload some endpoints send instead of `data`
    #[serde(default)]
    pub details: Option<Value>,
}

/// The outcome of crawling one URL, as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Base64 encoded image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Base64 encoded document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    /// Seconds spent on the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<Value>,
}

impl CrawlResult {
    /// Returns why the crawl failed, or `None` if it succeeded
    ///
    /// A failed result without a message breaks the backend contract; it is
    /// reported with [`MISSING_ERROR_MESSAGE`] instead of an error.
    pub fn failure_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        Some(
            self.error_message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(MISSING_ERROR_MESSAGE),
        )
    }

    /// Returns the best textual content available
    pub fn content(&self) -> Option<&str> {
        self.markdown.as_deref().or(self.cleaned_html.as_deref())
    }
}

/// A server-tracked unit of crawl work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub total_urls: u32,
    #[serde(default)]
    pub completed_urls: u32,
    #[serde(default)]
    pub failed_urls: u32,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<CrawlResult>>,
}

impl TaskInfo {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// URLs that have finished, successfully or not
    pub fn finished_urls(&self) -> u32 {
        self.completed_urls.saturating_add(self.failed_urls)
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_at.as_deref().and_then(parse_timestamp)
    }

    /// Finished URLs per second since the task was created
    ///
    /// Measured up to `completed_at`, else `updated_at`. `None` when the
    /// timestamps are missing or no time has elapsed.
    pub fn throughput(&self) -> Option<f64> {
        let start = self.created_at_utc()?;
        let end = self
            .completed_at_utc()
            .or_else(|| self.updated_at.as_deref().and_then(parse_timestamp))?;
        let elapsed = (end - start).num_milliseconds() as f64 / 1000.0;
        (elapsed > 0.0).then(|| self.finished_urls() as f64 / elapsed)
    }

    /// Lists breaches of the snapshot invariants
    ///
    /// These are backend contract violations. They are reported, never
    /// corrected.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.finished_urls() > self.total_urls {
            violations.push(format!(
                "completed_urls ({}) + failed_urls ({}) exceeds total_urls ({})",
                self.completed_urls, self.failed_urls, self.total_urls
            ));
        }
        if self.progress > 100 {
            violations.push(format!("progress {} exceeds 100", self.progress));
        }
        violations
    }
}

/// Light-weight progress view of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub completed_urls: u32,
    #[serde(default)]
    pub total_urls: u32,
    #[serde(default)]
    pub failed_urls: u32,
}

/// A passive grouping record owned by the project service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub total_urls: u32,
}

/// Parses a backend timestamp
///
/// Accepts RFC 3339 and naive ISO 8601 (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// The backend reports progress as a float percentage.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if !raw.is_finite() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}
