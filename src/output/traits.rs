//! Output sink trait and error types

use crate::api::{CrawlResult, TaskInfo};
use crate::options::CrawlConfig;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for crawl results fetched from the backend
///
/// Each method returns the path of the record it wrote.
pub trait ResultSink {
    /// Stores the result of a single-URL crawl
    fn save_single(&self, result: &CrawlResult, config: Option<&CrawlConfig>)
        -> OutputResult<PathBuf>;

    /// Stores every result of a finished batch task
    fn save_batch(&self, task: &TaskInfo, config: Option<&CrawlConfig>) -> OutputResult<PathBuf>;

    /// Stores a structured extraction with the prompt that produced it
    fn save_extraction(
        &self,
        prompt: &str,
        result: &CrawlResult,
        config: Option<&CrawlConfig>,
    ) -> OutputResult<PathBuf>;
}
