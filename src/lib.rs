//! Crawlwatch: a client for an asynchronous web-crawling service
//!
//! This crate submits single-URL, batch and structured-extraction crawls to a
//! remote crawl backend, then tracks the resulting tasks to completion by
//! polling, surfacing progress, partial results and failures.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod options;
pub mod output;
pub mod state;
pub mod tracker;
pub mod url;

use thiserror::Error;

/// Main error type for crawlwatch operations
#[derive(Debug, Error)]
pub enum CrawlwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised before any request is sent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Batch contains no URLs")]
    EmptyBatch,

    #[error("Batch contains {count} URLs, the maximum is {max}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        value: String,
        min: String,
    },

    #[error("{field} has unknown value '{value}' (expected one of: {expected})")]
    UnknownChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// A failed exchange with the crawl backend
///
/// Both variants carry the best human-readable message available, so callers
/// can report a failure through [`ApiError::message`] without caring where it
/// came from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was received (network failure, timeout)
    #[error("{message}")]
    Transport { message: String, timed_out: bool },

    /// A response arrived but it did not report success
    #[error("{message}")]
    Envelope {
        message: String,
        status: Option<u16>,
    },
}

impl ApiError {
    /// Returns the human-readable failure message
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. } | Self::Envelope { message, .. } => message,
        }
    }

    /// Returns true if the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns true if the request hit the client timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timed_out: true, .. })
    }
}

/// Result type alias for crawlwatch operations
pub type Result<T> = std::result::Result<T, CrawlwatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for backend calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// Re-export commonly used types
pub use api::{CrawlClient, CrawlOutcome, CrawlResult, ProjectInfo, TaskInfo};
pub use config::Config;
pub use options::{build_config, CrawlConfig, RawCrawlInput};
pub use state::TaskStatus;
pub use tracker::{Poller, TaskBoard, TaskTracker};
