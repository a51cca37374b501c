use crate::options::RawCrawlInput;
use serde::Deserialize;

/// Main configuration structure for crawlwatch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Default crawl options applied to every submission
    #[serde(default)]
    pub crawl: RawCrawlInput,
}

/// Crawl backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Backend URL including the API prefix
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to every request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Task tracking behavior
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Refresh interval while tasks are running (seconds)
    #[serde(rename = "poll-interval-secs", default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Age threshold used by `cleanup` when none is given (hours)
    #[serde(rename = "cleanup-max-age-hours", default = "default_cleanup_age")]
    pub cleanup_max_age_hours: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where saved results are written
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1/".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    5
}

fn default_cleanup_age() -> u32 {
    24
}

fn default_export_dir() -> String {
    "./crawl_data".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            cleanup_max_age_hours: default_cleanup_age(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
        }
    }
}
