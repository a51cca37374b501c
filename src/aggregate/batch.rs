use crate::api::{BatchCrawlRequest, TaskInfo};
use crate::options::CrawlConfig;
use crate::tracker::TaskTracker;
use crate::{CrawlwatchError, ValidationError};

/// Splits newline-delimited text into candidate URLs
///
/// Lines are trimmed, blank lines dropped and duplicates removed keeping the
/// first occurrence. No URL validation happens here.
pub fn parse_url_list(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !urls.iter().any(|u| u == line) {
            urls.push(line.to_string());
        }
    }
    urls
}

/// Builds a validated batch request from newline-delimited text
///
/// # Arguments
///
/// * `text` - One URL per line
/// * `config` - Crawl options shared by every URL
/// * `concurrent_limit` - Parallelism on the backend, 3 when `None`
pub fn build_batch_request(
    text: &str,
    config: Option<CrawlConfig>,
    concurrent_limit: Option<u32>,
) -> Result<BatchCrawlRequest, ValidationError> {
    let config = config.filter(|c| !c.is_empty());
    BatchCrawlRequest::new(parse_url_list(text), config, concurrent_limit)
}

/// Validates and submits a batch, then tracks the returned task
///
/// Nothing is sent when validation fails.
pub async fn submit_batch(
    tracker: &TaskTracker,
    text: &str,
    config: Option<CrawlConfig>,
    concurrent_limit: Option<u32>,
) -> Result<TaskInfo, CrawlwatchError> {
    let request = build_batch_request(text, config, concurrent_limit)?;
    Ok(tracker.submit_batch(&request).await?)
}
