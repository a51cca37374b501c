//! Crawl backend API
//!
//! This module contains the submission client and the data shapes that
//! cross the backend boundary:
//! - Request types with checked constructors
//! - `CrawlResult`, `TaskInfo`, `ProjectInfo` and the response envelope
//! - `CrawlOutcome`, which keeps page failures apart from API failures
//! - `CrawlClient`, one method per backend endpoint

mod client;
mod outcome;
mod types;

pub use client::{build_http_client, CrawlClient, DEFAULT_REQUEST_TIMEOUT, GENERIC_FAILURE_MESSAGE};
pub use outcome::CrawlOutcome;
pub use types::{
    parse_timestamp, ApiEnvelope, BatchCrawlRequest, CrawlResult, ProjectInfo,
    SingleCrawlRequest, StructuredExtractionRequest, TaskInfo, TaskProgress,
    DEFAULT_CONCURRENT_LIMIT, MAX_BATCH_URLS, MISSING_ERROR_MESSAGE,
};
