//! Crawl option model
//!
//! This module defines the crawl options handed to the backend and turns raw
//! user input into a validated [`CrawlConfig`]. Nothing here performs I/O.

mod build;
mod types;

pub use build::{build_config, defaults, CRAWL_DEPTH_RANGE, PAGE_TIMEOUT_RANGE};
pub use types::{CacheMode, CrawlConfig, CrawlStrategy, RawCrawlInput};
