//! JSON export of crawl results
//!
//! Files are laid out under the export directory as:
//! - `single/<YYYYMMDD_HHMMSS>_<domain>_<hash8>.json`
//! - `batch/batch_<task_id>_<YYYYMMDD_HHMMSS>.json`
//! - `structured/structured_<YYYYMMDD_HHMMSS>_<domain>_<hash8>.json`
//!
//! `hash8` is the first 8 hex characters of the SHA-256 of the URL.

use crate::api::{CrawlResult, TaskInfo};
use crate::options::CrawlConfig;
use crate::output::analysis::{BatchAnalysis, ExtractionAnalysis, ResultAnalysis};
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::url::file_safe_domain;
use chrono::{DateTime, Local};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const SINGLE_DIR: &str = "single";
const BATCH_DIR: &str = "batch";
const STRUCTURED_DIR: &str = "structured";

#[derive(Serialize)]
struct SingleRecord<'a> {
    crawl_id: String,
    timestamp: String,
    config: Option<&'a CrawlConfig>,
    result: &'a CrawlResult,
    analysis: ResultAnalysis,
}

#[derive(Serialize)]
struct BatchRecord<'a> {
    batch_id: &'a str,
    timestamp: String,
    config: Option<&'a CrawlConfig>,
    status: String,
    total_urls: usize,
    successful_crawls: usize,
    failed_crawls: usize,
    results: &'a [CrawlResult],
    batch_analysis: BatchAnalysis,
}

#[derive(Serialize)]
struct ExtractionRecord<'a> {
    extraction_id: String,
    timestamp: String,
    url: &'a str,
    extraction_prompt: &'a str,
    config: Option<&'a CrawlConfig>,
    result: &'a CrawlResult,
    analysis: ExtractionAnalysis,
}

/// Writes crawl results as pretty-printed JSON files
#[derive(Debug, Clone)]
pub struct ResultSaver {
    base_dir: PathBuf,
}

impl ResultSaver {
    /// Creates a saver rooted at `base_dir`, creating its subdirectories
    pub fn new(base_dir: impl Into<PathBuf>) -> OutputResult<Self> {
        let base_dir = base_dir.into();
        for sub in [SINGLE_DIR, BATCH_DIR, STRUCTURED_DIR] {
            fs::create_dir_all(base_dir.join(sub))?;
        }
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn write<T: Serialize>(&self, dir: &str, file_name: String, record: &T) -> OutputResult<PathBuf> {
        let path = self.base_dir.join(dir).join(file_name);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        tracing::info!("Saved {}", path.display());
        Ok(path)
    }
}

impl ResultSink for ResultSaver {
    fn save_single(
        &self,
        result: &CrawlResult,
        config: Option<&CrawlConfig>,
    ) -> OutputResult<PathBuf> {
        let now = Local::now();
        let record = SingleRecord {
            crawl_id: record_id(&result.url, &now),
            timestamp: now.to_rfc3339(),
            config,
            result,
            analysis: ResultAnalysis::from_result(result),
        };
        self.write(SINGLE_DIR, result_file_name("", &result.url, &now), &record)
    }

    fn save_batch(&self, task: &TaskInfo, config: Option<&CrawlConfig>) -> OutputResult<PathBuf> {
        let results = task.results.as_deref().ok_or_else(|| {
            OutputError::Write(format!("task {} has no results to save", task.task_id))
        })?;
        let now = Local::now();
        let analysis = BatchAnalysis::from_results(results);
        let record = BatchRecord {
            batch_id: &task.task_id,
            timestamp: now.to_rfc3339(),
            config,
            status: task.status.to_string(),
            total_urls: results.len(),
            successful_crawls: analysis.success_count,
            failed_crawls: analysis.failure_count,
            results,
            batch_analysis: analysis,
        };
        let file_name = format!(
            "batch_{}_{}.json",
            sanitize(&task.task_id),
            now.format("%Y%m%d_%H%M%S")
        );
        self.write(BATCH_DIR, file_name, &record)
    }

    fn save_extraction(
        &self,
        prompt: &str,
        result: &CrawlResult,
        config: Option<&CrawlConfig>,
    ) -> OutputResult<PathBuf> {
        let now = Local::now();
        let record = ExtractionRecord {
            extraction_id: record_id(&result.url, &now),
            timestamp: now.to_rfc3339(),
            url: &result.url,
            extraction_prompt: prompt,
            config,
            result,
            analysis: ExtractionAnalysis::from_result(result),
        };
        self.write(
            STRUCTURED_DIR,
            result_file_name("structured_", &result.url, &now),
            &record,
        )
    }
}

/// First 8 hex characters of the SHA-256 of `url`
pub fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..4])
}

/// `<prefix><YYYYMMDD_HHMMSS>_<domain>_<hash8>.json`
pub fn result_file_name(prefix: &str, url: &str, at: &DateTime<Local>) -> String {
    format!(
        "{}{}_{}_{}.json",
        prefix,
        at.format("%Y%m%d_%H%M%S"),
        file_safe_domain(url),
        url_hash(url)
    )
}

fn record_id(url: &str, at: &DateTime<Local>) -> String {
    let digest = Sha256::digest(format!("{}_{}", url, at.format("%Y%m%d_%H%M%S")).as_bytes());
    hex::encode(&digest[..16])
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
