//! Content analysis attached to exported results

use crate::api::CrawlResult;
use crate::url::file_safe_domain;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Per-page figures derived from a crawl result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultAnalysis {
    pub success: bool,
    pub status_code: Option<u16>,
    pub execution_time: f64,
    pub word_count: usize,
    pub char_count: usize,
    pub paragraph_count: usize,
    pub has_content: bool,
    pub image_count: usize,
    pub video_count: usize,
    pub audio_count: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub has_screenshot: bool,
    pub has_pdf: bool,
    pub has_structured_data: bool,
}

impl ResultAnalysis {
    pub fn from_result(result: &CrawlResult) -> Self {
        let markdown = result.markdown.as_deref().unwrap_or("");
        Self {
            success: result.success,
            status_code: result.status_code,
            execution_time: result.execution_time.unwrap_or(0.0),
            word_count: markdown.split_whitespace().count(),
            char_count: markdown.chars().count(),
            paragraph_count: markdown.matches("\n\n").count(),
            has_content: !markdown.trim().is_empty(),
            image_count: array_len(result.media.as_ref(), "images"),
            video_count: array_len(result.media.as_ref(), "videos"),
            audio_count: array_len(result.media.as_ref(), "audios"),
            internal_links: array_len(result.links.as_ref(), "internal"),
            external_links: array_len(result.links.as_ref(), "external"),
            has_screenshot: result.screenshot.as_deref().is_some_and(|s| !s.is_empty()),
            has_pdf: result.pdf.as_deref().is_some_and(|s| !s.is_empty()),
            has_structured_data: result.extracted_data.as_ref().is_some_and(is_truthy),
        }
    }
}

/// Figures aggregated over every result of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchAnalysis {
    pub total_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Mean over results that reported a positive execution time
    pub avg_execution_time: f64,
    pub total_words: usize,
    pub total_images: usize,
    pub domains: BTreeSet<String>,
    pub status_codes: BTreeMap<u16, usize>,
    /// Fraction of successful results, 0 to 1
    pub success_rate: f64,
}

impl BatchAnalysis {
    pub fn from_results(results: &[CrawlResult]) -> Self {
        let mut analysis = Self {
            total_count: results.len(),
            ..Self::default()
        };
        let mut times = Vec::new();

        for result in results {
            if result.success {
                analysis.success_count += 1;
            } else {
                analysis.failure_count += 1;
            }
            if let Some(t) = result.execution_time.filter(|t| *t > 0.0) {
                times.push(t);
            }
            if let Some(md) = &result.markdown {
                analysis.total_words += md.split_whitespace().count();
            }
            analysis.total_images += array_len(result.media.as_ref(), "images");
            if !result.url.is_empty() {
                analysis.domains.insert(file_safe_domain(&result.url));
            }
            if let Some(code) = result.status_code {
                *analysis.status_codes.entry(code).or_insert(0) += 1;
            }
        }

        if !times.is_empty() {
            analysis.avg_execution_time = times.iter().sum::<f64>() / times.len() as f64;
        }
        if analysis.total_count > 0 {
            analysis.success_rate = analysis.success_count as f64 / analysis.total_count as f64;
        }
        analysis
    }
}

/// Shape of the data returned by a structured extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionAnalysis {
    pub success: bool,
    pub has_extracted_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_items_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_fields_count: Option<usize>,
}

impl ExtractionAnalysis {
    pub fn from_result(result: &CrawlResult) -> Self {
        let data = result.extracted_data.as_ref().filter(|v| is_truthy(v));
        let mut analysis = Self {
            success: result.success,
            has_extracted_data: data.is_some(),
            extraction_type: None,
            extracted_items_count: None,
            extracted_fields_count: None,
        };
        match data {
            Some(Value::Array(items)) => {
                analysis.extraction_type = Some("list");
                analysis.extracted_items_count = Some(items.len());
            }
            Some(Value::Object(fields)) => {
                analysis.extraction_type = Some("object");
                analysis.extracted_fields_count = Some(fields.len());
            }
            Some(_) => analysis.extraction_type = Some("other"),
            None => {}
        }
        analysis
    }
}

fn array_len(map: Option<&Map<String, Value>>, key: &str) -> usize {
    map.and_then(|m| m.get(key))
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

// Empty containers, empty strings, zero, false and null count as no data.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
