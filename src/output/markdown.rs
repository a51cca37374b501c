//! Markdown task reports
//!
//! This module renders a tracked task, its counters and its per-URL results
//! as a human-readable markdown document.

use crate::api::TaskInfo;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Longest content excerpt included per result
const EXCERPT_CHARS: usize = 200;

/// Writes a markdown report for a task
///
/// # Arguments
///
/// * `task` - The task snapshot to report on
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_task_report(task: &TaskInfo, output_path: &Path) -> OutputResult<()> {
    let markdown = format_task_report(task);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a task snapshot as markdown
pub fn format_task_report(task: &TaskInfo) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Crawl Task {}\n\n", task.task_id));

    md.push_str("## Task Information\n\n");
    md.push_str(&format!("- **Status**: {}\n", task.status.label()));
    md.push_str(&format!("- **Progress**: {}%\n", task.progress));
    md.push_str(&format!("- **Created**: {}\n", task.created_at));
    if let Some(updated) = &task.updated_at {
        md.push_str(&format!("- **Updated**: {}\n", updated));
    }
    if let Some(completed) = &task.completed_at {
        md.push_str(&format!("- **Completed**: {}\n", completed));
    }
    if let Some(rate) = task.throughput() {
        md.push_str(&format!("- **Throughput**: {:.2} URLs/s\n", rate));
    }
    if let Some(error) = &task.error_message {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    md.push_str("## URL Counts\n\n");
    md.push_str("| Total | Completed | Failed |\n");
    md.push_str("|-------|-----------|--------|\n");
    md.push_str(&format!(
        "| {} | {} | {} |\n\n",
        task.total_urls, task.completed_urls, task.failed_urls
    ));

    let violations = task.invariant_violations();
    if !violations.is_empty() {
        md.push_str("## Inconsistencies\n\n");
        for v in violations {
            md.push_str(&format!("- {}\n", v));
        }
        md.push('\n');
    }

    let Some(results) = task.results.as_deref().filter(|r| !r.is_empty()) else {
        md.push_str("_No results available._\n");
        return md;
    };

    md.push_str("## Results\n\n");
    md.push_str("| URL | Status | HTTP | Title |\n");
    md.push_str("|-----|--------|------|-------|\n");
    for r in results {
        let status = if r.success { "ok" } else { "failed" };
        let code = r.status_code.map(|c| c.to_string()).unwrap_or_default();
        let title = r.title.as_deref().unwrap_or("");
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            r.url,
            status,
            code,
            escape_cell(title)
        ));
    }
    md.push('\n');

    let failures: Vec<_> = results.iter().filter_map(|r| r.failure_message().map(|m| (r, m))).collect();
    if !failures.is_empty() {
        md.push_str("## Failures\n\n");
        for (r, message) in failures {
            md.push_str(&format!("- {}: {}\n", r.url, message));
        }
        md.push('\n');
    }

    for r in results.iter().filter(|r| r.success) {
        if let Some(content) = r.content() {
            md.push_str(&format!("### {}\n\n", r.url));
            md.push_str(&excerpt(content));
            md.push_str("\n\n");
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn excerpt(content: &str) -> String {
    let trimmed = content.trim();
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
