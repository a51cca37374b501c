//! Plain-text rendering of tasks and dashboard statistics
//!
//! `format_*` functions build the text; `print_*` write it to stdout.

use crate::aggregate::{DashboardStats, TaskCounts};
use crate::api::{CrawlOutcome, ProjectInfo, TaskInfo, TaskProgress};
use std::fmt::Write;

/// Formats the dashboard headline numbers
pub fn format_dashboard(stats: &DashboardStats, counts: &TaskCounts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Dashboard ===\n");
    let _ = writeln!(out, "  Total crawls:   {}", stats.total_crawls);
    let _ = writeln!(out, "  Active tasks:   {}", stats.active_tasks);
    let _ = writeln!(out, "  Projects:       {}", stats.total_projects);
    let _ = writeln!(out, "  Success rate:   {}%", stats.success_rate);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Tasks: {} total, {} running, {} completed, {} failed",
        counts.total, counts.running, counts.completed, counts.failed
    );
    out
}

/// Prints the dashboard to stdout
pub fn print_dashboard(stats: &DashboardStats, counts: &TaskCounts) {
    print!("{}", format_dashboard(stats, counts));
}

/// Formats tasks as an aligned table, newest first as listed
pub fn format_task_table(tasks: &[TaskInfo]) -> String {
    let mut out = String::new();
    if tasks.is_empty() {
        let _ = writeln!(out, "No tasks.");
        return out;
    }

    let id_width = tasks.iter().map(|t| t.task_id.len()).max().unwrap_or(0).max(7);
    let _ = writeln!(
        out,
        "{:<id_width$}  {:<10}  {:>5}  {:>15}  CREATED",
        "TASK ID", "STATUS", "PROG", "DONE/FAIL/TOTAL"
    );
    for t in tasks {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<10}  {:>4}%  {:>15}  {}",
            t.task_id,
            t.status.label(),
            t.progress,
            format!("{}/{}/{}", t.completed_urls, t.failed_urls, t.total_urls),
            t.created_at
        );
    }
    let counts = TaskCounts::from_tasks(tasks);
    let _ = writeln!(
        out,
        "\n{} total, {} running, {} completed, {} failed",
        counts.total, counts.running, counts.completed, counts.failed
    );
    out
}

pub fn print_task_table(tasks: &[TaskInfo]) {
    print!("{}", format_task_table(tasks));
}

/// Formats one task with its per-URL results
pub fn format_task_detail(task: &TaskInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task {}", task.task_id);
    let _ = writeln!(out, "  Status:    {} ({})", task.status.label(), task.status.color());
    let _ = writeln!(out, "  Progress:  {}%", task.progress);
    let _ = writeln!(
        out,
        "  URLs:      {} completed, {} failed, {} total",
        task.completed_urls, task.failed_urls, task.total_urls
    );
    let _ = writeln!(out, "  Created:   {}", task.created_at);
    if let Some(completed) = &task.completed_at {
        let _ = writeln!(out, "  Completed: {}", completed);
    }
    if let Some(rate) = task.throughput() {
        let _ = writeln!(out, "  Rate:      {:.2} URLs/s", rate);
    }
    if let Some(error) = &task.error_message {
        let _ = writeln!(out, "  Error:     {}", error);
    }

    if let Some(results) = &task.results {
        let _ = writeln!(out, "\nResults ({}):", results.len());
        for r in results {
            match r.failure_message() {
                None => {
                    let _ = writeln!(
                        out,
                        "  [ok]     {} {}",
                        r.url,
                        r.title.as_deref().unwrap_or("")
                    );
                }
                Some(message) => {
                    let _ = writeln!(out, "  [failed] {} ({})", r.url, message);
                }
            }
        }
    }
    out
}

pub fn print_task_detail(task: &TaskInfo) {
    print!("{}", format_task_detail(task));
}

/// Formats a progress line such as `abc: Running 40% (2/5, 0 failed)`
pub fn format_progress(progress: &TaskProgress) -> String {
    format!(
        "{}: {} {}% ({}/{}, {} failed)",
        progress.task_id,
        progress.status.label(),
        progress.progress,
        progress.completed_urls,
        progress.total_urls,
        progress.failed_urls
    )
}

/// Formats a single-URL crawl outcome
pub fn format_outcome(outcome: &CrawlOutcome) -> String {
    let r = outcome.result();
    let mut out = String::new();
    match outcome.failure_message() {
        None => {
            let _ = writeln!(out, "Crawled {}", r.url);
        }
        Some(message) => {
            let _ = writeln!(out, "Page failed: {} ({})", r.url, message);
        }
    }
    if let Some(code) = r.status_code {
        let _ = writeln!(out, "  HTTP status:    {}", code);
    }
    if let Some(title) = &r.title {
        let _ = writeln!(out, "  Title:          {}", title);
    }
    if let Some(time) = r.execution_time {
        let _ = writeln!(out, "  Execution time: {:.2}s", time);
    }
    if let Some(content) = r.content() {
        let _ = writeln!(out, "  Content:        {} chars", content.chars().count());
    }
    out
}

pub fn print_outcome(outcome: &CrawlOutcome) {
    print!("{}", format_outcome(outcome));
}

pub fn print_projects(projects: &[ProjectInfo]) {
    if projects.is_empty() {
        println!("No projects.");
        return;
    }
    for p in projects {
        println!(
            "{}  {}  ({} tasks, {} URLs)",
            p.project_id, p.name, p.task_count, p.total_urls
        );
        if let Some(description) = &p.description {
            println!("    {}", description);
        }
    }
}
