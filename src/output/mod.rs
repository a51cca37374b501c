//! Output module for exporting and displaying crawl results
//!
//! This module handles:
//! - Saving results as JSON records with content analysis
//! - Generating markdown task reports
//! - Rendering task tables and dashboard statistics for the terminal

mod analysis;
mod markdown;
mod saver;
pub mod stats;
mod traits;

pub use analysis::{BatchAnalysis, ExtractionAnalysis, ResultAnalysis};
pub use markdown::{format_task_report, write_task_report};
pub use saver::{result_file_name, url_hash, ResultSaver};
pub use stats::{
    format_dashboard, format_outcome, format_progress, format_task_detail, format_task_table,
    print_dashboard, print_outcome, print_projects, print_task_detail, print_task_table,
};
pub use traits::{OutputError, OutputResult, ResultSink};
