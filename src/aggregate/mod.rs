//! Collection-level operations
//!
//! This module works on many tasks at once:
//! - Parsing and submitting newline-delimited URL batches
//! - Deriving dashboard statistics from task and project listings
//! - Sequential bulk cancel and delete

mod batch;
mod bulk;
mod stats;

pub use batch::{build_batch_request, parse_url_list, submit_batch};
pub use bulk::{cancel_many, delete_finished, delete_many, BulkReport};
pub use stats::{DashboardStats, TaskCounts};
