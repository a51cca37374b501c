//! Task state module
//!
//! This module defines the lifecycle states of a crawl task and the single
//! lookup table that maps each state to its label, display colour and the
//! actions a user may take on it.
//!
//! # Lifecycle
//!
//! `pending → running → {completed | failed | cancelled}`
//!
//! Transitions are decided by the backend. The client only observes them by
//! comparing successive snapshots.

mod task_status;

pub use task_status::{StatusProfile, TaskAction, TaskStatus, STATUS_TABLE};
