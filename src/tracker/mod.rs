//! Task lifecycle tracking
//!
//! This module follows server-side tasks from submission to a terminal
//! status:
//! - `TaskBoard` holds the latest snapshot and detects transitions
//! - `TaskTracker` performs fetches and mutations against the backend
//! - `Poller` refreshes while work is in flight

mod board;
mod lifecycle;
mod poller;

pub use board::{TaskBoard, Transition};
pub use lifecycle::{TaskTracker, DEFAULT_POLL_INTERVAL};
pub use poller::{Poller, PollerHandle};
