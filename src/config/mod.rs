//! Configuration module for crawlwatch
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every table and key has a default, so an empty file
//! (or no file at all) is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use crawlwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawlwatch.toml")).unwrap();
//! println!("Backend: {}", config.server.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, ServerConfig, TrackerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
