use crate::config::types::{Config, OutputConfig, ServerConfig, TrackerConfig};
use crate::options::build_config;
use crate::url::validate_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_tracker_config(&config.tracker)?;
    validate_output_config(&config.output)?;

    // The [crawl] defaults must themselves be a valid option set.
    build_config(&config.crawl).map_err(|e| ConfigError::Validation(format!("[crawl] {}", e)))?;

    Ok(())
}

/// Validates backend connection settings
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_url(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 600, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates task tracking settings
fn validate_tracker_config(config: &TrackerConfig) -> Result<(), ConfigError> {
    if config.poll_interval_secs < 1 || config.poll_interval_secs > 3600 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-secs must be between 1 and 3600, got {}",
            config.poll_interval_secs
        )));
    }

    if config.cleanup_max_age_hours < 1 {
        return Err(ConfigError::Validation(format!(
            "cleanup-max-age-hours must be >= 1, got {}",
            config.cleanup_max_age_hours
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.export_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "export-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
