//! URL handling module for crawlwatch
//!
//! This module checks user-supplied URLs before they are sent to the crawl
//! backend and extracts domains for display and file naming.

mod domain;

use crate::ValidationError;
use ::url::Url;

pub use domain::{extract_domain, file_safe_domain};

/// Validates a URL as an absolute `http`/`https` URL with a host
///
/// Surrounding whitespace is ignored. Relative URLs, other schemes and URLs
/// without a host are rejected.
///
/// # Examples
///
/// ```
/// use crawlwatch::url::validate_url;
///
/// assert!(validate_url("https://example.com/page").is_ok());
/// assert!(validate_url("example.com").is_err());
/// assert!(validate_url("ftp://example.com").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| ValidationError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("URL is empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!(
            "URL must start with http:// or https://, got scheme '{}'",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("URL has no host".to_string())),
    }
}
