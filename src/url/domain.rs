use url::Url;

/// Extracts the lowercase host from a URL string
///
/// Returns `None` if the string does not parse or has no host.
///
/// # Examples
///
/// ```
/// use crawlwatch::url::extract_domain;
///
/// assert_eq!(extract_domain("https://EXAMPLE.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Returns a domain label usable inside a file name
///
/// The port, if any, is kept and joined with `_`. Unparseable URLs map to
/// `"unknown"`.
pub fn file_safe_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "unknown".to_string();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}_{}", host.to_lowercase(), port),
        (Some(host), None) => host.to_lowercase(),
        _ => "unknown".to_string(),
    }
}
