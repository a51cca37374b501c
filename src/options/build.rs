use crate::options::types::{CacheMode, CrawlConfig, CrawlStrategy, RawCrawlInput};
use crate::ValidationError;

/// Defaults the crawl backend applies when an option is absent
///
/// A user value equal to one of these is dropped from the payload, so the
/// backend stays the only place defaults are decided.
pub mod defaults {
    use super::{CacheMode, CrawlStrategy};

    pub const CACHE_MODE: CacheMode = CacheMode::Bypass;
    pub const WAIT_UNTIL: &str = "domcontentloaded";
    pub const PAGE_TIMEOUT_MS: i64 = 60_000;
    pub const DELAY_BEFORE_RETURN_HTML: f64 = 0.1;
    pub const WORD_COUNT_THRESHOLD: i64 = 200;
    pub const CRAWL_DEPTH: i64 = 1;
    pub const CRAWL_STRATEGY: CrawlStrategy = CrawlStrategy::Bfs;
    pub const EXCLUDE_SOCIAL_MEDIA_LINKS: bool = true;
}

/// Page timeout bounds in milliseconds
pub const PAGE_TIMEOUT_RANGE: (i64, i64) = (1_000, 300_000);

/// Deep crawl depth bounds
pub const CRAWL_DEPTH_RANGE: (i64, i64) = (1, 10);

/// Builds a validated [`CrawlConfig`] from raw user input
///
/// Blank strings, empty lists and values equal to the backend default are
/// dropped. Numeric fields the backend would reject are checked here so the
/// error surfaces before any request is sent. `crawl_depth` is ignored
/// unless `deep_crawl` is true.
///
/// # Examples
///
/// ```
/// use crawlwatch::options::{build_config, RawCrawlInput};
///
/// let raw = RawCrawlInput {
///     page_timeout: Some(60_000), // backend default, dropped
///     only_text: Some(true),
///     ..Default::default()
/// };
/// let config = build_config(&raw).unwrap();
/// assert_eq!(config.page_timeout, None);
/// assert_eq!(config.only_text, Some(true));
/// ```
pub fn build_config(raw: &RawCrawlInput) -> Result<CrawlConfig, ValidationError> {
    let deep_crawl = raw.deep_crawl == Some(true);

    let cache_mode = match non_blank(&raw.cache_mode) {
        Some(s) => Some(s.parse::<CacheMode>()?),
        None => None,
    };
    let crawl_strategy = match non_blank(&raw.crawl_strategy) {
        Some(s) => Some(s.parse::<CrawlStrategy>()?),
        None => None,
    };

    let page_timeout = match raw.page_timeout {
        Some(ms) => Some(check_range("page_timeout", ms, PAGE_TIMEOUT_RANGE)?),
        None => None,
    };

    let word_count_threshold = match raw.word_count_threshold {
        Some(n) if n < 0 => {
            return Err(ValidationError::TooSmall {
                field: "word_count_threshold",
                value: n.to_string(),
                min: "0".to_string(),
            })
        }
        other => other,
    };

    let delay = match raw.delay_before_return_html {
        Some(d) if !d.is_finite() || d < 0.0 => {
            return Err(ValidationError::TooSmall {
                field: "delay_before_return_html",
                value: d.to_string(),
                min: "0".to_string(),
            })
        }
        other => other,
    };

    let crawl_depth = match raw.crawl_depth {
        Some(depth) if deep_crawl => Some(check_range("crawl_depth", depth, CRAWL_DEPTH_RANGE)?),
        Some(depth) => {
            tracing::debug!("Ignoring crawl_depth={} because deep_crawl is off", depth);
            None
        }
        None => None,
    };

    Ok(CrawlConfig {
        cache_mode: cache_mode.filter(|m| *m != defaults::CACHE_MODE),
        wait_until: non_blank(&raw.wait_until)
            .filter(|w| !w.eq_ignore_ascii_case(defaults::WAIT_UNTIL))
            .map(str::to_string),
        page_timeout: page_timeout
            .filter(|ms| *ms != defaults::PAGE_TIMEOUT_MS)
            .map(|ms| ms as u32),
        wait_for: owned_non_blank(&raw.wait_for),
        delay_before_return_html: delay.filter(|d| *d != defaults::DELAY_BEFORE_RETURN_HTML),
        word_count_threshold: word_count_threshold
            .filter(|n| *n != defaults::WORD_COUNT_THRESHOLD)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        css_selector: owned_non_blank(&raw.css_selector),
        excluded_tags: non_empty_list(&raw.excluded_tags),
        excluded_selector: owned_non_blank(&raw.excluded_selector),
        only_text: explicit_true(raw.only_text),
        screenshot: explicit_true(raw.screenshot),
        pdf: explicit_true(raw.pdf),
        exclude_external_images: explicit_true(raw.exclude_external_images),
        deep_crawl: explicit_true(raw.deep_crawl),
        crawl_depth: crawl_depth
            .filter(|d| *d != defaults::CRAWL_DEPTH)
            .map(|d| d as u32),
        crawl_strategy: crawl_strategy.filter(|s| *s != defaults::CRAWL_STRATEGY),
        exclude_external_links: explicit_true(raw.exclude_external_links),
        exclude_social_media_links: raw
            .exclude_social_media_links
            .filter(|b| *b != defaults::EXCLUDE_SOCIAL_MEDIA_LINKS),
        exclude_domains: non_empty_list(&raw.exclude_domains),
        js_code: non_empty_list(&raw.js_code),
        simulate_user: explicit_true(raw.simulate_user),
        override_navigator: explicit_true(raw.override_navigator),
        magic: explicit_true(raw.magic),
        proxy_server: owned_non_blank(&raw.proxy_server),
        proxy_username: owned_non_blank(&raw.proxy_username),
        proxy_password: owned_non_blank(&raw.proxy_password),
        experimental: raw.experimental.clone().filter(|m| !m.is_empty()),
    })
}

fn check_range(field: &'static str, value: i64, (min, max): (i64, i64)) -> Result<i64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn owned_non_blank(value: &Option<String>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

fn non_empty_list(values: &[String]) -> Option<Vec<String>> {
    let cleaned: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

// Every boolean without a listed default defaults to false on the backend.
fn explicit_true(value: Option<bool>) -> Option<bool> {
    value.filter(|b| *b)
}
