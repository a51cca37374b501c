use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the backend uses its page cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    Enabled,
    Disabled,
    Bypass,
    ReadOnly,
    WriteOnly,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Bypass => "bypass",
            Self::ReadOnly => "read_only",
            Self::WriteOnly => "write_only",
        }
    }
}

impl FromStr for CacheMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            "bypass" => Ok(Self::Bypass),
            "read_only" => Ok(Self::ReadOnly),
            "write_only" => Ok(Self::WriteOnly),
            _ => Err(ValidationError::UnknownChoice {
                field: "cache_mode",
                value: s.to_string(),
                expected: "enabled, disabled, bypass, read_only, write_only",
            }),
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link-following order for deep crawls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStrategy {
    Bfs,
    Dfs,
    BestFirst,
}

impl CrawlStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::BestFirst => "best_first",
        }
    }
}

impl FromStr for CrawlStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            "best_first" => Ok(Self::BestFirst),
            _ => Err(ValidationError::UnknownChoice {
                field: "crawl_strategy",
                value: s.to_string(),
                expected: "bfs, dfs, best_first",
            }),
        }
    }
}

impl fmt::Display for CrawlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crawl options sent to the backend
///
/// Every field is optional. A `None` field is left out of the JSON payload
/// and the backend applies its own default; it never means `false` or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    // ===== Cache =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_mode: Option<CacheMode>,

    // ===== Page interaction =====
    /// Navigation event to wait for (e.g. `domcontentloaded`, `networkidle`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<String>,

    /// Page load timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_timeout: Option<u32>,

    /// CSS selector to wait for before extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,

    /// Delay before the HTML is captured, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_before_return_html: Option<f64>,

    // ===== Content shaping =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count_threshold: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_text: Option<bool>,

    // ===== Media =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_external_images: Option<bool>,

    // ===== Extraction depth =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_crawl: Option<bool>,

    /// Only meaningful when `deep_crawl` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_depth: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_strategy: Option<CrawlStrategy>,

    // ===== Link filters =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_external_links: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_social_media_links: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,

    // ===== Advanced =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_code: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulate_user: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_navigator: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic: Option<bool>,

    // ===== Proxy =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_password: Option<String>,

    /// Backend-specific parameters passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CrawlConfig {
    /// Returns true if no option is overridden
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Unchecked crawl options as a user typed them
///
/// This is what the `[crawl]` table of the config file and the CLI flags
/// produce. [`crate::options::build_config`] turns it into a [`CrawlConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCrawlInput {
    #[serde(default)]
    pub cache_mode: Option<String>,
    #[serde(default)]
    pub wait_until: Option<String>,
    #[serde(default)]
    pub page_timeout: Option<i64>,
    #[serde(default)]
    pub wait_for: Option<String>,
    #[serde(default)]
    pub delay_before_return_html: Option<f64>,
    #[serde(default)]
    pub word_count_threshold: Option<i64>,
    #[serde(default)]
    pub css_selector: Option<String>,
    #[serde(default)]
    pub excluded_tags: Vec<String>,
    #[serde(default)]
    pub excluded_selector: Option<String>,
    #[serde(default)]
    pub only_text: Option<bool>,
    #[serde(default)]
    pub screenshot: Option<bool>,
    #[serde(default)]
    pub pdf: Option<bool>,
    #[serde(default)]
    pub exclude_external_images: Option<bool>,
    #[serde(default)]
    pub deep_crawl: Option<bool>,
    #[serde(default)]
    pub crawl_depth: Option<i64>,
    #[serde(default)]
    pub crawl_strategy: Option<String>,
    #[serde(default)]
    pub exclude_external_links: Option<bool>,
    #[serde(default)]
    pub exclude_social_media_links: Option<bool>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    #[serde(default)]
    pub js_code: Vec<String>,
    #[serde(default)]
    pub simulate_user: Option<bool>,
    #[serde(default)]
    pub override_navigator: Option<bool>,
    #[serde(default)]
    pub magic: Option<bool>,
    #[serde(default)]
    pub proxy_server: Option<String>,
    #[serde(default)]
    pub proxy_username: Option<String>,
    #[serde(default)]
    pub proxy_password: Option<String>,
    #[serde(default)]
    pub experimental: Option<serde_json::Map<String, serde_json::Value>>,
}

impl RawCrawlInput {
    /// Layers `overrides` on top of `self`
    ///
    /// Scalar fields set in `overrides` win; list fields win when non-empty.
    pub fn merge(mut self, overrides: RawCrawlInput) -> RawCrawlInput {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if overrides.$field.is_some() { self.$field = overrides.$field; })*
            };
        }
        macro_rules! take_list {
            ($($field:ident),*) => {
                $(if !overrides.$field.is_empty() { self.$field = overrides.$field; })*
            };
        }

        take!(
            cache_mode,
            wait_until,
            page_timeout,
            wait_for,
            delay_before_return_html,
            word_count_threshold,
            css_selector,
            excluded_selector,
            only_text,
            screenshot,
            pdf,
            exclude_external_images,
            deep_crawl,
            crawl_depth,
            crawl_strategy,
            exclude_external_links,
            exclude_social_media_links,
            simulate_user,
            override_navigator,
            magic,
            proxy_server,
            proxy_username,
            proxy_password,
            experimental
        );
        take_list!(excluded_tags, exclude_domains, js_code);
        self
    }
}
