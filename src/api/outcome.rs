use crate::api::types::CrawlResult;

/// Result of a crawl call whose envelope reported success
///
/// The envelope flag and the page flag are independent: the backend can
/// accept and run a crawl whose target page then fails. That case is
/// `PageFailed`, which is domain data to be shown, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    /// The page was crawled
    Crawled(CrawlResult),

    /// The backend ran the crawl but the target page failed
    PageFailed(CrawlResult),
}

impl CrawlOutcome {
    pub fn from_result(result: CrawlResult) -> Self {
        if result.success {
            Self::Crawled(result)
        } else {
            Self::PageFailed(result)
        }
    }

    pub fn result(&self) -> &CrawlResult {
        match self {
            Self::Crawled(r) | Self::PageFailed(r) => r,
        }
    }

    pub fn into_result(self) -> CrawlResult {
        match self {
            Self::Crawled(r) | Self::PageFailed(r) => r,
        }
    }

    pub fn is_crawled(&self) -> bool {
        matches!(self, Self::Crawled(_))
    }

    /// Page-level failure message, with a fallback for results missing one
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Crawled(_) => None,
            Self::PageFailed(r) => r.failure_message(),
        }
    }
}
