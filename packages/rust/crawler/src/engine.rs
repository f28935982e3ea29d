//! HTTP page fetcher and URL scope filter used by the crawl pipeline.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use sitesearch_shared::{CrawlConfig, Result, SiteSearchError};

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("SiteSearch/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow per page.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Downloads page bodies. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher using the timeout from `config`.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SiteSearchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch a page and return its body as text.
    ///
    /// Transport failures and non-2xx responses are reported as
    /// [`SiteSearchError::Network`].
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SiteSearchError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteSearchError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SiteSearchError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Scope checking
// ---------------------------------------------------------------------------

/// Decides which page URLs are fetched.
///
/// Patterns are globs matched against the URL path: `*` matches within one
/// segment, `**` matches across segments and `?` matches one character.
#[derive(Debug, Clone, Default)]
pub struct CrawlScope {
    /// If non-empty, the path must match at least one.
    include_patterns: Vec<Regex>,
    /// If the path matches any, the URL is excluded.
    exclude_patterns: Vec<Regex>,
}

impl CrawlScope {
    /// Compile the include/exclude patterns from `config`. Patterns that do
    /// not compile are logged and ignored.
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            include_patterns: compile_patterns(&config.include_patterns),
            exclude_patterns: compile_patterns(&config.exclude_patterns),
        }
    }

    /// `true` if `url` should be fetched.
    pub fn in_scope(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        let path = url.path();

        if self.exclude_patterns.iter().any(|p| p.is_match(path)) {
            return false;
        }

        self.include_patterns.is_empty() || self.include_patterns.iter().any(|p| p.is_match(path))
    }
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| {
            let compiled = glob_to_regex(p);
            if compiled.is_none() {
                warn!(pattern = %p, "ignoring invalid URL pattern");
            }
            compiled
        })
        .collect()
}

/// Convert a glob-like pattern to an anchored regex.
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{escaped}$")).ok()
}
