//! End-to-end crawl pipeline: homepage → sitemap → fetch → extract → JSONL.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use sitesearch_crawler::{CrawlScope, Fetcher};
use sitesearch_discovery::DiscoveryOptions;
use sitesearch_shared::{CrawlConfig, PageFragment, Result, SiteSearchError};

use crate::output::FragmentWriter;

/// Configuration for [`crawl_site`].
#[derive(Debug, Clone)]
pub struct CrawlSiteConfig {
    /// Site homepage. Relative sitemap entries are resolved against it.
    pub homepage: Url,
    /// Use only this sitemap instead of locating sitemaps from the homepage.
    pub sitemap_url: Option<Url>,
    /// Output path for the JSONL fragments (`-` for stdout).
    pub output: String,
    /// Crawl configuration.
    pub crawl: CrawlConfig,
}

/// Result of a crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Page URLs listed in the sitemaps.
    pub pages_total: usize,
    /// Pages fetched and extracted.
    pub pages_extracted: usize,
    /// Pages whose fetch failed.
    pub pages_failed: usize,
    /// Entries dropped before fetching (unparsable or out of scope).
    pub pages_skipped: usize,
    /// Fragments written.
    pub fragments: usize,
    /// Per-page errors (URL, error message).
    pub errors: Vec<(String, String)>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting crawl status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per page, in output order, after its fragments are written.
    fn page_done(&self, url: &str, current: usize, total: usize);
    /// Called when the crawl completes.
    fn done(&self, summary: &CrawlSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_done(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &CrawlSummary) {}
}

/// Crawl a site and write its fragments to `config.output`.
///
/// Only setup failures (HTTP client, output file) and output write failures
/// are returned as errors. A page that cannot be fetched contributes no
/// fragments and is recorded in [`CrawlSummary::errors`].
pub async fn crawl_site(
    config: &CrawlSiteConfig,
    progress: &dyn ProgressReporter,
) -> Result<CrawlSummary> {
    let mut writer = FragmentWriter::create(&config.output)?;
    crawl_site_to(config, &mut writer, progress).await
}

/// Same as [`crawl_site`] but writes to a caller-supplied writer.
///
/// 1. Collect page URLs from the sitemaps
/// 2. Resolve and scope-filter them
/// 3. Fetch and extract pages concurrently, bounded by `workers`
/// 4. Write each page's fragments in sitemap order
#[instrument(skip_all, fields(homepage = %config.homepage))]
pub async fn crawl_site_to<W: Write>(
    config: &CrawlSiteConfig,
    writer: &mut FragmentWriter<W>,
    progress: &dyn ProgressReporter,
) -> Result<CrawlSummary> {
    let start = Instant::now();
    let mut summary = CrawlSummary::default();

    // --- Phase 1: Sitemaps ---
    progress.phase("Reading sitemaps");
    let discovery = DiscoveryOptions {
        timeout_secs: config.crawl.timeout_secs,
        max_depth: config.crawl.max_sitemap_depth,
    };
    let entries = sitesearch_discovery::collect_page_urls(
        &config.homepage,
        config.sitemap_url.as_ref(),
        &discovery,
    )
    .await?;
    summary.pages_total = entries.len();

    // --- Phase 2: Resolve and filter ---
    let scope = CrawlScope::new(&config.crawl);
    let pages: Vec<Url> = entries
        .iter()
        .filter_map(|entry| match config.homepage.join(entry) {
            Ok(url) if scope.in_scope(&url) => Some(url),
            Ok(url) => {
                debug!(%url, "out of scope, skipping");
                None
            }
            Err(e) => {
                warn!(%entry, error = %e, "unparsable sitemap entry, skipping");
                None
            }
        })
        .collect();
    summary.pages_skipped = entries.len() - pages.len();

    info!(
        pages = pages.len(),
        skipped = summary.pages_skipped,
        workers = config.crawl.workers,
        rate_limit_ms = config.crawl.rate_limit_ms,
        "starting crawl"
    );

    // --- Phase 3: Fetch + extract ---
    progress.phase("Extracting pages");
    let fetcher = Fetcher::new(&config.crawl)?;
    let semaphore = Arc::new(Semaphore::new(config.crawl.workers.max(1) as usize));
    let rate_limit = config.crawl.rate_limit_ms;

    let handles: Vec<_> = pages
        .into_iter()
        .map(|url| {
            let fetcher = fetcher.clone();
            let sem = semaphore.clone();
            let page_url = url.clone();
            let handle = tokio::spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return Err(SiteSearchError::Network("worker pool closed".into()));
                };

                if rate_limit > 0 {
                    tokio::time::sleep(Duration::from_millis(rate_limit)).await;
                }

                let body = fetcher.fetch_page(&page_url).await?;
                Ok(sitesearch_extract::extract_html(&body, page_url.as_str()))
            });
            (url, handle)
        })
        .collect();

    // --- Phase 4: Write in submission order ---
    let total = handles.len();
    for (i, (url, handle)) in handles.into_iter().enumerate() {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SiteSearchError::Network(format!("page task failed: {e}"))),
        };

        match outcome {
            Ok(fragments) => {
                writer.write_page(&fragments)?;
                summary.pages_extracted += 1;
                summary.fragments += fragments.len();
            }
            Err(e) => {
                warn!(%url, error = %e, "page failed, no fragments emitted");
                summary.pages_failed += 1;
                summary.errors.push((url.to_string(), e.to_string()));
            }
        }

        progress.page_done(url.as_str(), i + 1, total);
    }

    summary.elapsed = start.elapsed();
    progress.done(&summary);

    info!(
        pages_extracted = summary.pages_extracted,
        pages_failed = summary.pages_failed,
        pages_skipped = summary.pages_skipped,
        fragments = summary.fragments,
        elapsed_ms = summary.elapsed.as_millis(),
        "crawl completed"
    );

    Ok(summary)
}

/// Extract a single local page, as if it had been fetched from `url`.
pub fn extract_file(path: &std::path::Path, url: &Url) -> Result<Vec<PageFragment>> {
    let html = std::fs::read_to_string(path).map_err(|e| SiteSearchError::io(path, e))?;
    Ok(sitesearch_extract::extract_html(&html, url.as_str()))
}
