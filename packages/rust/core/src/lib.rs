//! Crawl orchestration for SiteSearch.
//!
//! Ties sitemap discovery, page fetching and fragment extraction together
//! into [`crawl_site`], and writes the results as JSON lines.

pub mod output;
pub mod pipeline;

pub use output::{FragmentWriter, STDOUT_PATH};
pub use pipeline::{
    CrawlSiteConfig, CrawlSummary, ProgressReporter, SilentProgress, crawl_site, crawl_site_to,
    extract_file,
};
