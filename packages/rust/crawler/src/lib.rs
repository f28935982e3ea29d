//! Page fetching and crawl scoping.
//!
//! - [`Fetcher`] downloads page bodies over HTTP.
//! - [`CrawlScope`] decides which sitemap URLs are worth fetching.

pub mod engine;

pub use engine::{CrawlScope, Fetcher};
