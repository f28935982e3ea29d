//! Sitemap discovery: turns a homepage (or an explicit sitemap URL) into the
//! list of published page URLs.
//!
//! Without an explicit sitemap, the homepage's `robots.txt` `Sitemap:`
//! directives are read and a handful of well-known sitemap locations are
//! probed. Sitemap indexes are followed recursively. A sitemap that cannot be
//! fetched or parsed is skipped; it never fails the whole collection.

mod parser;

use std::collections::HashSet;

use reqwest::Client;
use sitesearch_shared::{Result, SiteSearchError};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use parser::ParsedSitemap;

/// Maximum number of redirects to follow when fetching a sitemap.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for sitemap requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default nesting limit for sitemap indexes.
const DEFAULT_MAX_DEPTH: u32 = 10;

/// Maximum uncompressed sitemap size allowed by the sitemap protocol (50 MB).
const MAX_SITEMAP_SIZE: u64 = 50 * 1024 * 1024;

/// Sitemap locations probed when robots.txt does not list them.
const WELL_KNOWN_SITEMAPS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemap/sitemap-index.xml",
];

/// User-Agent string for discovery requests.
const USER_AGENT: &str = concat!("SiteSearch/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the discovery process.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
    /// How many levels of sitemap indexes to follow.
    pub max_depth: u32,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Where a sitemap URL came from. Decides how loudly a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SitemapSource {
    /// Passed in by the caller.
    Explicit,
    /// Listed in robots.txt.
    Robots,
    /// Guessed location; usually absent.
    WellKnown,
    /// Listed in a sitemap index.
    Index,
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Collect page URLs published in the site's sitemaps, in discovery order.
///
/// When `sitemap_url` is given, only that sitemap (and anything it indexes)
/// is used. Otherwise sitemaps are located via robots.txt and well-known
/// paths under the homepage's origin. Entries are returned as written in the
/// sitemap; relative entries are left for the caller to resolve.
///
/// Only failing to build the HTTP client is an error.
#[instrument(skip_all, fields(homepage = %homepage))]
pub async fn collect_page_urls(
    homepage: &Url,
    sitemap_url: Option<&Url>,
    opts: &DiscoveryOptions,
) -> Result<Vec<String>> {
    let client = build_client(opts)?;

    let roots: Vec<(Url, SitemapSource)> = match sitemap_url {
        Some(url) => vec![(url.clone(), SitemapSource::Explicit)],
        None => locate_sitemaps(&client, homepage).await,
    };

    info!(sitemaps = roots.len(), "collecting sitemap pages");

    let mut visited: HashSet<String> = HashSet::new();
    let mut pages: Vec<String> = Vec::new();

    // Depth-first, children pushed in reverse so pages keep sitemap order.
    let mut stack: Vec<(Url, SitemapSource, u32)> = roots
        .into_iter()
        .rev()
        .map(|(url, source)| (url, source, 0))
        .collect();

    while let Some((url, source, depth)) = stack.pop() {
        if !visited.insert(url.to_string()) {
            continue;
        }

        match fetch_sitemap(&client, &url).await {
            Ok(ParsedSitemap::Pages(urls)) => {
                debug!(%url, pages = urls.len(), "sitemap parsed");
                pages.extend(urls);
            }
            Ok(ParsedSitemap::Index(children)) => {
                if depth >= opts.max_depth {
                    warn!(%url, depth, "sitemap index nesting too deep, skipping children");
                    continue;
                }
                debug!(%url, children = children.len(), "sitemap index parsed");
                for child in children.iter().rev() {
                    match url.join(child) {
                        Ok(child_url) => {
                            stack.push((child_url, SitemapSource::Index, depth + 1))
                        }
                        Err(e) => warn!(%url, %child, error = %e, "invalid sitemap URL in index"),
                    }
                }
            }
            Err(e) if source == SitemapSource::WellKnown => {
                debug!(%url, error = %e, "no sitemap at well-known location");
            }
            Err(e) => {
                warn!(%url, error = %e, "skipping unavailable sitemap");
            }
        }
    }

    info!(
        pages = pages.len(),
        sitemaps = visited.len(),
        "sitemap collection finished"
    );

    Ok(pages)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sitemaps listed in robots.txt, followed by well-known locations.
async fn locate_sitemaps(client: &Client, homepage: &Url) -> Vec<(Url, SitemapSource)> {
    let mut found: Vec<(Url, SitemapSource)> = Vec::new();

    match homepage.join("/robots.txt") {
        Ok(robots_url) => match fetch_text(client, &robots_url).await {
            Ok(body) => {
                for listed in parser::parse_robots_sitemaps(&body) {
                    match homepage.join(&listed) {
                        Ok(url) => found.push((url, SitemapSource::Robots)),
                        Err(e) => debug!(%listed, error = %e, "ignoring bad robots.txt sitemap"),
                    }
                }
                debug!(count = found.len(), "robots.txt sitemaps");
            }
            Err(e) => debug!(error = %e, "robots.txt unavailable"),
        },
        Err(e) => debug!(error = %e, "cannot derive robots.txt URL"),
    }

    for path in WELL_KNOWN_SITEMAPS {
        if let Ok(url) = homepage.join(path) {
            if !found.iter().any(|(u, _)| *u == url) {
                found.push((url, SitemapSource::WellKnown));
            }
        }
    }

    found
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &DiscoveryOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| SiteSearchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch and parse a single sitemap document.
async fn fetch_sitemap(client: &Client, url: &Url) -> Result<ParsedSitemap> {
    let body = fetch_text(client, url).await?;
    parser::parse_sitemap(&body).map_err(|e| SiteSearchError::parse(format!("{url}: {e}")))
}

/// GET a URL and return its body, rejecting non-success and oversized responses.
async fn fetch_text(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| SiteSearchError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SiteSearchError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_SITEMAP_SIZE {
            return Err(SiteSearchError::validation(format!(
                "{url}: response too large ({len} bytes, max {MAX_SITEMAP_SIZE})"
            )));
        }
    }

    response
        .text()
        .await
        .map_err(|e| SiteSearchError::Network(format!("{url}: failed to read body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urlset(urls: &[String]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("<url><loc>{u}</loc></url>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
        )
    }

    fn index(urls: &[String]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("<sitemap><loc>{u}</loc></sitemap>"))
            .collect();
        format!(r#"<?xml version="1.0"?><sitemapindex>{entries}</sitemapindex>"#)
    }

    async fn mount(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn robots_index_and_broken_child() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount(
            &server,
            "/robots.txt",
            200,
            format!("User-agent: *\nAllow: /\nSitemap: {base}/sitemaps/main.xml\n"),
        )
        .await;
        mount(
            &server,
            "/sitemaps/main.xml",
            200,
            index(&[
                format!("{base}/sitemaps/docs.xml"),
                format!("{base}/sitemaps/missing.xml"),
                // relative to the index
                "blog.xml".to_string(),
            ]),
        )
        .await;
        mount(
            &server,
            "/sitemaps/docs.xml",
            200,
            urlset(&[format!("{base}/docs/a"), format!("{base}/docs/b")]),
        )
        .await;
        mount(&server, "/sitemaps/missing.xml", 404, String::new()).await;
        mount(
            &server,
            "/sitemaps/blog.xml",
            200,
            urlset(&["/blog/hello".to_string()]),
        )
        .await;

        let homepage = Url::parse(&base).unwrap();
        let pages = collect_page_urls(&homepage, None, &DiscoveryOptions::default())
            .await
            .unwrap();

        assert_eq!(
            pages,
            vec![
                format!("{base}/docs/a"),
                format!("{base}/docs/b"),
                "/blog/hello".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn well_known_location_without_robots() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount(&server, "/robots.txt", 404, String::new()).await;
        mount(
            &server,
            "/sitemap.xml",
            200,
            urlset(&[format!("{base}/"), format!("{base}/about")]),
        )
        .await;

        let homepage = Url::parse(&base).unwrap();
        let pages = collect_page_urls(&homepage, None, &DiscoveryOptions::default())
            .await
            .unwrap();

        assert_eq!(pages, vec![format!("{base}/"), format!("{base}/about")]);
    }

    #[tokio::test]
    async fn explicit_sitemap_skips_robots() {
        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Sitemap: /other.xml"))
            .expect(0)
            .mount(&server)
            .await;
        mount(
            &server,
            "/custom-sitemap.xml",
            200,
            urlset(&[format!("{base}/only")]),
        )
        .await;

        let homepage = Url::parse(&base).unwrap();
        let sitemap = Url::parse(&format!("{base}/custom-sitemap.xml")).unwrap();
        let pages = collect_page_urls(&homepage, Some(&sitemap), &DiscoveryOptions::default())
            .await
            .unwrap();

        assert_eq!(pages, vec![format!("{base}/only")]);
    }

    #[tokio::test]
    async fn invalid_explicit_sitemap_yields_nothing() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/sitemap.xml",
            200,
            "<html><body>Page not found</body></html>".to_string(),
        )
        .await;

        let homepage = Url::parse(&server.uri()).unwrap();
        let sitemap = homepage.join("/sitemap.xml").unwrap();
        let pages = collect_page_urls(&homepage, Some(&sitemap), &DiscoveryOptions::default())
            .await
            .unwrap();

        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn no_sitemaps_at_all() {
        let server = MockServer::start().await;
        let homepage = Url::parse(&server.uri()).unwrap();

        let pages = collect_page_urls(&homepage, None, &DiscoveryOptions::default())
            .await
            .unwrap();

        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn self_referencing_index_terminates() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount(
            &server,
            "/sitemap.xml",
            200,
            index(&[format!("{base}/sitemap.xml"), format!("{base}/pages.xml")]),
        )
        .await;
        mount(&server, "/pages.xml", 200, urlset(&[format!("{base}/p")])).await;

        let homepage = Url::parse(&base).unwrap();
        let sitemap = homepage.join("/sitemap.xml").unwrap();
        let pages = collect_page_urls(&homepage, Some(&sitemap), &DiscoveryOptions::default())
            .await
            .unwrap();

        assert_eq!(pages, vec![format!("{base}/p")]);
    }

    #[tokio::test]
    async fn index_depth_is_limited() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount(&server, "/root.xml", 200, index(&[format!("{base}/nested.xml")])).await;
        mount(&server, "/nested.xml", 200, index(&[format!("{base}/pages.xml")])).await;
        mount(&server, "/pages.xml", 200, urlset(&[format!("{base}/deep")])).await;

        let homepage = Url::parse(&base).unwrap();
        let sitemap = homepage.join("/root.xml").unwrap();

        let shallow = DiscoveryOptions {
            max_depth: 1,
            ..DiscoveryOptions::default()
        };
        let pages = collect_page_urls(&homepage, Some(&sitemap), &shallow)
            .await
            .unwrap();
        assert!(pages.is_empty());

        let pages = collect_page_urls(&homepage, Some(&sitemap), &DiscoveryOptions::default())
            .await
            .unwrap();
        assert_eq!(pages, vec![format!("{base}/deep")]);
    }

    #[tokio::test]
    async fn text_sitemap_from_robots() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount(&server, "/robots.txt", 200, "Sitemap: /urls.txt\n".to_string()).await;
        mount(
            &server,
            "/urls.txt",
            200,
            format!("{base}/one\n{base}/two\n"),
        )
        .await;

        let homepage = Url::parse(&base).unwrap();
        let pages = collect_page_urls(&homepage, None, &DiscoveryOptions::default())
            .await
            .unwrap();

        assert_eq!(pages, vec![format!("{base}/one"), format!("{base}/two")]);
    }
}
