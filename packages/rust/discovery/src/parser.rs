//! Sitemap and robots.txt parsers.
//!
//! Supported sitemap formats (per <https://www.sitemaps.org/protocol.html>):
//! - XML `<urlset>`: page URLs from `<url><loc>`
//! - XML `<sitemapindex>`: nested sitemap URLs from `<sitemap><loc>`
//! - Plain text: one absolute URL per line

use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use url::Url;

use sitesearch_shared::{Result, SiteSearchError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parsed content of one sitemap document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSitemap {
    /// A `<urlset>` or text sitemap listing pages.
    Pages(Vec<String>),
    /// A `<sitemapindex>` listing further sitemaps.
    Index(Vec<String>),
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `Sitemap: <url>` directives anywhere in robots.txt.
static ROBOTS_SITEMAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*sitemap\s*:\s*(\S+)").expect("robots sitemap regex")
});

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse a sitemap body, detecting XML vs. plain text.
pub(crate) fn parse_sitemap(content: &str) -> Result<ParsedSitemap> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return Err(SiteSearchError::parse("sitemap is empty"));
    }

    if trimmed.starts_with('<') {
        parse_xml_sitemap(trimmed)
    } else {
        parse_text_sitemap(trimmed)
    }
}

/// Extract `Sitemap:` URLs from a robots.txt body, in file order.
pub(crate) fn parse_robots_sitemaps(robots: &str) -> Vec<String> {
    ROBOTS_SITEMAP_RE
        .captures_iter(robots)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn parse_xml_sitemap(xml: &str) -> Result<ParsedSitemap> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Open element local names, outermost first.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut root: Option<Vec<u8>> = None;
    let mut locs: Vec<String> = Vec::new();
    let mut current_loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if root.is_none() {
                    root = Some(name.clone());
                }
                if name == b"loc" {
                    current_loc.clear();
                }
                stack.push(name);
            }
            Ok(Event::Text(e)) if in_entry_loc(&stack) => {
                let text = e
                    .unescape()
                    .map_err(|err| SiteSearchError::parse(format!("bad <loc> text: {err}")))?;
                current_loc.push_str(&text);
            }
            Ok(Event::CData(e)) if in_entry_loc(&stack) => {
                current_loc.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(_)) => {
                if in_entry_loc(&stack) {
                    let loc = current_loc.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SiteSearchError::parse(format!(
                    "invalid sitemap XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    match root.as_deref() {
        Some(b"urlset") => Ok(ParsedSitemap::Pages(locs)),
        Some(b"sitemapindex") => Ok(ParsedSitemap::Index(locs)),
        Some(other) => Err(SiteSearchError::parse(format!(
            "unsupported sitemap root element <{}>",
            String::from_utf8_lossy(other)
        ))),
        None => Err(SiteSearchError::parse("sitemap has no root element")),
    }
}

/// `true` while inside `<url><loc>` or `<sitemap><loc>`. Extension elements
/// such as `<image:loc>` sit one level deeper and do not match.
fn in_entry_loc(stack: &[Vec<u8>]) -> bool {
    match stack {
        [.., parent, last] => {
            last.as_slice() == b"loc"
                && (parent.as_slice() == b"url" || parent.as_slice() == b"sitemap")
        }
        _ => false,
    }
}

fn parse_text_sitemap(text: &str) -> Result<ParsedSitemap> {
    let urls: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| {
            Url::parse(line).is_ok_and(|u| u.scheme() == "http" || u.scheme() == "https")
        })
        .map(String::from)
        .collect();

    if urls.is_empty() {
        return Err(SiteSearchError::parse(
            "text sitemap contains no http(s) URLs",
        ));
    }

    Ok(ParsedSitemap::Pages(urls))
}
