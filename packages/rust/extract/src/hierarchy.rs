//! URL path hierarchy ("sections") for a page.

use url::Url;

/// Cumulative path segments of a URL, outer to inner.
///
/// Only the path component is used; scheme, host, query and fragment are
/// ignored. Empty segments are dropped.
///
/// ```
/// use sitesearch_extract::path_hierarchy;
///
/// assert_eq!(path_hierarchy("/foo/bar"), vec!["foo", "foo/bar"]);
/// assert_eq!(path_hierarchy("https://example.com/a/b/c/"), vec!["a", "a/b", "a/b/c"]);
/// assert!(path_hierarchy("https://example.com/").is_empty());
/// ```
pub fn path_hierarchy(url: &str) -> Vec<String> {
    let path = url_path(url);
    let mut prefix = String::new();

    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            prefix.clone()
        })
        .collect()
}

/// Path component of an absolute or relative URL. Never fails: anything that
/// does not parse as an absolute URL is treated as a relative reference.
fn url_path(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        return parsed.path().to_string();
    }

    let end = url.find(['?', '#']).unwrap_or(url.len());
    let reference = &url[..end];

    // Network-path reference (`//host/path`): drop the authority.
    match reference.strip_prefix("//") {
        Some(rest) => rest.find('/').map(|i| &rest[i..]).unwrap_or("").to_string(),
        None => reference.to_string(),
    }
}
