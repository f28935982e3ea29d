//! Per-page walk producing [`PageFragment`]s.
//!
//! Paragraphs and headers are visited in document order. Each one is tagged
//! with the page title and with the most recent header seen *directly under
//! the same parent element*. Header context is keyed by the parent's
//! structural selector and does not flow to other parents, including
//! descendants of that parent.

use std::collections::HashMap;
use std::sync::Arc;

use scraper::Html;
use tracing::{debug, instrument};

use sitesearch_shared::{FragmentTag, PageFragment};

use crate::dom::{DomNode, ScraperNode};
use crate::hierarchy::path_hierarchy;
use crate::selector::structural_selector;

/// Walk `document` and hand every fragment to `emit` as soon as it is built.
///
/// Returns the number of fragments emitted. Header state lives only for the
/// duration of this call.
pub fn extract_fragments<N: DomNode>(
    document: &N,
    url: &str,
    mut emit: impl FnMut(PageFragment),
) -> usize {
    let sections: Arc<[String]> = path_hierarchy(url).into();
    let elements = document.descendant_elements();

    let base_titles: Vec<String> = elements
        .iter()
        .find(|el| el.tag_name() == Some("title"))
        .map(|title| title.text().trim().to_string())
        .filter(|title| !title.is_empty())
        .into_iter()
        .collect();

    // parent selector -> text of the latest header directly under it
    let mut current_headers: HashMap<String, String> = HashMap::new();
    let mut emitted = 0;

    for element in &elements {
        let Some(tag) = element.tag_name().and_then(FragmentTag::from_name) else {
            continue;
        };

        let parent_key = element
            .parent()
            .map(|parent| structural_selector(&parent))
            .unwrap_or_default();

        let prior_header = current_headers
            .get(&parent_key)
            .filter(|header| !header.is_empty())
            .cloned();

        let text = element.text();
        let text = text.trim();

        if tag.is_header() {
            current_headers.insert(parent_key, text.to_string());
        }

        let mut lines = split_lines(text).map(str::trim).filter(|l| !l.is_empty()).peekable();
        if lines.peek().is_none() {
            continue;
        }

        let location = structural_selector(element);
        let mut titles = base_titles.clone();
        titles.extend(prior_header);

        for line in lines {
            emit(PageFragment {
                text: line.to_string(),
                url: url.to_string(),
                tag,
                location: location.clone(),
                sections: Arc::clone(&sections),
                titles: titles.clone(),
            });
            emitted += 1;
        }
    }

    emitted
}

/// Collecting variant of [`extract_fragments`].
pub fn extract_page<N: DomNode>(document: &N, url: &str) -> Vec<PageFragment> {
    let mut fragments = Vec::new();
    extract_fragments(document, url, |fragment| fragments.push(fragment));
    fragments
}

/// Parse an HTML page with `scraper` and extract its fragments.
#[instrument(level = "debug", skip(html), fields(url = %url))]
pub fn extract_html(html: &str, url: &str) -> Vec<PageFragment> {
    let doc = Html::parse_document(html);
    let fragments = extract_page(&ScraperNode::document(&doc), url);
    debug!(fragments = fragments.len(), "page extracted");
    fragments
}

/// Split on every Unicode line boundary (`\r\n` yields an extra empty piece,
/// which callers skip along with blank lines).
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r'
                | '\u{0b}'
                | '\u{0c}'
                | '\u{1c}'
                | '\u{1d}'
                | '\u{1e}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        )
    })
}
