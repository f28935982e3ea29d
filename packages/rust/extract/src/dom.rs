//! Minimal DOM navigation contract used by the extractor.
//!
//! The extractor only needs element names, text, parent links, and direct
//! children filtered by element name. Any HTML parser that can answer those
//! questions can back it; [`ScraperNode`] does so for `scraper` documents.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, node::Node};

/// A node in a parsed document tree.
///
/// Equality must be node identity, not structural equality: two sibling
/// `<p>x</p>` elements are different nodes.
pub trait DomNode: Clone + PartialEq {
    /// Element name (lowercase), or `None` for text, comment and document nodes.
    fn tag_name(&self) -> Option<&str>;

    /// Concatenated text of this node and all its descendants.
    fn text(&self) -> String;

    /// Parent node, `None` at the document root.
    fn parent(&self) -> Option<Self>;

    /// Direct element children named `tag`, in document order.
    fn children_of_type(&self, tag: &str) -> Vec<Self>;

    /// All descendant elements (excluding `self`) in document order.
    fn descendant_elements(&self) -> Vec<Self>;
}

// ---------------------------------------------------------------------------
// scraper backend
// ---------------------------------------------------------------------------

/// [`DomNode`] over a `scraper::Html` tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScraperNode<'a>(NodeRef<'a, Node>);

impl<'a> ScraperNode<'a> {
    /// The document root of a parsed page.
    pub fn document(html: &'a Html) -> Self {
        Self(html.tree.root())
    }

    /// The underlying tree node.
    pub fn node(&self) -> NodeRef<'a, Node> {
        self.0
    }
}

impl<'a> From<ElementRef<'a>> for ScraperNode<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self(*element)
    }
}

impl<'a> From<NodeRef<'a, Node>> for ScraperNode<'a> {
    fn from(node: NodeRef<'a, Node>) -> Self {
        Self(node)
    }
}

impl DomNode for ScraperNode<'_> {
    fn tag_name(&self) -> Option<&str> {
        self.0.value().as_element().map(|el| el.name())
    }

    fn text(&self) -> String {
        self.0
            .descendants()
            .filter_map(|n| n.value().as_text())
            .map(|t| &**t)
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent().map(Self)
    }

    fn children_of_type(&self, tag: &str) -> Vec<Self> {
        self.0
            .children()
            .filter(|c| c.value().as_element().is_some_and(|el| el.name() == tag))
            .map(Self)
            .collect()
    }

    fn descendant_elements(&self) -> Vec<Self> {
        self.0
            .descendants()
            .skip(1)
            .filter(|n| n.value().is_element())
            .map(Self)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn navigation_over_scraper_tree() {
        let html = Html::parse_document(
            "<html><body><div><p>one <b>bold</b></p><span>s</span><p>two</p></div></body></html>",
        );
        let div_sel = Selector::parse("div").unwrap();
        let div = ScraperNode::from(html.select(&div_sel).next().unwrap());

        assert_eq!(div.tag_name(), Some("div"));
        assert_eq!(div.children_of_type("p").len(), 2);
        assert_eq!(div.children_of_type("b").len(), 0);
        assert_eq!(div.parent().and_then(|p| p.tag_name().map(String::from)), Some("body".into()));

        let first_p = &div.children_of_type("p")[0];
        assert_eq!(first_p.text(), "one bold");
    }

    #[test]
    fn document_root_has_no_tag_or_parent() {
        let html = Html::parse_document("<p>x</p>");
        let root = ScraperNode::document(&html);
        assert_eq!(root.tag_name(), None);
        assert!(root.parent().is_none());

        let names: Vec<String> = root
            .descendant_elements()
            .iter()
            .filter_map(|n| n.tag_name().map(String::from))
            .collect();
        assert_eq!(names, vec!["html", "head", "body", "p"]);
    }

    #[test]
    fn text_node_has_no_tag() {
        let html = Html::parse_document("<p>hello</p>");
        let p_sel = Selector::parse("p").unwrap();
        let p = html.select(&p_sel).next().unwrap();
        let text = ScraperNode::from(p.first_child().unwrap());

        assert_eq!(text.tag_name(), None);
        assert_eq!(text.text(), "hello");
        assert_eq!(text.parent(), Some(ScraperNode::from(p)));
    }
}
