//! Structural selectors: a stable, CSS-like path from the document root to a node.

use crate::dom::DomNode;

/// Build a selector locating `node` by element name and same-name sibling
/// position at every level, e.g. `html > body > div:nth-of-type(2) > p`.
///
/// Non-element nodes (text, comments) are located through their parent
/// element. A level is written as the bare element name when the node is
/// the only direct child of that name, otherwise as
/// `name:nth-of-type(k)` with a 1-based `k`. The document root itself
/// yields an empty string.
pub fn structural_selector<N: DomNode>(node: &N) -> String {
    let mut current = if node.tag_name().is_some() {
        node.clone()
    } else {
        match node.parent() {
            Some(parent) => parent,
            None => return String::new(),
        }
    };

    let mut components: Vec<String> = Vec::new();

    while let Some(parent) = current.parent() {
        let Some(name) = current.tag_name() else {
            break;
        };

        let siblings = parent.children_of_type(name);
        let component = match siblings.iter().position(|s| *s == current) {
            Some(_) if siblings.len() == 1 => name.to_string(),
            Some(index) => format!("{name}:nth-of-type({})", index + 1),
            // The parent does not list us as a child: a broken tree. Keep
            // the bare name rather than inventing an ordinal.
            None => name.to_string(),
        };
        components.push(component);

        current = parent;
    }

    components.reverse();
    components.join(" > ")
}
