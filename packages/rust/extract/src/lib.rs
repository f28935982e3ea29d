//! Fragment extraction: turns a parsed page into searchable abstracts.
//!
//! This crate provides:
//! - [`dom`]: the node abstraction the extractor walks ([`DomNode`], [`ScraperNode`])
//! - [`hierarchy`]: cumulative URL path segments ([`path_hierarchy`])
//! - [`selector`]: stable structural selectors for DOM nodes ([`structural_selector`])
//! - [`page`]: the per-page walk that tags paragraphs and headers with context

pub mod dom;
pub mod hierarchy;
pub mod page;
pub mod selector;

pub use dom::{DomNode, ScraperNode};
pub use hierarchy::path_hierarchy;
pub use page::{extract_fragments, extract_html, extract_page};
pub use selector::structural_selector;
