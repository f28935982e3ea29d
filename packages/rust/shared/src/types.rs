//! Core domain types for extracted page abstracts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FragmentTag
// ---------------------------------------------------------------------------

/// Element type a fragment's text was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentTag {
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl FragmentTag {
    /// Header tags in rank order.
    pub const HEADERS: [FragmentTag; 6] = [
        FragmentTag::H1,
        FragmentTag::H2,
        FragmentTag::H3,
        FragmentTag::H4,
        FragmentTag::H5,
        FragmentTag::H6,
    ];

    /// Map an element name to a tag. Returns `None` for anything that is not
    /// a paragraph or a header.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "p" => Some(Self::P),
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            "h5" => Some(Self::H5),
            "h6" => Some(Self::H6),
            _ => None,
        }
    }

    /// Lowercase element name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P => "p",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
        }
    }

    pub fn is_header(&self) -> bool {
        self.rank().is_some()
    }

    /// Header level (1 for `h1` .. 6 for `h6`), `None` for paragraphs.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::P => None,
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
        }
    }
}

impl std::fmt::Display for FragmentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PageFragment
// ---------------------------------------------------------------------------

/// One extracted line of visible text plus its structural and contextual
/// metadata. Serialized as one JSONL record per fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFragment {
    /// Single non-empty line of text.
    pub text: String,
    /// Absolute URL of the source page.
    pub url: String,
    /// Element type the text came from.
    pub tag: FragmentTag,
    /// Structural selector of the source element within the page.
    pub location: String,
    /// Cumulative URL path segments, outer to inner. Shared by every
    /// fragment of the same page.
    pub sections: Arc<[String]>,
    /// Page title (if any) followed by the header active under the same
    /// parent element (if any).
    pub titles: Vec<String>,
}
