//! Link types.

use std::fmt;

/// A link as written in the wiki markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<'a> {
    /// Raw reference (page name, URL, `Attach:` path, anchor)
    pub target: &'a str,

    /// Text shown for the link; `None`, empty or `+` selects the default
    pub display: Option<&'a str>,
}

impl<'a> Link<'a> {
    /// Create a link with explicit display text.
    pub fn new(target: &'a str, display: &'a str) -> Self {
        Self {
            target,
            display: Some(display),
        }
    }

    /// Create a link without display text.
    pub fn bare(target: &'a str) -> Self {
        Self {
            target,
            display: None,
        }
    }

    /// Trimmed display text, or `None` when it is empty or `+` and the
    /// default should be used.
    pub fn explicit_display(&self) -> Option<&'a str> {
        self.display
            .map(str::trim)
            .filter(|text| !text.is_empty() && *text != "+")
    }
}

/// A link after resolution, ready to render as Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Display text (alt text for images)
    pub text: String,

    /// Link destination with spaces percent-encoded
    pub path: String,

    /// Whether the destination is an image to embed
    pub image: bool,
}

impl fmt::Display for ResolvedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.image {
            write!(f, "![{}]({})", self.text, self.path)
        } else {
            write!(f, "[{}]({})", self.text, self.path)
        }
    }
}
