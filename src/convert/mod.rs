//! PmWiki to Markdown conversion pipeline.
//!
//! A document goes through these stages in order:
//!
//! 1. indented code lines are swapped for placeholders ([`code_block`])
//! 2. list, heading and inline formatting rules run ([`inline`])
//! 3. colors, anchors, links and comments are rewritten ([`link`])
//! 4. tables and directive lines are converted line by line ([`block`])
//! 5. code lines are restored inside fences
//!
//! # Example
//!
//! ```
//! use pmwiki2md::convert::{ConvertOptions, Converter};
//! use pmwiki2md::PageIndex;
//!
//! let mut index = PageIndex::new();
//! index.insert("Main", "Intro");
//!
//! let converter = Converter::new(ConvertOptions::default())?;
//! let result = converter.convert("Main.HomePage", "!Welcome\nSee [[Intro]].", &index);
//! assert_eq!(result.content, "# Welcome\nSee [Intro](/Main/Intro.md).");
//! # Ok::<(), pmwiki2md::Error>(())
//! ```

pub mod block;
pub mod code_block;
pub mod comment;
pub mod inline;
pub mod link;
mod pattern;

pub use code_block::{extract_code_blocks, restore_code_blocks, CodeBlocks};
pub use link::{LinkContext, LinkResolver};

use crate::error::Result;
use crate::model::{Diagnostic, PageIndex};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Colors recognised in `%color%` spans.
pub const DEFAULT_COLORS: &[&str] = &["red", "blue", "green", "black"];

/// Extensions rendered as embedded images.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// How hard line breaks (`\\` at end of line) end up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakStyle {
    /// Keep a trailing backslash, CommonMark's hard break
    #[default]
    Hard,
    /// Drop trailing backslashes, for renderers that break on every newline
    Soft,
}

/// Options for converting a single document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Color names accepted in `%name%` spans
    pub colors: Vec<String>,

    /// Extra `%name%` spans mapped to a CSS color value
    pub color_aliases: BTreeMap<String, String>,

    /// Root of attachment links (e.g. "/uploads")
    pub upload_prefix: String,

    /// Lowercase extensions embedded as images
    pub image_extensions: Vec<String>,

    /// Fence line around restored code blocks
    pub code_fence: String,

    /// Line break handling
    pub line_breaks: LineBreakStyle,
}

impl ConvertOptions {
    /// Create new conversion options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `%name%` to a CSS color value.
    pub fn with_color_alias(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.color_aliases.insert(name.into(), value.into());
        self
    }

    /// Replace the set of plain color names.
    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the attachment link prefix.
    pub fn with_upload_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.upload_prefix = prefix.into();
        self
    }

    /// Replace the image extension list.
    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the code fence line.
    pub fn with_code_fence(mut self, fence: impl Into<String>) -> Self {
        self.code_fence = fence.into();
        self
    }

    /// Set line break handling.
    pub fn with_line_breaks(mut self, style: LineBreakStyle) -> Self {
        self.line_breaks = style;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            color_aliases: BTreeMap::from([("theosred".to_string(), "#d21f15".to_string())]),
            upload_prefix: "/uploads".to_string(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            code_fence: "```".to_string(),
            line_breaks: LineBreakStyle::Hard,
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResult {
    /// Converted Markdown
    pub content: String,

    /// Advisory problems found while converting
    pub diagnostics: Vec<Diagnostic>,
}

impl ConvertResult {
    /// Check whether the conversion raised no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Converts PmWiki documents with a fixed set of options.
///
/// A converter is immutable once built and can be shared across threads to
/// convert many documents against the same [`PageIndex`].
#[derive(Debug)]
pub struct Converter {
    options: ConvertOptions,
    resolver: LinkResolver,
}

impl Converter {
    /// Build a converter, compiling option-dependent patterns.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        let resolver = LinkResolver::new(&options)?;
        Ok(Self { options, resolver })
    }

    /// Get the options this converter was built with.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the raw text of `filename` (a `Book.Page` name).
    pub fn convert(&self, filename: &str, text: &str, index: &PageIndex) -> ConvertResult {
        let mut lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        let codes = extract_code_blocks(&mut lines);
        debug!("{}: extracted {} code lines", filename, codes.len());

        let text = inline::format_inline(&lines.join("\n"));

        let mut ctx = LinkContext::new(filename, index);
        let text = self.resolver.rewrite(&text, &mut ctx);

        let mut lines: Vec<String> = text.split('\n').map(String::from).collect();
        block::process_blocks(&mut lines);

        if self.options.line_breaks == LineBreakStyle::Soft {
            inline::soften_line_breaks(&mut lines);
        }

        let lines = restore_code_blocks(lines, &codes, &self.options.code_fence);

        ConvertResult {
            content: lines.join("\n"),
            diagnostics: ctx.diagnostics,
        }
    }
}
