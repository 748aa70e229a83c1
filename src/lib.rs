//! # pmwiki2md
//!
//! Convert PmWiki page directories to Markdown.
//!
//! Every `Book.Page` file of a directory is indexed first, so bare page
//! references such as `[[Setup]]` can be resolved to the book that holds the
//! page. Each page is then rewritten to CommonMark-style Markdown and written
//! to `<output>/<book>/<page>.md`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pmwiki2md::{convert_dir, BatchOptions};
//!
//! fn main() -> pmwiki2md::Result<()> {
//!     let report = convert_dir("wiki.d", "markdown_output", &BatchOptions::default())?;
//!     for diagnostic in report.diagnostics() {
//!         eprintln!("{}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Formatting**: headings, lists, emphasis, monospace, quotes, breaks
//! - **Links**: page references, attachments, anchors, external URLs
//! - **Tables**: simple `||` tables and `(:table:)` cell directives
//! - **Code**: indented blocks are kept verbatim inside fences
//! - **Parallel processing**: pages convert on the Rayon thread pool

pub mod batch;
pub mod convert;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use batch::{
    convert_dir, convert_dir_with_progress, convert_page, BatchOptions, BatchReport, PageReport,
    DEFAULT_EXCLUDES,
};
pub use convert::{ConvertOptions, ConvertResult, Converter, LineBreakStyle};
pub use error::{Error, Result};
pub use model::{Diagnostic, PageIndex, PageName};

/// Convert the markup of one page to Markdown with default options.
///
/// `filename` is the page's `Book.Page` name; it decides where attachments
/// without an explicit page live. Diagnostics are logged and dropped; use a
/// [`Converter`] to inspect them.
///
/// # Example
///
/// ```
/// use pmwiki2md::{to_markdown, PageIndex};
///
/// let markdown = to_markdown("Main.Intro", "!!Hello\n''world''", &PageIndex::new())?;
/// assert_eq!(markdown, "## Hello\n*world*");
/// # Ok::<(), pmwiki2md::Error>(())
/// ```
pub fn to_markdown(filename: &str, text: &str, index: &PageIndex) -> Result<String> {
    to_markdown_with_options(filename, text, index, &ConvertOptions::default())
}

/// Convert the markup of one page with custom options.
pub fn to_markdown_with_options(
    filename: &str,
    text: &str,
    index: &PageIndex,
    options: &ConvertOptions,
) -> Result<String> {
    let converter = Converter::new(options.clone())?;
    Ok(converter.convert(filename, text, index).content)
}
