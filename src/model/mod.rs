//! Data model shared by the conversion stages.
//!
//! Pages are identified by their `Book.Page` file names, collected into a
//! [`PageIndex`] before any conversion starts. Links and table attributes are
//! transient values parsed out of the markup and rendered straight back to
//! Markdown.

mod diagnostic;
mod link;
mod page_index;
mod table;

pub use diagnostic::Diagnostic;
pub use link::{Link, ResolvedLink};
pub use page_index::{list_pages, normalize_page_name, PageIndex, PageName};
pub use table::{Alignment, TableAttributes};
