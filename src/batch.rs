//! Directory conversion.
//!
//! A run lists the input directory once. The same filtered listing feeds
//! both the page index and the conversion pass, so an excluded page can
//! neither be converted nor be the target of a resolved link.

use crate::convert::{ConvertOptions, ConvertResult, Converter};
use crate::error::{Error, Result};
use crate::model::{list_pages, Diagnostic, PageIndex, PageName};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Pages skipped unless the caller supplies its own exclusion set.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "Group.RecentChanges",
    "Group.EditThesesArchives",
    "Main.HomePage",
];

/// Options for converting a whole directory.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// File names left out of both the index and the conversion
    pub excludes: BTreeSet<String>,

    /// Per-document conversion options
    pub convert: ConvertOptions,

    /// Convert pages on the rayon thread pool
    pub parallel: bool,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the exclusion set.
    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    /// Set per-document conversion options.
    pub fn with_convert_options(mut self, options: ConvertOptions) -> Self {
        self.convert = options;
        self
    }

    /// Convert one page at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            convert: ConvertOptions::default(),
            parallel: true,
        }
    }
}

/// Outcome for one converted page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Page name (`Book.Page`)
    pub name: String,

    /// Source file
    pub source: PathBuf,

    /// Written Markdown file
    pub output: PathBuf,

    pub diagnostics: Vec<Diagnostic>,
}

/// Summary of a directory conversion.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Number of books in the index
    pub books: usize,

    /// Converted pages in file-name order
    pub pages: Vec<PageReport>,

    /// Excluded files that were present in the input directory
    pub excluded: Vec<String>,
}

impl BatchReport {
    /// Number of converted pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total diagnostics across all pages.
    pub fn diagnostic_count(&self) -> usize {
        self.pages.iter().map(|p| p.diagnostics.len()).sum()
    }

    /// Iterate over every diagnostic.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.pages.iter().flat_map(|p| p.diagnostics.iter())
    }

    /// Serialize the report.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Convert every page of `input` into `output/<book>/<page>.md`.
pub fn convert_dir(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &BatchOptions,
) -> Result<BatchReport> {
    convert_dir_with_progress(input, output, options, |_| {})
}

/// Like [`convert_dir`], calling `on_page` after each page is written.
///
/// With parallel conversion the callback runs on worker threads and pages
/// finish in no particular order.
pub fn convert_dir_with_progress<F>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &BatchOptions,
    on_page: F,
) -> Result<BatchReport>
where
    F: Fn(&PageName) + Sync,
{
    let input = input.as_ref();
    let output = output.as_ref();

    let pages = list_pages(input, &options.excludes)?;
    let index: PageIndex = pages.iter().map(|(_, name)| name.clone()).collect();
    info!(
        "Indexed {} pages in {} books from {}",
        index.page_count(),
        index.book_count(),
        input.display()
    );

    let converter = Converter::new(options.convert.clone())?;
    fs::create_dir_all(output)?;

    let convert_one = |(source, name): &(PathBuf, PageName)| -> Result<PageReport> {
        let result = convert_source(&converter, source, name, &index)?;

        let target = output.join(name.output_path());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &result.content)?;
        debug!("Wrote {}", target.display());
        on_page(name);

        Ok(PageReport {
            name: name.to_string(),
            source: source.clone(),
            output: target,
            diagnostics: result.diagnostics,
        })
    };

    let reports = if options.parallel {
        pages.par_iter().map(&convert_one).collect::<Result<Vec<_>>>()?
    } else {
        pages.iter().map(&convert_one).collect::<Result<Vec<_>>>()?
    };

    let excluded = options
        .excludes
        .iter()
        .filter(|name| input.join(name).is_file())
        .cloned()
        .collect();

    let report = BatchReport {
        generated_at: Utc::now(),
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        books: index.book_count(),
        pages: reports,
        excluded,
    };
    info!(
        "Converted {} pages with {} diagnostics",
        report.page_count(),
        report.diagnostic_count()
    );
    Ok(report)
}

/// Convert one page file, indexing the other pages of its directory.
pub fn convert_page(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<ConvertResult> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidPageName(path.display().to_string()))?;
    let name = PageName::parse(&filename)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let index = PageIndex::from_dir(dir, &BTreeSet::new())?;

    let converter = Converter::new(options.clone())?;
    convert_source(&converter, path, &name, &index)
}

fn convert_source(
    converter: &Converter,
    source: &Path,
    name: &PageName,
    index: &PageIndex,
) -> Result<ConvertResult> {
    let bytes = fs::read(source)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} is not valid UTF-8, replacing invalid bytes", name);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(converter.convert(&name.to_string(), &text, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_batch_options_default() {
        let options = BatchOptions::default();
        assert!(options.parallel);
        assert!(options.excludes.contains("Main.HomePage"));
        assert_eq!(options.excludes.len(), 3);
    }

    #[test]
    fn test_batch_options_builder() {
        let options = BatchOptions::new()
            .with_excludes(["Site.SideBar"])
            .sequential();
        assert!(!options.parallel);
        assert_eq!(
            options.excludes.iter().collect::<Vec<_>>(),
            vec!["Site.SideBar"]
        );
    }

    #[test]
    fn test_convert_page_indexes_siblings() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Docs.Setup"), "!Setup").unwrap();
        fs::write(dir.path().join("Main.Intro"), "See [[setup]].").unwrap();

        let result = convert_page(dir.path().join("Main.Intro"), &ConvertOptions::default())
            .unwrap();
        assert_eq!(result.content, "See [Setup](/Docs/Setup.md).");
        assert!(result.is_clean());
    }

    #[test]
    fn test_convert_page_rejects_bad_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README"), "text").unwrap();
        let err = convert_page(dir.path().join("README"), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidPageName(_)));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Main.Latin"), b"caf\xe9").unwrap();
        let result =
            convert_page(dir.path().join("Main.Latin"), &ConvertOptions::default()).unwrap();
        assert_eq!(result.content, "caf\u{fffd}");
    }
}
