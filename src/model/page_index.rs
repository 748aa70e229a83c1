//! Page names and the book → pages index.

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// A page identified by its `Book.Page` file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageName {
    /// Group the page belongs to
    pub book: String,

    /// Page name within the book, may itself contain dots
    pub page: String,
}

impl PageName {
    pub fn new(book: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            page: page.into(),
        }
    }

    /// Split a file name at its first `.`.
    ///
    /// Both halves must be non-empty, so lock and index files such as
    /// `.flock` are rejected.
    pub fn parse(filename: &str) -> Result<Self> {
        match filename.split_once('.') {
            Some((book, page)) if !book.is_empty() && !page.is_empty() => {
                Ok(Self::new(book, page))
            }
            _ => Err(Error::InvalidPageName(filename.to_string())),
        }
    }

    /// Relative output path, `<book>/<page>.md`.
    pub fn output_path(&self) -> PathBuf {
        Path::new(&self.book).join(format!("{}.md", self.page))
    }

    /// Path segments of this page's attachment directory.
    pub fn upload_segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.book.as_str()).chain(self.page.split('.'))
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.book, self.page)
    }
}

/// Lookup key for bare page references.
///
/// NFC-normalized, lowercased, with whitespace, underscores and parentheses
/// removed: `My Page`, `my_page` and `(My)Page` all map to `mypage`.
pub fn normalize_page_name(name: &str) -> String {
    name.nfc()
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '(' | ')'))
        .collect()
}

/// Mapping of every book to its pages, plus a reverse lookup by page name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageIndex {
    books: BTreeMap<String, BTreeSet<String>>,

    #[serde(skip)]
    lookup: HashMap<String, (String, String)>,
}

impl PageIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every page file in `dir`, skipping `excludes`.
    pub fn from_dir(dir: impl AsRef<Path>, excludes: &BTreeSet<String>) -> Result<Self> {
        Ok(list_pages(dir, excludes)?
            .into_iter()
            .map(|(_, name)| name)
            .collect())
    }

    /// Add a page.
    ///
    /// When two books hold pages with the same normalized name, the lookup
    /// keeps the smallest `(book, page)` pair so the result does not depend
    /// on insertion order.
    pub fn insert(&mut self, book: impl Into<String>, page: impl Into<String>) {
        let book = book.into();
        let page = page.into();

        let key = normalize_page_name(&page);
        let candidate = (book.clone(), page.clone());
        match self.lookup.entry(key) {
            Entry::Occupied(mut slot) => {
                if candidate < *slot.get() {
                    slot.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }

        self.books.entry(book).or_default().insert(page);
    }

    /// Check whether `book` holds `page`.
    pub fn contains(&self, book: &str, page: &str) -> bool {
        self.books.get(book).is_some_and(|pages| pages.contains(page))
    }

    /// Find the `(book, page)` a bare page reference points at.
    pub fn resolve(&self, reference: &str) -> Option<(&str, &str)> {
        self.lookup
            .get(&normalize_page_name(reference))
            .map(|(book, page)| (book.as_str(), page.as_str()))
    }

    /// Iterate over book names in sorted order.
    pub fn books(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    /// Pages of one book in sorted order.
    pub fn pages(&self, book: &str) -> impl Iterator<Item = &str> {
        self.books
            .get(book)
            .into_iter()
            .flat_map(|pages| pages.iter().map(String::as_str))
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn page_count(&self) -> usize {
        self.books.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl FromIterator<PageName> for PageIndex {
    fn from_iter<I: IntoIterator<Item = PageName>>(iter: I) -> Self {
        let mut index = Self::new();
        for name in iter {
            index.insert(name.book, name.page);
        }
        index
    }
}

/// List the page files of `dir`, sorted by name.
///
/// Subdirectories, files whose name is in `excludes` and names that are not
/// `Book.Page` are skipped.
pub fn list_pages(
    dir: impl AsRef<Path>,
    excludes: &BTreeSet<String>,
) -> Result<Vec<(PathBuf, PageName)>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::MissingInputDir(dir.to_path_buf()));
    }

    let mut pages = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().into_owned();
        if excludes.contains(&filename) {
            debug!("Excluded: {}", filename);
            continue;
        }

        match PageName::parse(&filename) {
            Ok(name) => pages.push((entry.path(), name)),
            Err(e) => debug!("Skipping {}", e),
        }
    }

    pages.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_page_name() {
        let name = PageName::parse("Main.HomePage").unwrap();
        assert_eq!(name, PageName::new("Main", "HomePage"));
        assert_eq!(name.to_string(), "Main.HomePage");
        assert_eq!(name.output_path(), Path::new("Main").join("HomePage.md"));

        let name = PageName::parse("Docs.Setup.Linux").unwrap();
        assert_eq!(name.page, "Setup.Linux");
        assert_eq!(
            name.upload_segments().collect::<Vec<_>>(),
            vec!["Docs", "Setup", "Linux"]
        );
    }

    #[test]
    fn test_parse_rejects_non_pages() {
        assert!(PageName::parse(".flock").is_err());
        assert!(PageName::parse("README").is_err());
        assert!(PageName::parse("Main.").is_err());
    }

    #[test]
    fn test_normalize_page_name() {
        assert_eq!(normalize_page_name("My Page"), "mypage");
        assert_eq!(normalize_page_name("my_page"), "mypage");
        assert_eq!(normalize_page_name("(My)Page"), "mypage");
        // decomposed e + combining acute
        assert_eq!(normalize_page_name("Cafe\u{301}"), normalize_page_name("Caf\u{e9}"));
    }

    #[test]
    fn test_resolve() {
        let mut index = PageIndex::new();
        index.insert("Book1", "MyPage");
        index.insert("Book1", "Other");

        assert_eq!(index.resolve("my page"), Some(("Book1", "MyPage")));
        assert_eq!(index.resolve("MY_PAGE"), Some(("Book1", "MyPage")));
        assert_eq!(index.resolve("Missing"), None);
        assert!(index.contains("Book1", "Other"));
        assert_eq!(index.page_count(), 2);
    }

    #[test]
    fn test_ambiguous_resolves_to_smallest() {
        let mut index = PageIndex::new();
        index.insert("Zeta", "Intro");
        index.insert("Alpha", "Intro");
        index.insert("Mid", "Intro");
        assert_eq!(index.resolve("Intro"), Some(("Alpha", "Intro")));
        assert_eq!(index.book_count(), 3);
    }

    #[test]
    fn test_list_pages_and_from_dir() {
        let dir = TempDir::new().unwrap();
        for name in ["Main.HomePage", "Main.Intro", "Docs.Setup", ".flock", "notes"] {
            fs::write(dir.path().join(name), "text").unwrap();
        }
        fs::create_dir(dir.path().join("Sub.Dir")).unwrap();

        let excludes = BTreeSet::from(["Main.HomePage".to_string()]);
        let pages = list_pages(dir.path(), &excludes).unwrap();
        let names: Vec<String> = pages.iter().map(|(_, n)| n.to_string()).collect();
        assert_eq!(names, vec!["Docs.Setup", "Main.Intro"]);

        let index = PageIndex::from_dir(dir.path(), &excludes).unwrap();
        assert_eq!(index.books().collect::<Vec<_>>(), vec!["Docs", "Main"]);
        assert_eq!(index.pages("Main").collect::<Vec<_>>(), vec!["Intro"]);
    }

    #[test]
    fn test_missing_dir() {
        let err = list_pages("/definitely/not/here", &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, Error::MissingInputDir(_)));
    }

    #[test]
    fn test_index_json_lists_books() {
        let index: PageIndex = [PageName::new("Main", "Intro")].into_iter().collect();
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"books":{"Main":["Intro"]}}"#);
    }
}
