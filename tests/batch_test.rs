//! Integration tests for directory conversion.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use pmwiki2md::{convert_dir, convert_dir_with_progress, BatchOptions, Diagnostic, Error};
use tempfile::TempDir;

fn write_wiki(dir: &Path) {
    fs::write(dir.join("Main.HomePage"), "!Home\n[[Intro]]").unwrap();
    fs::write(dir.join("Main.Intro"), "See [[Setup]] and [[HomePage]].").unwrap();
    fs::write(dir.join("Docs.Setup"), "!Setup\n  cargo build").unwrap();
    fs::write(dir.join(".flock"), "").unwrap();
    fs::create_dir(dir.join("uploads")).unwrap();
}

#[test]
fn test_convert_dir_writes_book_folders() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_wiki(input.path());

    let report = convert_dir(input.path(), output.path(), &BatchOptions::default()).unwrap();

    let intro = fs::read_to_string(output.path().join("Main").join("Intro.md")).unwrap();
    assert_eq!(intro, "See [Setup](/Docs/Setup.md) and [HomePage](/.md).");

    let setup = fs::read_to_string(output.path().join("Docs").join("Setup.md")).unwrap();
    assert_eq!(setup, "# Setup\n```\n  cargo build\n```");

    assert_eq!(report.page_count(), 2);
    assert_eq!(report.books, 2);
    let names: Vec<&str> = report.pages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Docs.Setup", "Main.Intro"]);
}

#[test]
fn test_excluded_pages_skipped_in_both_passes() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_wiki(input.path());

    let report = convert_dir(input.path(), output.path(), &BatchOptions::default()).unwrap();

    // not converted
    assert!(!output.path().join("Main").join("HomePage.md").exists());
    assert_eq!(report.excluded, vec!["Main.HomePage"]);

    // not indexed, so links to it stay unresolved
    let diagnostics: Vec<&Diagnostic> = report.diagnostics().collect();
    assert_eq!(
        diagnostics,
        vec![&Diagnostic::UnresolvedLink {
            file: "Main.Intro".to_string(),
            target: "HomePage".to_string(),
        }]
    );
}

#[test]
fn test_custom_excludes_replace_defaults() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_wiki(input.path());

    let options = BatchOptions::new().with_excludes(["Docs.Setup"]);
    let report = convert_dir(input.path(), output.path(), &options).unwrap();

    let home = fs::read_to_string(output.path().join("Main").join("HomePage.md")).unwrap();
    assert_eq!(home, "# Home\n[Intro](/Main/Intro.md)");

    let intro = fs::read_to_string(output.path().join("Main").join("Intro.md")).unwrap();
    assert_eq!(intro, "See [Setup](/.md) and [HomePage](/Main/HomePage.md).");
    assert_eq!(report.diagnostic_count(), 1);
}

#[test]
fn test_sequential_matches_parallel() {
    let input = TempDir::new().unwrap();
    let parallel_out = TempDir::new().unwrap();
    let sequential_out = TempDir::new().unwrap();
    write_wiki(input.path());

    let parallel = convert_dir(input.path(), parallel_out.path(), &BatchOptions::new()).unwrap();
    let sequential = convert_dir(
        input.path(),
        sequential_out.path(),
        &BatchOptions::new().sequential(),
    )
    .unwrap();

    assert_eq!(parallel.page_count(), sequential.page_count());
    for page in ["Main/Intro.md", "Docs/Setup.md"] {
        assert_eq!(
            fs::read_to_string(parallel_out.path().join(page)).unwrap(),
            fs::read_to_string(sequential_out.path().join(page)).unwrap()
        );
    }
}

#[test]
fn test_progress_callback_per_page() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_wiki(input.path());

    let seen = AtomicUsize::new(0);
    convert_dir_with_progress(input.path(), output.path(), &BatchOptions::new(), |_| {
        seen.fetch_add(1, Ordering::Relaxed);
    })
    .unwrap();

    assert_eq!(seen.load(Ordering::Relaxed), 2);
}

#[test]
fn test_report_json() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_wiki(input.path());

    let report = convert_dir(input.path(), output.path(), &BatchOptions::new()).unwrap();
    let json = report.to_json(false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["books"], 2);
    assert_eq!(value["pages"][1]["name"], "Main.Intro");
    assert_eq!(value["pages"][1]["diagnostics"][0]["kind"], "unresolved_link");
    assert!(value["generated_at"].is_string());
}

#[test]
fn test_missing_input_dir() {
    let output = TempDir::new().unwrap();
    let missing = output.path().join("no-such-wiki");

    let err = convert_dir(&missing, output.path(), &BatchOptions::new()).unwrap_err();
    assert!(matches!(err, Error::MissingInputDir(_)));
    assert!(!output.path().join("Main").exists());
}
