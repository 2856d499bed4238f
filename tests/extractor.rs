mod common;

use std::fs;

use pdfquiz::extractor::{extract_text, Extraction};

fn write_pdf(dir: &tempfile::TempDir, pages: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("doc.pdf");
    fs::write(&path, common::build_pdf(pages)).unwrap();
    path
}

#[test]
fn extracts_pages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(&dir, &["First page", "Second page"]);

    let Extraction::Text(text) = extract_text(&path, 2000).unwrap() else {
        panic!("expected text");
    };
    let first = text.find("First page").unwrap();
    let second = text.find("Second page").unwrap();
    assert!(first < second);
}

#[test]
fn text_is_capped_across_pages() {
    let dir = tempfile::tempdir().unwrap();
    let page = "x".repeat(900);
    let path = write_pdf(&dir, &[&page, &page, &page, "tail marker"]);

    let Extraction::Text(text) = extract_text(&path, 2000).unwrap() else {
        panic!("expected text");
    };
    assert!(text.chars().count() <= 2000);
    assert!(!text.contains("tail marker"));
}

#[test]
fn long_first_page_is_kept_whole() {
    let dir = tempfile::tempdir().unwrap();
    let first = format!("{}END", common::prose(2500));
    let path = write_pdf(&dir, &[&first, "second page"]);

    let Extraction::Text(text) = extract_text(&path, 2000).unwrap() else {
        panic!("expected text");
    };
    assert!(text.chars().count() > 2000);
    assert!(text.contains("END"));
    assert!(!text.contains("second page"));
}

#[test]
fn image_only_pdf_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(&dir, &["", ""]);

    assert_eq!(extract_text(&path, 2000).unwrap(), Extraction::Empty);
}

#[test]
fn blank_pages_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(&dir, &["", "Only real text"]);

    let Extraction::Text(text) = extract_text(&path, 2000).unwrap() else {
        panic!("expected text");
    };
    assert!(text.contains("Only real text"));
}
