//! Integration tests for upload sessions, the sharp archive and cleanup.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Read;
use std::time::Duration;

use focus_qa_adapters::{
    build_sharp_archive, clear_transient, spawn_delayed_cleanup, SharpSetOutput, UploadSession,
    ARCHIVE_NAME,
};
use focus_qa_core::{BatchRunner, FocusClassifier, ImageSource, NoProgress};
use focus_qa_test_support::SyntheticImageBuilder;

fn sharp_png() -> Vec<u8> {
    SyntheticImageBuilder::png_bytes(&SyntheticImageBuilder::checkerboard_with_cell_size(
        256, 256, 16,
    ))
}

fn blurry_png() -> Vec<u8> {
    SyntheticImageBuilder::png_bytes(&SyntheticImageBuilder::uniform_gray(256, 256, 128))
}

fn zip_names(path: &std::path::Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_ingest_uses_unique_stored_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();

    let first = session.ingest("cat.png", &sharp_png()).unwrap();
    let second = session.ingest("cat.png", &sharp_png()).unwrap();

    assert_ne!(first.stored_name, second.stored_name);
    assert!(first.stored_name.ends_with("_cat.png"));
    // 32 hex digits, an underscore, then the original name.
    assert_eq!(first.stored_name.len(), 32 + 1 + "cat.png".len());
    assert!(first.path.starts_with(session.temp_dir()));
    assert!(first.path.is_file());
    assert_eq!(session.original_name(&first.stored_name), Some("cat.png"));
    assert_eq!(session.stored().len(), 2);
}

#[test]
fn test_ingest_strips_directories_from_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();

    let stored = session.ingest("../../escape.png", b"x").unwrap();
    assert_eq!(stored.original_name, "escape.png");
    assert_eq!(stored.path.parent().unwrap(), session.temp_dir());
    assert!(session.ingest("", b"x").is_err());
}

#[test]
fn test_resolve_only_known_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    let stored = session.ingest("a.png", b"x").unwrap();

    assert_eq!(session.resolve(&stored.stored_name), Some(stored.path));
    assert!(session.resolve("../secret").is_none());
    assert!(session.retain_sharp("unknown.png").is_err());
}

#[test]
fn test_session_source_reports_original_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    session.ingest("holiday.png", &sharp_png()).unwrap();
    session.ingest("broken.png", b"garbage").unwrap();

    let images: Vec<_> = session.images().map(Result::unwrap).collect();
    assert_eq!(session.count_hint(), Some(2));
    assert_eq!(images[0].original_name, "holiday.png");
    assert!(images[0].pixels.is_ok());
    assert_eq!(images[1].original_name, "broken.png");
    assert!(images[1].pixels.is_err());
}

#[test]
fn test_sort_flow_archives_sharp_images_by_original_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    session.ingest("sharp.png", &sharp_png()).unwrap();
    session.ingest("flat.png", &blurry_png()).unwrap();
    session.ingest("corrupt.png", b"garbage").unwrap();

    let runner = BatchRunner::new(FocusClassifier::default(), 2);
    let output = SharpSetOutput::new(&session);
    let summary = runner.run(&session, &output, &NoProgress).unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.sharp, 1);
    assert_eq!(summary.blurry, 2);
    assert_eq!(output.retained(), 1);
    assert_eq!(session.sharp_files().unwrap().len(), 1);

    let zip_path = build_sharp_archive(&session).unwrap();
    assert_eq!(zip_path, session.temp_dir().join(ARCHIVE_NAME));
    assert_eq!(zip_names(&zip_path), vec!["sharp.png".to_string()]);

    let file = std::fs::File::open(&zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name("sharp.png").unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes, sharp_png());
}

#[test]
fn test_duplicate_original_names_fall_back_to_stored_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    let a = session.ingest("same.png", &sharp_png()).unwrap();
    let b = session.ingest("same.png", &sharp_png()).unwrap();
    session.retain_sharp(&a.stored_name).unwrap();
    session.retain_sharp(&b.stored_name).unwrap();

    let names = zip_names(&build_sharp_archive(&session).unwrap());
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"same.png".to_string()));
}

#[test]
fn test_clear_transient_keeps_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    let stored = session.ingest("sharp.png", &sharp_png()).unwrap();
    session.retain_sharp(&stored.stored_name).unwrap();
    let zip_path = build_sharp_archive(&session).unwrap();

    let removed = clear_transient(dir.path()).unwrap();
    assert_eq!(removed, 2);
    assert!(zip_path.is_file());
    assert!(!stored.path.exists());
    assert!(session.sharp_files().unwrap().is_empty());
}

#[test]
fn test_clear_transient_removes_uploaded_zips() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    let upload = session.ingest("holiday.zip", b"PK").unwrap();
    let zip_path = build_sharp_archive(&session).unwrap();

    assert_eq!(clear_transient(dir.path()).unwrap(), 1);
    assert!(!upload.path.exists());
    assert!(zip_path.is_file());
}

#[test]
fn test_open_clears_previous_request() {
    let dir = tempfile::tempdir().unwrap();
    let stale = {
        let mut session = UploadSession::open(dir.path()).unwrap();
        session.ingest("old.png", b"x").unwrap()
    };
    assert!(stale.path.exists());

    let session = UploadSession::open(dir.path()).unwrap();
    assert!(!stale.path.exists());
    assert!(session.stored().is_empty());
}

#[test]
fn test_delayed_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = UploadSession::open(dir.path()).unwrap();
    let stored = session.ingest("a.png", b"x").unwrap();

    let handle = spawn_delayed_cleanup(dir.path().to_path_buf(), Duration::from_millis(50));
    assert_eq!(handle.join().unwrap(), 1);
    assert!(!stored.path.exists());
}
