//! Sort and clean command tests.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::time::{Duration, Instant};

use assert_cmd::Command;
use focus_qa_test_support::SyntheticImageBuilder;
use predicates::prelude::*;
use serde_json::Value;

fn inputs() -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::save_png(
        &SyntheticImageBuilder::checkerboard_with_cell_size(256, 256, 16),
        &temp_dir.path().join("keeper.png"),
    );
    SyntheticImageBuilder::save_png(
        &SyntheticImageBuilder::uniform_gray(128, 128, 128),
        &temp_dir.path().join("flat.png"),
    );
    temp_dir
}

fn transient_files(workspace: &std::path::Path) -> usize {
    ["temp", "temp/sharp"]
        .iter()
        .map(|d| workspace.join(d))
        .filter(|d| d.is_dir())
        .flat_map(|d| std::fs::read_dir(d).unwrap().flatten())
        .filter(|e| {
            let path = e.path();
            path.is_file() && path.extension().is_some_and(|x| x != "zip")
        })
        .count()
}

#[test]
fn test_sort_summary_and_archive() {
    let input = inputs();
    let workspace = tempfile::tempdir().unwrap();
    let archive = workspace.path().join("out.zip");

    let output = Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("sort")
        .arg(input.path())
        .arg("--workspace")
        .arg(workspace.path())
        .arg("--archive")
        .arg(&archive)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["sharp"], 1);
    assert_eq!(summary["blurry"], 1);
    assert_eq!(summary["archive"], archive.to_string_lossy().as_ref());

    let images = summary["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    // Inputs are sorted by name, so flat.png comes first.
    assert_eq!(images[0]["original_filename"], "flat.png");
    assert_eq!(images[0]["is_blurry"], true);
    assert_eq!(images[1]["original_filename"], "keeper.png");
    assert_eq!(images[1]["is_blurry"], false);
    assert!(images[1]["filename"]
        .as_str()
        .unwrap()
        .ends_with("_keeper.png"));

    let file = std::fs::File::open(&archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    assert_eq!(zip.len(), 1);
    assert!(zip.by_name("keeper.png").is_ok());

    // Transient uploads are gone, the workspace archive stays.
    assert_eq!(transient_files(workspace.path()), 0);
    assert!(workspace.path().join("temp/sharp_images.zip").is_file());
}

#[test]
fn test_sort_keep_leaves_uploads() {
    let input = inputs();
    let workspace = tempfile::tempdir().unwrap();

    Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("sort")
        .arg(input.path())
        .arg("--workspace")
        .arg(workspace.path())
        .arg("--keep")
        .assert()
        .code(0);

    // Two uploads plus one sharp copy.
    assert_eq!(transient_files(workspace.path()), 3);
}

#[test]
fn test_sort_with_cleanup_delay() {
    let input = inputs();
    let workspace = tempfile::tempdir().unwrap();
    let started = Instant::now();

    Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("sort")
        .arg(input.path())
        .arg("--workspace")
        .arg(workspace.path())
        .arg("--cleanup-delay")
        .arg("1")
        .assert()
        .code(0);

    // Files are cleared before the process exits, not left to a detached thread.
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(transient_files(workspace.path()), 0);
}

#[test]
fn test_sort_help_describes_foreground_cleanup_delay() {
    Command::cargo_bin("focus-qa")
        .unwrap()
        .args(["sort", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("running"));
}

#[test]
fn test_clean_removes_transient_files() {
    let input = inputs();
    let workspace = tempfile::tempdir().unwrap();

    Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("sort")
        .arg(input.path())
        .arg("--workspace")
        .arg(workspace.path())
        .arg("--keep")
        .assert()
        .code(0);

    Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("clean")
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"removed\":3"));

    assert_eq!(transient_files(workspace.path()), 0);
    assert!(workspace.path().join("temp/sharp_images.zip").is_file());
}

#[test]
fn test_clean_missing_workspace() {
    let workspace = tempfile::tempdir().unwrap();

    Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("clean")
        .arg("--workspace")
        .arg(workspace.path().join("never-created"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"removed\":0"));
}
