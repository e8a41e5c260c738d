//! Output format tests.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use focus_qa_test_support::SyntheticImageBuilder;
use serde_json::Value;

fn two_images() -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::save_png(
        &SyntheticImageBuilder::checkerboard_with_cell_size(128, 128, 16),
        &temp_dir.path().join("a.png"),
    );
    SyntheticImageBuilder::save_png(
        &SyntheticImageBuilder::uniform_gray(64, 64, 200),
        &temp_dir.path().join("b.png"),
    );
    temp_dir
}

#[test]
fn test_jsonl_is_default() {
    let temp_dir = two_images();

    let output = Command::cargo_bin("focus-qa")
        .unwrap()
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let parsed: Value = serde_json::from_str(line).unwrap();
        assert!(parsed.is_object());
        assert!(parsed["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(parsed["path"].is_string());
    }
}

#[test]
fn test_json_array_format() {
    let temp_dir = two_images();

    let output = Command::cargo_bin("focus-qa")
        .unwrap()
        .arg("--format")
        .arg("json")
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert_eq!(stdout.lines().count(), 1);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    let array = parsed.as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["original_name"], "a.png");
    assert_eq!(array[1]["original_name"], "b.png");
}

#[test]
fn test_json_pretty_format() {
    let temp_dir = two_images();

    let output = Command::cargo_bin("focus-qa")
        .unwrap()
        .args(["--format", "json", "--pretty"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(stdout.lines().count() > 2);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_empty_json_array() {
    let temp_dir = tempfile::tempdir().unwrap();

    let output = Command::cargo_bin("focus-qa")
        .unwrap()
        .args(["--format", "json"])
        .arg(temp_dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "[]");
}
