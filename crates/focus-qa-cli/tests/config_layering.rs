//! Configuration layering tests: project config < CLI flags.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use focus_qa_test_support::SyntheticImageBuilder;
use predicates::prelude::*;

/// Project directory with a config file and one sharp image.
fn project(config: &str) -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join(".focus-qa.toml"), config).unwrap();

    let image = temp_dir.path().join("sharp.png");
    SyntheticImageBuilder::save_png(
        &SyntheticImageBuilder::checkerboard_with_cell_size(128, 128, 16),
        &image,
    );
    (temp_dir, image)
}

#[test]
fn test_project_config_applies_format() {
    let (temp_dir, image) = project(
        r"
[output]
format = 'json'
",
    );

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(temp_dir.path()).arg(&image);

    cmd.assert()
        .code(0)
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_cli_overrides_project_config() {
    let (temp_dir, image) = project(
        r"
[output]
format = 'json'
",
    );

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("--format")
        .arg("jsonl")
        .arg(&image);

    cmd.assert()
        .code(0)
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn test_project_config_applies_thresholds() {
    let (temp_dir, image) = project(
        r"
[focus]
global_threshold = 1e12
",
    );

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(temp_dir.path()).arg(&image);

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("\"is_blurry\":true"));
}

#[test]
fn test_cli_threshold_overrides_config() {
    let (temp_dir, image) = project(
        r"
[focus]
global_threshold = 1e12
",
    );

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("--global-threshold")
        .arg("120")
        .arg(&image);

    cmd.assert().code(0);
}

#[test]
fn test_config_found_in_parent_directory() {
    let (temp_dir, image) = project(
        r"
[output]
details = true
",
    );
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested).unwrap();

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(&nested).arg(&image);

    cmd.assert()
        .code(0)
        .stdout(predicate::str::contains("\"details\""));
}

#[test]
fn test_invalid_config_value_warns() {
    let (temp_dir, image) = project(
        r"
[focus]
fraction_blurry = 3.0
",
    );

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(temp_dir.path()).arg(&image);

    // The warning is printed up front; classifier construction then fails.
    cmd.assert()
        .code(2)
        .stderr(
            predicate::str::contains("warning").and(predicate::str::contains("fraction_blurry")),
        );
}

#[test]
fn test_unparseable_config_is_ignored() {
    let (temp_dir, image) = project("[focus\nglobal_threshold = ");

    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(temp_dir.path()).arg(&image);

    cmd.assert()
        .code(0)
        .stderr(predicate::str::contains("Failed to parse config file"));
}
