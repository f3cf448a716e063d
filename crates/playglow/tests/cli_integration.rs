//! Integration tests for the `playglow` binary.
//!
//! These tests exercise the CLI via `assert_cmd`, verifying that basic
//! subcommands (help, version, config, swatch) produce expected output.
//! Device- and network-requiring commands are tested via `--help` only.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("playglow")
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("playglow"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_unknown_subcommand_fails() {
    cli().arg("frobnicate").assert().failure();
}

// ── config ──

#[test]
fn cli_config_succeeds() {
    cli().arg("config").assert().success();
}

#[test]
fn cli_config_json_produces_valid_json() {
    let output = cli()
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(
        json["settings"].is_object(),
        "JSON output should contain 'settings' object"
    );
    assert!(
        json["config_file"].is_string() || json["config_file"].is_null(),
        "config_file should be string or null"
    );
}

#[test]
fn cli_config_reads_custom_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playglow.toml");
    std::fs::write(&path, "target_device = \"Test Speaker\"\n").unwrap();

    cli()
        .args(["--config", path.to_str().unwrap(), "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Speaker"));
}

#[test]
fn cli_config_reports_problems_for_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playglow.toml");
    std::fs::write(
        &path,
        "target_device = \"Den\"\ncluster_count = 0\ntransition_steps = 0\n",
    )
    .unwrap();

    cli()
        .args(["--config", path.to_str().unwrap(), "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Problems:"))
        .stdout(predicate::str::contains("Cluster count"));
}

// ── swatch ──

fn write_png(path: &std::path::Path, r: u8, g: u8, b: u8) {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([r, g, b]));
    img.save(path).unwrap();
}

#[test]
fn cli_swatch_prints_dominant_color() {
    let dir = tempfile::tempdir().unwrap();
    let art = dir.path().join("cover.png");
    write_png(&art, 200, 40, 10);

    cli()
        .args(["swatch", art.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("#C8280A"));
}

#[test]
fn cli_swatch_json_includes_clusters() {
    let dir = tempfile::tempdir().unwrap();
    let art = dir.path().join("cover.png");
    write_png(&art, 0, 0, 255);

    let output = cli()
        .args(["--json", "swatch", art.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("swatch --json should produce valid JSON");
    assert_eq!(json["color"], "#0000FF");
    assert!(json["clusters"].is_array());
}

#[test]
fn cli_swatch_missing_file_fails() {
    cli()
        .args(["swatch", "/no/such/image.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ── Subcommand help (device/network commands) ──

#[test]
fn cli_sync_help_succeeds() {
    cli()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("playback"));
}

#[test]
fn cli_color_help_succeeds() {
    cli()
        .args(["color", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fade"));
}

#[test]
fn cli_off_help_succeeds() {
    cli().args(["off", "--help"]).assert().success();
}

#[test]
fn cli_status_help_succeeds() {
    cli().args(["status", "--help"]).assert().success();
}

#[test]
fn cli_color_rejects_bad_color() {
    // Color parsing fails before any device is touched.
    cli()
        .args(["color", "not-a-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid color"));
}
