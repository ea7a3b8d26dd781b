//! Integration tests for the concord CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write the fixture files for "The cat sat" into `dir`, returning the
/// paths of (index, tokens, text).
fn write_fixture(dir: &Path, index_lines: &str) -> (String, String, String) {
    let tokens = dir.join("tokens.txt");
    fs::write(&tokens, "The\n \ncat\nsat\n").unwrap();

    let text = dir.join("text.cod");
    let mut bytes = Vec::new();
    for id in [0u32, 1, 2, 1, 3] {
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    fs::write(&text, bytes).unwrap();

    let index = dir.join("concord.ind");
    fs::write(&index, index_lines).unwrap();

    (
        index.display().to_string(),
        tokens.display().to_string(),
        text.display().to_string(),
    )
}

#[test]
fn text_concordance_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (index, tokens, text) = write_fixture(dir.path(), "2.0 2.2\n");

    let mut cmd = Command::cargo_bin("concord").unwrap();
    cmd.arg(&index)
        .args(["--tokens", tokens.as_str()])
        .args(["--text", text.as_str()])
        .args(["-m", "text", "-l", "4", "-r", "7", "-e", "utf8", "--quiet"]);
    cmd.assert().success();

    let output = fs::read_to_string(dir.path().join("concord.txt")).unwrap();
    assert_eq!(output, "The \tcat\t sat\n");
    assert!(!dir.path().join("concord_.txt").exists());
}

#[test]
fn html_concordance_lands_in_the_working_directory() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let out_dir = out.path().display().to_string();
    let (index, tokens, text) = write_fixture(dir.path(), "2.0 2.2\n");

    let mut cmd = Command::cargo_bin("concord").unwrap();
    cmd.arg(&index)
        .args(["--tokens", tokens.as_str()])
        .args(["--text", text.as_str()])
        .args(["-m", "html", "-l", "4", "-r", "7", "--quiet"])
        .args(["-w", out_dir.as_str()])
        .args(["--font", "Arial", "--fontsize", "12"]);
    cmd.assert().success();

    let html = fs::read_to_string(out.path().join("concord.html")).unwrap();
    assert!(html.contains("<title>1 match</title>"));
    assert!(html.contains("font-family: 'Arial'; font-size: 12"));
    assert!(html.contains("<a href=\"4 7 1\">cat</a>"));
}

#[test]
fn merge_mode_rewrites_the_text() {
    let dir = TempDir::new().unwrap();
    let tokens = dir.path().join("tokens.txt");
    fs::write(&tokens, "Hi\n \nworld\n").unwrap();
    let text = dir.path().join("text.cod");
    let mut bytes = Vec::new();
    for id in [0u32, 1, 2] {
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    fs::write(&text, bytes).unwrap();
    let index = dir.path().join("concord.ind");
    fs::write(&index, "0.0 0.1 Bye\n").unwrap();
    let out = dir.path().join("rewritten.txt");
    let out_arg = out.display().to_string();

    let mut cmd = Command::cargo_bin("concord").unwrap();
    cmd.arg(index.display().to_string())
        .args(["--tokens", tokens.display().to_string().as_str()])
        .args(["--text", text.display().to_string().as_str()])
        .args(["-m", "merge", "-e", "utf8", "--quiet"])
        .args(["-o", out_arg.as_str()]);
    cmd.assert().success();

    assert_eq!(fs::read_to_string(&out).unwrap(), "Bye world");
}

#[test]
fn merge_without_output_fails() {
    let dir = TempDir::new().unwrap();
    let (index, tokens, text) = write_fixture(dir.path(), "2.0 2.2\n");

    let mut cmd = Command::cargo_bin("concord").unwrap();
    cmd.arg(&index)
        .args(["--tokens", tokens.as_str()])
        .args(["--text", text.as_str()])
        .args(["-m", "merge", "--quiet"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("requires --output"));
}

#[test]
fn missing_token_file_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let (index, _, text) = write_fixture(dir.path(), "2.0 2.2\n");
    let missing = dir.path().join("missing.txt").display().to_string();

    let mut cmd = Command::cargo_bin("concord").unwrap();
    cmd.arg(&index)
        .args(["--tokens", missing.as_str()])
        .args(["--text", text.as_str()])
        .args(["-m", "text", "--quiet"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load vocabulary"));
}

#[test]
fn config_file_supplies_context_defaults() {
    let dir = TempDir::new().unwrap();
    let (index, tokens, text) = write_fixture(dir.path(), "2.0 2.2\n");
    let config = dir.path().join("concord.toml");
    fs::write(
        &config,
        "[context]\nleft = 4\nright = 7\nleft_until_eos = false\nright_until_eos = false\n",
    )
    .unwrap();
    let config_arg = config.display().to_string();

    let mut cmd = Command::cargo_bin("concord").unwrap();
    cmd.arg(&index)
        .args(["--tokens", tokens.as_str()])
        .args(["--text", text.as_str()])
        .args(["-m", "text", "-e", "utf8", "--quiet"])
        .args(["-c", config_arg.as_str()]);
    cmd.assert().success();

    let output = fs::read_to_string(dir.path().join("concord.txt")).unwrap();
    assert_eq!(output, "The \tcat\t sat\n");
}
