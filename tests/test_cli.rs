use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn reference_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [actionPolicy]
        none = "run"
        low = "run"
        medium = "warn"
        high = "ask"
        critical = "ask"
        "#
    )
    .unwrap();
    file
}

#[test]
fn safe_command_exits_zero() {
    let config = reference_config();
    Command::cargo_bin("flare")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "ls -la"])
        .assert()
        .success();
}

#[test]
fn critical_command_exits_with_code_2() {
    let config = reference_config();
    Command::cargo_bin("flare")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "rm -rf /"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Critical"));
}

#[test]
fn high_command_exits_with_code_1() {
    let config = reference_config();
    Command::cargo_bin("flare")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "git push --force origin feature-branch"])
        .assert()
        .code(1);
}

#[test]
fn json_format_emits_parseable_json() {
    let config = reference_config();
    let output = Command::cargo_bin("flare")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "--format", "json", "rm -rf /"])
        .output()
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(parsed["risk_level"], "critical");
}

#[test]
fn missing_config_file_exits_with_error() {
    Command::cargo_bin("flare")
        .unwrap()
        .args(["--config", "/nonexistent/flare.toml", "ls -la"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn custom_cwd_flag_is_accepted() {
    let config = reference_config();
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("flare")
        .unwrap()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "--cwd",
            dir.path().to_str().unwrap(),
            "ls -la",
        ])
        .assert()
        .success();
}
