//! Command-line contract tests for the injectcfg binary

use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const DOC: &str = r#"{"targets":[{"app_name":"com.a","enabled":true,"start_up_delay_ms":0,"injected_libraries":[{"path":"/x.so"}]}]}"#;

#[test]
fn test_help_lists_subcommands() {
    assert_cmd::cargo_bin_cmd!("injectcfg")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_resolve_json_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), DOC).unwrap();

    let output = assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.a", "--json", "-m"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["app_name"], "com.a");
    assert_eq!(value["enabled"], true);
    assert_eq!(value["start_up_delay_ms"], 0);
    assert_eq!(value["injected_libraries"], serde_json::json!(["/x.so"]));
    assert!(value.get("child_gating").is_none());
}

#[test]
fn test_resolve_sandboxed_legacy() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("target_packages"), "com.c,500\n").unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.c", "--sandboxed", "-m"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("start_up_delay_ms: 500"))
        .stdout(predicate::str::contains("libgadget.so"));
}

#[test]
fn test_resolve_absent_fails() {
    let dir = tempdir().unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.missing", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration for com.missing"));
}

#[test]
fn test_check_reports_schema_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"targets":[{"app_name":1}]}"#).unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["check", "-q", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("app_name"));
}

#[test]
fn test_check_reports_syntax_offset() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"targets":["#).unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["check", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("offset"));
}

#[test]
fn test_check_lists_targets() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), DOC).unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["check", "-m"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 target(s)"))
        .stdout(predicate::str::contains("com.a:"));
}

#[test]
fn test_serve_rejects_invalid_settings() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("web.toml");
    fs::write(&settings, "port = 0\n").unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["serve", "--settings"])
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid port"));
}

#[test]
fn test_syntax_error_logged_at_error_level() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"targets":["#).unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.a", "-v", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(" E: config is not a valid json file offset"));
}

#[test]
fn test_schema_error_logged_at_error_level() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"targets":{}}"#).unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.a", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            " E: invalid config: expected config targets to be an array",
        ));
}

#[test]
fn test_missing_structured_config_logged_at_debug_only() {
    let dir = tempdir().unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.a", "-v", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(" D: failed to read config"))
        .stderr(predicate::str::contains("config.json"))
        // Probing the legacy registry is quiet
        .stderr(predicate::str::contains("target_packages").not());

    // Without --verbose the miss is not reported at all
    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.a", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config").not());
}

#[test]
fn test_legacy_reads_are_quiet() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("target_packages"), "com.c,5\n").unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.c", "-v", "-m"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("target_packages").not())
        .stderr(predicate::str::contains("injected_libraries").not())
        .stderr(predicate::str::contains(" E: ").not());
}

#[test]
fn test_no_match_never_logged_as_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), DOC).unwrap();

    assert_cmd::cargo_bin_cmd!("injectcfg")
        .args(["resolve", "com.z", "-v", "-m"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(" D: no config entry for app: com.z"))
        .stderr(predicate::str::contains(" E: ").not());
}
