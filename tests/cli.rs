// End-to-end runs of the vuextcg binary against the bundled fixtures.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const EXPECTED_FIXTURE: &str = include_str!("../fixtures/store.expected.js");

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn vuextcg(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vuextcg"))
        .args(args)
        .env_remove("VUEXTCG_LOG")
        .output()
        .expect("failed to run vuextcg")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("fixture paths are UTF-8")
}

#[test]
fn missing_definition_argument_fails_with_usage() {
    let output = vuextcg(&[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

#[test]
fn writes_module_to_stdout() {
    let output = vuextcg(&[path_arg(&fixture("store.js"))]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), EXPECTED_FIXTURE);
}

#[test]
fn writes_module_to_output_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("types.js");

    let output = vuextcg(&[path_arg(&fixture("store-factory.js")), path_arg(&target)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(&target).unwrap(), EXPECTED_FIXTURE);
}

#[test]
fn relative_definition_resolves_from_working_directory() {
    let output = Command::new(env!("CARGO_BIN_EXE_vuextcg"))
        .arg("store.json")
        .current_dir(fixture(""))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), EXPECTED_FIXTURE);
}

#[test]
fn custom_header() {
    let output = vuextcg(&[path_arg(&fixture("store.js")), "--header", "// types"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("// types\nexport const getters = {\n"));
}

#[test]
fn json_catalogue() {
    let output = vuextcg(&[path_arg(&fixture("split/index.js")), "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let catalogue: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let actions = catalogue["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 4);
    assert_eq!(actions[0]["constant"], "REPORT_SOME");
    assert_eq!(actions[0]["depth"], 0);
    assert_eq!(actions[3]["path"], "account/save");
}

#[test]
fn malformed_definition_reports_code_and_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let definition = dir.path().join("store.js");
    fs::write(&definition, "export const getters = {}\n").unwrap();

    let output = vuextcg(&[path_arg(&definition)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("VTG004"), "stderr: {stderr}");
    assert!(stderr.contains("no default export"), "stderr: {stderr}");
}

#[test]
fn missing_definition_file() {
    let dir = TempDir::new().unwrap();
    let output = vuextcg(&[path_arg(&dir.path().join("nope.js"))]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("VTG001"));
}
