// CLI integration tests for `compare` and error envelopes.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_batchsort");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

#[test]
fn compare_reads_file_and_reports_both_modes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("batch.json");
    std::fs::write(&path, r#"{"to_sort":[[9,8,7],[1],[-5,5,0,0]]}"#).expect("write");

    let output = cmd()
        .args(["compare", path.to_str().unwrap(), "--rounds", "2"])
        .output()
        .expect("compare");
    assert!(output.status.success());
    let report = parse_json(&output.stdout);
    assert_eq!(report["arrays"], 3);
    assert_eq!(report["elements"], 8);
    assert_eq!(report["rounds"], 2);
    assert_eq!(report["agree"], true);
    assert!(report["single"]["min_ns"].is_u64());
    assert!(report["concurrent"]["min_ns"].is_u64());
}

#[test]
fn compare_reads_stdin() {
    let mut child = cmd()
        .arg("compare")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"{"to_sort":[]}"#)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let report = parse_json(&output.stdout);
    assert_eq!(report["arrays"], 0);
    assert_eq!(report["agree"], true);
}

#[test]
fn malformed_input_exits_with_usage_code_and_json_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("bad.json");
    std::fs::write(&path, "{\"to_sort\": [[1,").expect("write");

    let output = cmd()
        .args(["compare", path.to_str().unwrap()])
        .output()
        .expect("compare");
    assert_eq!(output.status.code(), Some(2));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
    assert!(err["error"]["message"].as_str().unwrap().contains("EOF"));
}

#[test]
fn missing_input_file_exits_with_io_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = cmd()
        .args(["compare", temp.path().join("nope.json").to_str().unwrap()])
        .output()
        .expect("compare");
    assert_eq!(output.status.code(), Some(3));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Io");
}

#[test]
fn invalid_bind_is_usage_error() {
    let output = cmd()
        .args(["serve", "--bind", "not-an-address"])
        .output()
        .expect("serve");
    assert_eq!(output.status.code(), Some(2));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["message"], "invalid bind address");
}
