// CLI integration tests for `coding probe`.
use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_coding");
    Command::new(exe)
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

fn parse_json_line(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().next().expect("json line");
    parse_json(line)
}

fn probe_stdin(args: &[&str], input: &str) -> Output {
    let mut child = cmd()
        .arg("probe")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    let mut stdin = child.stdin.take().expect("stdin");
    // The process may exit before reading (usage errors); a broken pipe is fine.
    let _ = stdin.write_all(input.as_bytes());
    drop(stdin);
    child.wait_with_output().expect("output")
}

fn error_kind(output: &Output) -> String {
    let err = parse_json_line(&output.stderr);
    err["error"]["kind"].as_str().expect("kind").to_string()
}

#[test]
fn keyed_uint_is_echoed() {
    let out = probe_stdin(
        &["--access", "key", "--key", "value", "--as", "uint"],
        r#"{"value":123}"#,
    );
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "{\"value\":123}\n");
}

#[test]
fn optional_null_element_prints_null() {
    let out = probe_stdin(
        &["--access", "unkeyed", "--as", "string", "--optional"],
        "[null]",
    );
    assert!(out.status.success());
    let json = parse_json_line(&out.stdout);
    assert_eq!(json, serde_json::json!({"value": null}));
}

#[test]
fn default_fills_missing_key_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("doc.json");
    std::fs::write(&path, r#"{"host":"localhost"}"#).expect("write");

    let out = cmd()
        .args([
            "probe",
            "-f",
            path.to_str().unwrap(),
            "--access",
            "key",
            "--key",
            "port",
            "--as",
            "uint",
            "--optional",
            "--default",
            "8080",
        ])
        .output()
        .expect("probe");
    assert!(out.status.success());
    assert_eq!(parse_json_line(&out.stdout)["value"], 8080);
}

#[test]
fn structured_values_keep_field_order() {
    let out = probe_stdin(&[], r#"{"b":1,"a":[true,null]}"#);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "{\"value\":{\"b\":1,\"a\":[true,null]}}\n"
    );
}

#[test]
fn pretty_output_is_indented() {
    let out = probe_stdin(&["--pretty", "--as", "bool"], "true");
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "{\n  \"value\": true\n}\n"
    );
}

#[test]
fn missing_key_reports_kind_and_path() {
    let out = probe_stdin(&["--access", "key", "--key", "value"], "{}");
    assert_eq!(out.status.code().unwrap(), 5);
    let err = parse_json_line(&out.stderr);
    assert_eq!(err["error"]["kind"], "KeyNotFound");
    assert_eq!(err["error"]["path"], "$");
    assert_eq!(err["error"]["message"], "key `value` not found");
}

#[test]
fn type_mismatch_and_null_exit_codes() {
    let out = probe_stdin(&["--as", "int"], r#""seven""#);
    assert_eq!(out.status.code().unwrap(), 4);
    assert_eq!(error_kind(&out), "TypeMismatch");

    let out = probe_stdin(&["--as", "int"], "null");
    assert_eq!(out.status.code().unwrap(), 7);
    assert_eq!(error_kind(&out), "ValueNull");

    let out = probe_stdin(&["--access", "unkeyed", "--as", "int"], "[]");
    assert_eq!(out.status.code().unwrap(), 6);
    assert_eq!(error_kind(&out), "ContainerExhausted");
}

#[test]
fn invalid_document_is_parse_error() {
    let out = probe_stdin(&[], r#"{"value":"#);
    assert_eq!(out.status.code().unwrap(), 3);
    let err = parse_json_line(&out.stderr);
    assert_eq!(err["error"]["kind"], "Parse");
    assert!(
        err["error"]["hint"]
            .as_str()
            .expect("hint")
            .contains("parse category: eof")
    );
}

#[test]
fn missing_input_file_is_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("absent.json");
    let out = cmd()
        .args(["probe", "-f", path.to_str().unwrap()])
        .output()
        .expect("probe");
    assert_eq!(out.status.code().unwrap(), 10);
    assert_eq!(error_kind(&out), "Io");
}

#[test]
fn usage_exit_code() {
    let out = cmd()
        .args(["probe", "--default", "1"])
        .output()
        .expect("probe");
    assert_eq!(out.status.code().unwrap(), 2);
    assert_eq!(error_kind(&out), "Usage");

    let out = cmd()
        .args(["probe", "--access", "key"])
        .output()
        .expect("probe");
    assert_eq!(out.status.code().unwrap(), 2);

    let out = cmd()
        .args(["probe", "--key", "value"])
        .output()
        .expect("probe");
    assert_eq!(out.status.code().unwrap(), 2);

    let out = cmd()
        .args(["probe", "--access", "sideways"])
        .output()
        .expect("probe");
    assert_eq!(out.status.code().unwrap(), 2);
    assert_eq!(error_kind(&out), "Usage");
}

#[test]
fn invalid_default_is_usage_error() {
    let out = probe_stdin(
        &["--as", "uint", "--optional", "--default", "\"x\""],
        "null",
    );
    assert_eq!(out.status.code().unwrap(), 2);
    assert_eq!(error_kind(&out), "Usage");
}
