//! End-to-end runs of the `gcl-link` binary against a stand-in gcl.

#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Script that identifies as gcl and echoes its input back.
fn fake_gcl(dir: &Path, help: &str) -> PathBuf {
    let path = dir.join("gcl");
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"--help\" ]; then\n  echo '{help}'\n  exit 0\nfi\nexec cat\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn gcl_link(settings: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gcl-link"))
        .arg("--settings")
        .arg(settings)
        .arg("--timeout-ms")
        .arg("10000")
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut input = child.stdin.take().unwrap();
        if let Some(text) = stdin {
            input.write_all(text.as_bytes()).unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn set_path_then_path_prints_stored_value() {
    let dir = TempDir::new().unwrap();
    let gcl = fake_gcl(dir.path(), "GCL stand-in");
    let settings = dir.path().join("settings.json");

    let out = gcl_link(&settings, &["set-path", gcl.to_str().unwrap()], None);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(settings.exists());

    let out = gcl_link(&settings, &["path"], None);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), gcl.to_str().unwrap());
}

#[test]
fn set_path_rejects_impostor_without_writing() {
    let dir = TempDir::new().unwrap();
    let impostor = fake_gcl(dir.path(), "usage: something else");
    let settings = dir.path().join("settings.json");

    let out = gcl_link(&settings, &["set-path", impostor.to_str().unwrap()], None);
    assert_eq!(out.status.code(), Some(65));
    assert!(!settings.exists());
}

#[test]
fn validate_explicit_path() {
    let dir = TempDir::new().unwrap();
    let gcl = fake_gcl(dir.path(), "GCL stand-in");
    let settings = dir.path().join("settings.json");

    let out = gcl_link(&settings, &["validate", gcl.to_str().unwrap()], None);
    assert!(out.status.success());
    assert!(stdout(&out).contains("ok"));
}

#[test]
fn send_prints_response() {
    let dir = TempDir::new().unwrap();
    let gcl = fake_gcl(dir.path(), "GCL stand-in");
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, format!("{{\"gcl_path\": \"{}\"}}", gcl.display())).unwrap();

    let out = gcl_link(&settings, &["send", r#"{"tag":"Load","contents":[1]}"#], None);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let response: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(response, serde_json::json!({"tag": "Load", "contents": [1]}));
}

#[test]
fn send_reads_request_from_stdin() {
    let dir = TempDir::new().unwrap();
    let gcl = fake_gcl(dir.path(), "GCL stand-in");
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, format!("{{\"gcl_path\": \"{}\"}}", gcl.display())).unwrap();

    let out = gcl_link(&settings, &["send"], Some("[true, null]\n"));
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "[true,null]");
}

#[test]
fn send_rejects_invalid_json_before_connecting() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, r#"{"gcl_path": "/definitely/not/here/gcl"}"#).unwrap();

    let out = gcl_link(&settings, &["send", "{not json"], None);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn session_answers_each_line() {
    let dir = TempDir::new().unwrap();
    let gcl = fake_gcl(dir.path(), "GCL stand-in");
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, format!("{{\"gcl_path\": \"{}\"}}", gcl.display())).unwrap();

    let out = gcl_link(&settings, &["session"], Some("{\"n\":1}\n\n{\"n\":2}\n"));
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let lines: Vec<_> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(lines, vec![r#"{"n":1}"#, r#"{"n":2}"#]);
}
