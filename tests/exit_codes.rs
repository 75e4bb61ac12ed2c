//! Tests for process exit codes and fatal error output of the binary.

use std::process::{Command, Output};

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_http_loadgen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run http_loadgen binary")
}

#[test]
fn test_missing_url_exits_nonzero() {
    let output = run_binary(&["--client=2"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(" ERROR Not url provided"), "stderr: {stderr}");
}

#[test]
fn test_malformed_proxy_exits_nonzero() {
    let output = run_binary(&["--proxy=notahost", "--url=http://127.0.0.1:1/ok"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "stderr: {stderr}");
    assert!(stderr.contains("notahost"), "stderr: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Succeeded"), "No run should start: {stdout}");
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let output = run_binary(&["--url=http://127.0.0.1:1/", "--nope"]);
    assert_eq!(output.status.code(), Some(2));
}

#[tokio::test]
async fn test_bounded_run_exits_zero() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(10)
        .mount(&mock_server)
        .await;

    let url = format!("--url={}/ok", mock_server.uri());
    let output = tokio::task::spawn_blocking(move || {
        run_binary(&[
            "--client=2",
            "--qps=5",
            "--number=10",
            "--http2-prior-knowledge=false",
            &url,
        ])
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" INFO  Succeeded: "), "stdout: {stdout}");
    assert!(stdout.contains("Failed: "), "stdout: {stdout}");
    assert!(
        stdout.contains("Total: 10 requests (10 succeeded, 0 failed)"),
        "stdout: {stdout}"
    );
}

async fn bounded_run_with(extra: &'static [&'static str]) -> Output {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let url = format!("--url={}/ok", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let mut args = vec![
            "--qps=20",
            "--number=2",
            "--http2-prior-knowledge=false",
            url.as_str(),
        ];
        args.extend_from_slice(extra);
        run_binary(&args)
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_log_level_flag_controls_output() {
    let output = bounded_run_with(&["--log-level=error"]).await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Succeeded: "), "stdout: {stdout}");
    assert!(!stdout.contains("Total: "), "stdout: {stdout}");
}

#[tokio::test]
async fn test_log_format_flag_emits_json_lines() {
    let output = bounded_run_with(&["--log-format=json"]).await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert!(!lines.is_empty());
    for line in lines {
        let value: serde_json::Value =
            serde_json::from_str(line).unwrap_or_else(|e| panic!("Not JSON ({e}): {line}"));
        assert!(value.get("level").is_some());
        assert!(value.get("msg").is_some());
    }
    assert!(stdout.contains("Total: 2 requests (2 succeeded, 0 failed)"), "stdout: {stdout}");
}
