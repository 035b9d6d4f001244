// SPDX-License-Identifier: Apache-2.0

//! Exit status of `depsweep scan` against a local backend stub.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::cargo_bin_cmd;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// What the stubbed status endpoint answers.
#[derive(Clone, Copy)]
enum Reply {
    /// A finished scan with a triggered fail-pipeline rule.
    FailPipeline,
    /// A finished scan with only a notification rule.
    Pass,
    /// Still pending on every poll.
    Pending,
}

async fn create_scan() -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({"scanId": "42"})))
}

async fn scan_status(State(reply): State<Reply>) -> (StatusCode, Json<Value>) {
    let details = "https://app.example.com/repository/7/commit/8";
    let rule = |description: &str, action: &str| {
        json!({"ruleDescription": description, "ruleActions": [action], "triggered": true})
    };
    match reply {
        Reply::FailPipeline => (
            StatusCode::OK,
            Json(json!({
                "detailsUrl": details,
                "vulnerabilitiesFound": 3,
                "automationRules": [rule("Block critical", "failPipeline")]
            })),
        ),
        Reply::Pass => (
            StatusCode::OK,
            Json(json!({
                "detailsUrl": details,
                "vulnerabilitiesFound": 1,
                "automationRules": [rule("Warn on medium", "sendEmail")]
            })),
        ),
        Reply::Pending => (StatusCode::ACCEPTED, Json(json!({"progress": 10}))),
    }
}

async fn spawn_backend(reply: Reply) -> String {
    let app = Router::new()
        .route("/api/1.0/scans", post(create_scan))
        .route("/api/1.0/scans/{id}", get(scan_status))
        .with_state(reply);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), r#"{"name":"shop"}"#).unwrap();
    fs::write(dir.path().join("yarn.lock"), "# yarn lockfile v1\n").unwrap();
    dir
}

fn scan(base_url: &str, config_home: &Path, root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("depsweep");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("DEPSWEEP_API__BASE_URL", base_url)
        .env("DEPSWEEP_API__POLL_INTERVAL_SECONDS", "0")
        .env("DEPSWEEP_API__POLL_TIMEOUT_SECONDS", "0")
        .env("DEPSWEEP_TOKEN", "t0ken")
        .env_remove("DEPSWEEP_EXCLUSION")
        .env_remove("GITHUB_ACTIONS")
        .env_remove("GITLAB_CI")
        .env_remove("RUST_LOG")
        .args(["scan", "-r", "acme/shop", "-c", "abc123"])
        .arg(root);
    cmd
}

/// Runs the command off the runtime so the stub keeps serving.
async fn run(mut cmd: Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fail_pipeline_rule_exits_one_without_error_line() {
    let base_url = spawn_backend(Reply::FailPipeline).await;
    let project = project();
    let home = TempDir::new().unwrap();

    let output = run(scan(&base_url, home.path(), project.path())).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stdout.contains("Block critical"));
    assert!(!stderr.contains("Error:"), "stderr: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_passing_rules_exit_zero() {
    let base_url = spawn_backend(Reply::Pass).await;
    let project = project();
    let home = TempDir::new().unwrap();

    let output = run(scan(&base_url, home.path(), project.path())).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Warn on medium"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_polling_timeout_with_pass_on_timeout_exits_zero() {
    let base_url = spawn_backend(Reply::Pending).await;
    let project = project();
    let home = TempDir::new().unwrap();

    let mut cmd = scan(&base_url, home.path(), project.path());
    cmd.arg("--pass-on-timeout");
    let output = run(cmd).await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("polling timeout"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_polling_timeout_without_pass_on_timeout_prints_error() {
    let base_url = spawn_backend(Reply::Pending).await;
    let project = project();
    let home = TempDir::new().unwrap();

    let output = run(scan(&base_url, home.path(), project.path())).await;

    output
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("--pass-on-timeout"));
}
