use std::path::Path;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stockdesk(session_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stockdesk").unwrap();
    cmd.env("STOCKDESK_SESSION_FILE", session_file)
        .env("STOCKDESK_LOGOUT_REDIRECT_MS", "10")
        .env_remove("STOCKDESK_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_session(session_file: &Path, token: &str) {
    let record = json!({"user": {"token": token, "name": "Asha", "role": "admin"}});
    std::fs::write(session_file, record.to_string()).unwrap();
}

async fn run(mut cmd: Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("stockdesk").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inventory console client for the stockdesk API"));
}

#[test]
fn test_cli_stock_list_help() {
    let mut cmd = Command::cargo_bin("stockdesk").unwrap();
    cmd.args(["stock", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--godown").and(predicate::str::contains("--rows")));
}

#[test]
fn test_whoami_without_session() {
    let dir = tempfile::tempdir().unwrap();
    stockdesk(&dir.path().join("session.json"))
        .arg("whoami")
        .assert()
        .success()
        .stderr(predicate::str::contains("Not signed in."));
}

#[test]
fn test_whoami_redacts_token() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    write_session(&session, "secret-token");

    stockdesk(&session)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Asha").and(predicate::str::contains("secret-token").not()));
}

#[test]
fn test_rejects_unsupported_page_size() {
    let dir = tempfile::tempdir().unwrap();
    stockdesk(&dir.path().join("session.json"))
        .args(["users", "list", "--rows", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rows must be one of"));
}

#[tokio::test]
async fn test_users_list_prints_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/retrieve"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "status": "success",
            "message": "Users retrieved",
            "data": [
                {"id": 2, "name": "Ravi", "email": "ravi@example.com", "role": "staff", "username": "ravi"},
                {"id": 1, "name": "Asha", "email": "asha@example.com", "role": "admin", "username": "asha"}
            ],
            "pagination": {"limit": 5, "offset": 0, "total": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    write_session(&session, "tok-1");
    let mut cmd = stockdesk(&session);
    cmd.args(["--api-url", &server.uri(), "users", "list"]);

    let output = run(cmd).await;
    output.assert().success().stdout(
        predicate::str::contains("\"total\": 2")
            .and(predicate::str::contains("\"order_by\": \"name\""))
            .and(predicate::str::is_match("(?s)Asha.*Ravi").unwrap()),
    );
}

#[tokio::test]
async fn test_expired_session_is_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/product_stock/retrieve"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    write_session(&session, "stale");
    let mut cmd = stockdesk(&session);
    cmd.args(["--api-url", &server.uri(), "stock", "list"]);

    let output = run(cmd).await;
    output.assert().failure().stderr(
        predicate::str::contains("Your session has expired. Please login again.")
            .and(predicate::str::contains("stockdesk login")),
    );

    let remaining = std::fs::read_to_string(&session).unwrap_or_default();
    assert!(!remaining.contains("stale"));
}
