#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = r#"
[auth]
client_id = "consumer-key"
client_secret = "consumer-secret"
"#;

#[test]
fn test_games_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.args(["games", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--available"))
        .stdout(predicate::str::contains("--mine"));
}

#[test]
fn test_leagues_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.args(["leagues", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--keys"));
}

#[test]
fn test_auth_exchange_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.args(["auth", "exchange", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--code"));
}

#[test]
fn test_auth_exchange_missing_code() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.args(["auth", "exchange"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--code"));
}

#[test]
fn test_leagues_available_requires_mine() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.args(["leagues", "--available", "--keys", "357.l.86753"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mine"));
}

#[test]
fn test_leagues_without_selection() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.env_remove("YFANTASY_ACCESS_TOKEN")
        .arg("--dir")
        .arg(dir.path())
        .arg("leagues")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "either --mine or --keys must be specified",
        ));
}

#[test]
fn test_user_without_token() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.env_remove("YFANTASY_ACCESS_TOKEN")
        .arg("--dir")
        .arg(dir.path())
        .arg("user")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no access token available"));
}

#[test]
fn test_auth_url_without_credentials() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["auth", "url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("auth.client_id"));
}

#[test]
fn test_auth_url_prints_authorize_url() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), CONFIG).unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["auth", "url"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://api.login.yahoo.com/oauth2/request_auth",
        ))
        .stdout(predicate::str::contains("client_id=consumer-key"))
        .stdout(predicate::str::contains("redirect_uri=oob"));
}

#[tokio::test]
async fn test_user_prints_guid() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fantasy/v2/users;use_login=1"))
        .and(header("authorization", "Bearer env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(include_str!(
            "../../../fixtures/fantasy/active_user.xml"
        )))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        format!("[api]\nbase_url = \"{}/fantasy/v2/\"\n", server.uri()),
    )
    .unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("yfantasy");
    cmd.env("YFANTASY_ACCESS_TOKEN", "env-token")
        .arg("--dir")
        .arg(dir.path())
        .arg("user")
        .assert()
        .success()
        .stdout(predicate::str::contains("JT4FACLQZI2OCE"));
}
