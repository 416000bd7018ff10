//! Integration tests for `ticker stream` and `ticker fetch` against a mock endpoint.

use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn ticker_body() -> serde_json::Value {
    json!({
        "tickers": [
            {"text": "Hallo Welt", "short": "hw"},
            {"text": "Mit Link", "short": "ml", "link": "https://example.com/ml"}
        ]
    })
}

async fn mock_ticker(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ticker"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_stream_once_prints_first_ticker() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = mock_ticker(ResponseTemplate::new(200).set_body_json(ticker_body())).await;
    let url = format!("{}/ticker", server.uri());

    cargo_bin_cmd!("ticker")
        .env("TICKER_HOME", home.path())
        .args(["stream", "--once", "--fade", "0", "--url", &url])
        .timeout(Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ Hallo Welt +++ (hw)"));
}

#[tokio::test]
async fn test_stream_events_prints_notifications() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = mock_ticker(ResponseTemplate::new(200).set_body_json(ticker_body())).await;
    let url = format!("{}/ticker", server.uri());

    cargo_bin_cmd!("ticker")
        .env("TICKER_HOME", home.path())
        .args(["stream", "--once", "--events", "--fade", "0", "--url", &url])
        .args(["--format", "%s / %s"])
        .timeout(Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"starting""#))
        .stdout(predicate::str::contains(r#""event":"updated""#))
        .stdout(predicate::str::contains("Hallo Welt / hw"));
}

#[tokio::test]
async fn test_stream_answers_commands_and_reports_unknown_methods() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    // Delay the batch so stdin is handled before the first ticker ends the run.
    let server = mock_ticker(
        ResponseTemplate::new(200)
            .set_body_json(ticker_body())
            .set_delay(Duration::from_millis(800)),
    )
    .await;
    let url = format!("{}/ticker", server.uri());

    cargo_bin_cmd!("ticker")
        .env("TICKER_HOME", home.path())
        .args(["stream", "--once", "--fade", "0", "--interval", "3000", "--url", &url])
        .write_stdin("getSetting interval\nisRunning\n_loadTickers\n")
        .timeout(Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("3000"))
        .stdout(predicate::str::contains("true"))
        .stderr(predicate::str::contains(
            "There is no such method \"_loadTickers\"",
        ));
}

#[tokio::test]
async fn test_fetch_prints_batch_as_json() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = mock_ticker(ResponseTemplate::new(200).set_body_json(ticker_body())).await;
    let url = format!("{}/ticker", server.uri());

    let output = cargo_bin_cmd!("ticker")
        .env("TICKER_HOME", home.path())
        .args(["fetch", "--url", &url])
        .timeout(Duration::from_secs(20))
        .output()
        .unwrap();

    assert!(output.status.success());
    let batch: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(batch, ticker_body());
}

#[tokio::test]
async fn test_fetch_fails_on_malformed_payload() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = mock_ticker(ResponseTemplate::new(200).set_body_string("<html>nope</html>")).await;
    let url = format!("{}/ticker", server.uri());

    cargo_bin_cmd!("ticker")
        .env("TICKER_HOME", home.path())
        .args(["fetch", "--url", &url])
        .timeout(Duration::from_secs(20))
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch tickers from"));
}
