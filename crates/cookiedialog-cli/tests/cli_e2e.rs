#![allow(deprecated)]
//! CLI contract: exit codes and stored state across separate invocations.
//! Goal: assert behavior without brittle full-output matching.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENV_VARS: &[&str] = &[
    "COOKIEDIALOG_STORE",
    "COOKIEDIALOG_CONFIG",
    "COOKIEDIALOG_STORAGE_KEY",
    "COOKIEDIALOG_ENABLE_LOCATION",
    "COOKIEDIALOG_FORCE_SHOW",
    "COOKIEDIALOG_EXPIRY_DAYS",
    "COOKIEDIALOG_LOCATION_ENDPOINT",
    "COOKIEDIALOG_LOCATION_TIMEOUT",
];

fn cookiedialog(store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cookiedialog").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd.arg("--store").arg(store);
    cmd
}

fn status_json(store: &Path) -> Value {
    let output = cookiedialog(store)
        .args(["status", "--json"])
        .output()
        .unwrap();
    serde_json::from_slice(&output.stdout).expect("status --json should print JSON")
}

fn store_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("storage.json")
}

#[test]
fn status_without_consent_exits_1() {
    let dir = TempDir::new().unwrap();
    cookiedialog(&store_in(&dir))
        .arg("status")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("no consent on file"));
}

#[test]
fn start_on_fresh_store_prompts() {
    let dir = TempDir::new().unwrap();
    cookiedialog(&store_in(&dir))
        .args(["start", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"prompted\""))
        .stderr(predicate::str::contains("Cookie consent required"));
    assert!(!store_in(&dir).exists());
}

#[test]
fn accept_persists_all_categories() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    cookiedialog(&store).arg("accept").assert().success();

    let record = status_json(&store);
    assert_eq!(record["reason"], "user_accept");
    assert_eq!(record["version"], "1.0.0");
    assert_eq!(record["categories"]["necessary"], true);
    assert_eq!(record["categories"]["analytics"], true);
    assert_eq!(record["categories"]["marketing"], true);

    cookiedialog(&store)
        .args(["start", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("existing-consent"));
}

#[test]
fn status_text_shows_key_and_expiry() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    cookiedialog(&store)
        .env("COOKIEDIALOG_STORAGE_KEY", "site_consent")
        .env("COOKIEDIALOG_EXPIRY_DAYS", "30")
        .arg("accept")
        .assert()
        .success();

    let record = status_json(&store);
    assert!(record.is_null(), "default key holds nothing");

    let output = cookiedialog(&store)
        .env("COOKIEDIALOG_STORAGE_KEY", "site_consent")
        .env("COOKIEDIALOG_EXPIRY_DAYS", "30")
        .arg("status")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("key:        site_consent"), "{text}");
    assert!(text.contains("reason:     explicit-accept"), "{text}");
    assert!(text.contains("expires:"), "{text}");
}

#[test]
fn boolish_env_flag_enables_location() {
    let dir = TempDir::new().unwrap();
    cookiedialog(&store_in(&dir))
        .env("COOKIEDIALOG_ENABLE_LOCATION", "yes")
        .env("COOKIEDIALOG_LOCATION_ENDPOINT", "http://127.0.0.1:9/geo")
        .env("COOKIEDIALOG_LOCATION_TIMEOUT", "1")
        .arg("region")
        .assert()
        .success()
        .stdout(predicate::str::contains("requires consent: true"));
}

#[test]
fn reject_then_set_single_category() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    cookiedialog(&store).arg("reject").assert().success();
    let record = status_json(&store);
    assert_eq!(record["reason"], "user_reject");
    assert_eq!(record["categories"]["necessary"], true);
    assert_eq!(record["categories"]["analytics"], false);

    cookiedialog(&store)
        .args(["set", "analytics", "true"])
        .assert()
        .success();
    let record = status_json(&store);
    assert_eq!(record["categories"]["analytics"], true);
    assert_eq!(record["categories"]["marketing"], false);
    assert_eq!(record["reason"], "user_reject");
}

#[test]
fn set_without_consent_exits_1_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    cookiedialog(&store)
        .args(["set", "analytics", "true"])
        .assert()
        .code(1);
    assert!(!store.exists());
}

#[test]
fn save_forces_required_and_keeps_unknown() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    cookiedialog(&store)
        .args(["save", "necessary=false", "analytics=yes", "preferences=1"])
        .assert()
        .success();

    let record = status_json(&store);
    assert_eq!(record["categories"]["necessary"], true);
    assert_eq!(record["categories"]["analytics"], true);
    assert_eq!(record["categories"]["preferences"], true);
    assert!(record["categories"].get("marketing").is_none());
}

#[test]
fn save_rejects_malformed_selection() {
    let dir = TempDir::new().unwrap();
    cookiedialog(&store_in(&dir))
        .args(["save", "analytics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected id=bool"));
}

#[test]
fn reset_clears_record() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    cookiedialog(&store).arg("accept").assert().success();
    cookiedialog(&store).arg("reset").assert().success();
    cookiedialog(&store).arg("reset").assert().success();
    cookiedialog(&store).arg("status").assert().code(1);
}

#[test]
fn region_without_location_is_config_error() {
    let dir = TempDir::new().unwrap();
    cookiedialog(&store_in(&dir))
        .arg("region")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("region gating is disabled"));
}

#[test]
fn config_file_declares_categories() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let config = dir.path().join("consent.yaml");
    std::fs::write(
        &config,
        "storageKey: site_consent\nexpiryDays: 30\ncategories:\n  - id: essential\n    name: Essential\n    required: true\n  - id: ads\n    name: Ads\n",
    )
    .unwrap();

    cookiedialog(&store)
        .arg("--config")
        .arg(&config)
        .arg("reject")
        .assert()
        .success();

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    let raw = stored["site_consent"].as_str().expect("record under configured key");
    let record: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(record["categories"]["essential"], true);
    assert_eq!(record["categories"]["ads"], false);
}

#[test]
fn invalid_config_exits_2() {
    let dir = TempDir::new().unwrap();
    cookiedialog(&store_in(&dir))
        .env("COOKIEDIALOG_EXPIRY_DAYS", "0")
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid consent configuration"));
}

#[tokio::test(flavor = "multi_thread")]
async fn start_with_exempt_region_auto_accepts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"inEU": false, "country": "US"})),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let endpoint = format!("{}/geo", mock_server.uri());

    let store_for_cmd = store.clone();
    let output = tokio::task::spawn_blocking(move || {
        cookiedialog(&store_for_cmd)
            .env("COOKIEDIALOG_LOCATION_ENDPOINT", endpoint)
            .args(["--location", "start", "--json"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["outcome"], "region-exempt");
    assert_eq!(body["record"]["reason"], "location_not_required");
    assert_eq!(body["record"]["locationData"]["country"], "US");
    assert_eq!(body["record"]["locationData"]["inEU"], false);
    assert_eq!(body["record"]["locationData"]["detectionMethod"], "custom-endpoint");

    let record = status_json(&store);
    assert_eq!(record["categories"]["marketing"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn start_with_failing_lookup_prompts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let endpoint = format!("{}/geo", mock_server.uri());

    let output = tokio::task::spawn_blocking(move || {
        cookiedialog(&store)
            .env("COOKIEDIALOG_LOCATION_ENDPOINT", endpoint)
            .args(["--location", "start", "--json"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["outcome"], "prompted");
    assert!(body["record"].is_null());
}
