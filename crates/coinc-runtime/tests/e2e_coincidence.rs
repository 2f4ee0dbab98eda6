//! End-to-end integration test: TCP → Classifier/Cache → Alert Decider →
//! alert file.
//!
//! Drives a real [`Reactor`] over a loopback TCP socket with
//! newline-delimited JSON observation messages and asserts on the alerts
//! written to the JSONL sink — no component is mocked below the TCP
//! boundary.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use coinc_config::CoincConfig;
use coinc_runtime::lifecycle::Reactor;

fn obs_line(id: &str, det: &str, t: &str, p: f64) -> String {
    format!("{{\"_id\":\"{id}\",\"detector_name\":\"{det}\",\"neutrino_time\":\"{t}\",\"p_val\":{p}}}\n")
}

fn retract_line(det: &str) -> String {
    format!("{{\"detector_name\":\"{det}\",\"retract_latest\":true}}\n")
}

async fn start_server(toml_extra: &str, alert_path: &std::path::Path, storage_path: &std::path::Path) -> Reactor {
    let toml_str = format!(
        r#"
[server]
listen = "tcp://127.0.0.1:0"

[coincidence]
threshold = "10s"
max_retriable = 20
cache_expiration = "24h"
stash_time = "24h"
server_tag = "e2e-test-server"

[storage]
path = "{}"

[alert]
path = "{}"

{toml_extra}
"#,
        storage_path.display(),
        alert_path.display(),
    );
    let config: CoincConfig = toml_str.parse().expect("config parses");
    Reactor::start(config).await.expect("reactor starts")
}

async fn read_alert_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    let contents = std::fs::read_to_string(path).unwrap_or_default();
    contents
        .lines()
        .map(|l| serde_json::from_str(l).expect("alert line is valid JSON"))
        .collect()
}

#[tokio::test]
async fn two_detector_coincidence_emits_one_alert() {
    let dir = tempfile::tempdir().unwrap();
    let alert_path = dir.path().join("alerts.jsonl");
    let storage_path = dir.path().join("observations.jsonl");

    let engine = start_server("", &alert_path, &storage_path).await;
    let addr = engine.listen_addr();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(obs_line("A", "X", "2026-01-01T00:00:00Z", 0.5).as_bytes()).await.unwrap();
    conn.write_all(obs_line("B", "Y", "2026-01-01T00:00:03Z", 0.4).as_bytes()).await.unwrap();
    conn.flush().await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    engine.shutdown();
    drop(conn);
    engine.wait().await.unwrap();

    let alerts = read_alert_lines(&alert_path).await;
    assert_eq!(alerts.len(), 1, "expected exactly one alert (INITIAL is suppressed): {alerts:?}");
    assert_eq!(alerts[0]["alert_type"], "COINC_MSG");
    assert_eq!(alerts[0]["detector_names"], serde_json::json!(["X", "Y"]));
    assert_eq!(alerts[0]["p_val_avg"], 0.45);

    let observations = std::fs::read_to_string(&storage_path).unwrap();
    assert_eq!(observations.lines().count(), 2, "both observations persisted to storage");
}

#[tokio::test]
async fn retraction_of_anchor_emits_retraction_alert() {
    let dir = tempfile::tempdir().unwrap();
    let alert_path = dir.path().join("alerts.jsonl");
    let storage_path = dir.path().join("observations.jsonl");

    let engine = start_server("", &alert_path, &storage_path).await;
    let addr = engine.listen_addr();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(obs_line("A", "X", "2026-01-01T00:00:00Z", 0.5).as_bytes()).await.unwrap();
    conn.write_all(obs_line("B", "Y", "2026-01-01T00:00:03Z", 0.4).as_bytes()).await.unwrap();
    conn.write_all(retract_line("X").as_bytes()).await.unwrap();
    conn.flush().await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    engine.shutdown();
    drop(conn);
    engine.wait().await.unwrap();

    let alerts = read_alert_lines(&alert_path).await;
    let retraction = alerts
        .iter()
        .find(|a| a["alert_type"] == "RETRACTION")
        .expect("a RETRACTION alert was emitted per scenario 6");
    assert_eq!(retraction["detector_names"], serde_json::json!(["Y"]));
}

#[tokio::test]
async fn out_of_window_observation_forms_unflagged_singleton_no_extra_alert() {
    let dir = tempfile::tempdir().unwrap();
    let alert_path = dir.path().join("alerts.jsonl");
    let storage_path = dir.path().join("observations.jsonl");

    let engine = start_server("", &alert_path, &storage_path).await;
    let addr = engine.listen_addr();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(obs_line("A", "X", "2026-01-01T00:00:00Z", 0.5).as_bytes()).await.unwrap();
    conn.write_all(obs_line("B", "Y", "2026-01-01T00:00:03Z", 0.4).as_bytes()).await.unwrap();
    conn.write_all(obs_line("C", "Z", "2026-01-01T00:00:20Z", 0.6).as_bytes()).await.unwrap();
    conn.flush().await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    engine.shutdown();
    drop(conn);
    engine.wait().await.unwrap();

    let alerts = read_alert_lines(&alert_path).await;
    // Only the X/Y coincidence produces an alert; Z's lone singleton does not.
    assert_eq!(alerts.len(), 1, "singleton sub-group must not alert: {alerts:?}");
    assert!(alerts[0]["detector_names"].as_array().unwrap().iter().all(|d| d != "Z"));
}

#[tokio::test]
async fn malformed_message_is_dropped_without_killing_the_connection() {
    let dir = tempfile::tempdir().unwrap();
    let alert_path = dir.path().join("alerts.jsonl");
    let storage_path = dir.path().join("observations.jsonl");

    let engine = start_server("", &alert_path, &storage_path).await;
    let addr = engine.listen_addr();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(b"not json at all\n").await.unwrap();
    conn.write_all(obs_line("A", "X", "2026-01-01T00:00:00Z", 0.5).as_bytes()).await.unwrap();
    conn.write_all(obs_line("B", "Y", "2026-01-01T00:00:03Z", 0.4).as_bytes()).await.unwrap();
    conn.flush().await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    engine.shutdown();
    drop(conn);
    engine.wait().await.unwrap();

    let alerts = read_alert_lines(&alert_path).await;
    assert_eq!(alerts.len(), 1, "the malformed line must not have crashed the pipeline: {alerts:?}");
}
