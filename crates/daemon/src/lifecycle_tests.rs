// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rk_core::{decode, encode, Record};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1:0".parse().unwrap();
    config.server.api_key = "secret".to_string();
    config.log.path = dir.path().join("data/store.log");
    config
}

async fn raw_request(addr: SocketAddr, request: String) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn startup_takes_lock_and_shutdown_releases_it() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let daemon = startup(&config).await.unwrap();

    let pid = std::fs::read_to_string(config.lock_path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(daemon.replay.as_ref().map(|r| r.applied), Some(0));

    daemon.run(async {}).await.unwrap();
    assert!(!config.lock_path().exists());
}

#[tokio::test]
async fn second_daemon_on_same_log_is_refused() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let _first = startup(&config).await.unwrap();

    let second = startup(&config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(..))));
    assert!(config.lock_path().exists(), "first daemon's lock left alone");
}

#[tokio::test]
async fn replay_restores_records_before_serving() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    std::fs::create_dir_all(config.log.path.parent().unwrap()).unwrap();
    let lines = [
        encode(&Record::new("a", "t", "v1").with_timestamps(100, 100)).unwrap(),
        "garbage".to_string(),
        encode(&Record::new("a", "t", "v2").with_timestamps(100, 200)).unwrap(),
    ];
    std::fs::write(&config.log.path, format!("{}\n", lines.join("\n"))).unwrap();

    let daemon = startup(&config).await.unwrap();

    let report = daemon.replay.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.failed, 1);
    let record = daemon.service().get("a", "t").await.unwrap().unwrap();
    assert_eq!(record, Record::new("a", "t", "v2").with_timestamps(100, 200));
}

#[tokio::test]
async fn replay_disabled_leaves_store_empty() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.replay.enabled = false;
    std::fs::create_dir_all(config.log.path.parent().unwrap()).unwrap();
    let line = encode(&Record::new("a", "t", "x").with_timestamps(1, 1)).unwrap();
    std::fs::write(&config.log.path, format!("{line}\n")).unwrap();

    let daemon = startup(&config).await.unwrap();

    assert!(daemon.replay.is_none());
    assert!(daemon.service().get("a", "t").await.unwrap().is_none());
}

#[tokio::test]
async fn restart_with_default_config_recovers_earlier_writes() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let first = startup(&config).await.unwrap();
    first.service().add("a", "news", "v1").await.unwrap();
    first.service().add("a", "news", "v2").await.unwrap();
    first.service().add("b", "", "other").await.unwrap();
    let before = first.service().get("a", "news").await.unwrap().unwrap();
    first.run(async {}).await.unwrap();

    let second = startup(&config).await.unwrap();

    assert_eq!(second.replay.as_ref().map(|r| r.applied), Some(3));
    let after = second.service().get("a", "news").await.unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(after.content, "v2");
    assert!(second.service().get("b", "default").await.unwrap().is_some());
}

#[tokio::test]
async fn bind_failure_cleans_up_lock_file() {
    let dir = TempDir::new().unwrap();
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config(&dir);
    config.server.bind = occupied.local_addr().unwrap();

    let result = startup(&config).await;

    assert!(matches!(result, Err(LifecycleError::BindFailed(..))));
    assert!(!config.lock_path().exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_requests_and_drains_log_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let daemon = startup(&config).await.unwrap();
    let addr = daemon.local_addr().unwrap();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(daemon.run(async move {
        let _ = stop_rx.await;
    }));

    let body = r#"{"key":"a","content":"hello"}"#;
    let response = raw_request(
        addr,
        format!(
            "POST /add/news HTTP/1.1\r\nHost: localhost\r\nX-API-Key: secret\r\n\
             Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 201"), "{response}");

    let health = raw_request(
        addr,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
    )
    .await;
    assert!(health.starts_with("HTTP/1.1 200"), "{health}");

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();

    let logged = std::fs::read_to_string(&config.log.path).unwrap();
    let records: Vec<Record> = logged.lines().map(|l| decode(l).unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "a");
    assert_eq!(records[0].topic, "news");
}
