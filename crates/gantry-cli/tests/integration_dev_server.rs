//! Integration tests for the development server.
//!
//! Reload state and port binding go through the library API; the
//! serving and event-stream tests talk to a real listener.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gantry_cli::dev::{server, BuildStatus, DevServerState};
use gantry_config::DevOptions;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

fn state(output_root: PathBuf) -> DevServerState {
    DevServerState::new(output_root, DevOptions::default())
}

#[tokio::test]
async fn a_fresh_state_replays_idle_to_new_connections() {
    let state = state(PathBuf::from("dist"));

    let snapshot = state.snapshot();
    assert_eq!(snapshot.generation, 0);
    assert_eq!(snapshot.status, "idle");
    assert!(snapshot.message.is_none());
}

#[tokio::test]
async fn every_subscriber_receives_an_announcement() {
    let state = state(PathBuf::from("dist"));
    let mut first = state.subscribe();
    let mut second = state.subscribe();

    state.announce(BuildStatus::Building);

    tokio::select! {
        event = first.recv() => {
            let event = event.unwrap();
            assert_eq!(event.status, "building");
            assert_eq!(event.generation, 1);
        }
        _ = sleep(Duration::from_millis(100)) => {
            panic!("first subscriber missed the announcement");
        }
    }

    tokio::select! {
        event = second.recv() => {
            assert_eq!(event.unwrap().status, "building");
        }
        _ = sleep(Duration::from_millis(100)) => {
            panic!("second subscriber missed the announcement");
        }
    }
}

#[tokio::test]
async fn a_late_subscriber_baselines_from_the_snapshot() {
    let state = state(PathBuf::from("dist"));
    state.announce(BuildStatus::Building);
    state.announce(BuildStatus::Ready {
        duration_ms: 12,
        documents: 1,
    });

    // Connecting now means the snapshot, not a replay of old events.
    let mut rx = state.subscribe();
    let snapshot = state.snapshot();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.status, "ready");

    state.announce(BuildStatus::Failed {
        message: "template broke".to_string(),
    });

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.generation, 3);
    assert_eq!(event.status, "failed");
    assert_eq!(event.message.as_deref(), Some("template broke"));
}

#[tokio::test]
async fn bind_takes_the_configured_port_when_free() {
    let port = match pick_available_port() {
        Some(port) => port,
        None => {
            eprintln!("skipping bind_takes_the_configured_port_when_free: no free port");
            return;
        }
    };

    let options = DevOptions {
        port,
        ..DevOptions::default()
    };
    let (_listener, addr) = server::bind(&options).await.unwrap();
    assert_eq!(addr.port(), port);
}

#[tokio::test]
async fn served_pages_arrive_with_the_reload_client() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("index.html"),
        "<html><body><h1>home</h1></body></html>",
    )
    .unwrap();

    let state = Arc::new(state(tmp.path().to_path_buf()));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("GET / HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n\r\n").as_bytes())
        .await
        .unwrap();

    let mut response = Vec::new();
    timeout(Duration::from_secs(2), stream.read_to_end(&mut response))
        .await
        .expect("response within two seconds")
        .unwrap();

    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert!(response.contains("text/html"));
    assert!(response.contains("/__gantry/reload.js"));
}

#[tokio::test]
async fn the_event_stream_opens_with_a_status_snapshot() {
    let tmp = TempDir::new().unwrap();
    let state = Arc::new(state(tmp.path().join("dist")));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            format!("GET /__gantry/events HTTP/1.1\r\nhost: {addr}\r\naccept: text/event-stream\r\n\r\n")
                .as_bytes(),
        )
        .await
        .unwrap();

    // The stream never ends, so read until the snapshot shows up.
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = timeout(Duration::from_secs(2), stream.read(&mut chunk))
            .await
            .expect("snapshot within two seconds")
            .unwrap();
        assert!(n > 0, "stream closed before the snapshot arrived");
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer);
        if text.contains("event: reload") && text.contains("\"status\":\"idle\"") {
            assert!(text.contains("text/event-stream"));
            break;
        }
    }
}

fn pick_available_port() -> Option<u16> {
    std::net::TcpListener::bind(("127.0.0.1", 0))
        .ok()
        .and_then(|listener| listener.local_addr().ok().map(|addr| addr.port()))
}
