//! Integration tests for the live update client against a local
//! WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

use console_core::{Channel, ConnectionStatus};
use console_stream::{LiveClient, StateChange, StreamConfig};

const WAIT: Duration = Duration::from_secs(5);

/// Read the next text frame, skipping transport-level ping/pong.
async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        match timeout(WAIT, ws.next()).await.expect("server read timed out") {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(&text).expect("client sent non-JSON frame")
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = ws.send(Message::Pong(data)).await;
            }
            Some(Ok(_)) => {}
            other => panic!("connection ended while waiting for a frame: {:?}", other),
        }
    }
}

/// Accept one client connection and run the handshake: assert nothing,
/// just collect the auth frame plus one subscribe frame per channel and
/// hand them to the test.
async fn collect_handshake(ws: &mut WebSocketStream<TcpStream>) -> Vec<Value> {
    let mut frames = vec![next_text(ws).await];
    ws.send(Message::Text(
        r#"{"type":"auth","status":"admin"}"#.into(),
    ))
    .await
    .expect("failed to send auth ack");

    for _ in 0..Channel::ALL.len() {
        frames.push(next_text(ws).await);
    }
    frames
}

fn assert_auth_then_full_replay(frames: &[Value], secret: &str) {
    assert_eq!(frames[0]["type"], "auth", "auth must be the first frame");
    assert_eq!(frames[0]["secret"], secret);

    let channels: Vec<&str> = frames[1..]
        .iter()
        .map(|frame| {
            assert_eq!(frame["type"], "subscribe");
            frame["channel"].as_str().expect("subscribe without channel")
        })
        .collect();
    let expected: Vec<&str> = Channel::ALL.iter().map(|c| c.as_str()).collect();
    assert_eq!(channels, expected, "full subscription set must be replayed");
}

fn test_config(addr: std::net::SocketAddr) -> StreamConfig {
    let mut config = StreamConfig::new(format!("ws://{}", addr), Some("s3cret".to_string()));
    config.reconnect_base = Duration::from_millis(50);
    config.reconnect_max = Duration::from_millis(200);
    config.ping_interval = Duration::from_secs(60);
    config
}

async fn wait_for(
    changes: &mut tokio::sync::broadcast::Receiver<StateChange>,
    mut predicate: impl FnMut(&StateChange) -> bool,
) {
    loop {
        let change = timeout(WAIT, changes.recv())
            .await
            .expect("timed out waiting for a state change")
            .expect("change channel closed");
        if predicate(&change) {
            return;
        }
    }
}

#[tokio::test]
async fn test_auth_first_subscribe_replay_and_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (conn_tx, mut conn_rx) = mpsc::unbounded_channel::<Vec<Value>>();

    let server = tokio::spawn(async move {
        // First connection: handshake, one price tick, then hang up to
        // force the client through its reconnect path.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let frames = collect_handshake(&mut ws).await;
        conn_tx.send(frames).unwrap();

        let tick = json!({
            "channel": "market",
            "event_type": "price_update",
            "data": { "price_eur": 931.5, "change_pct": 0.0, "volume": 1.0 },
            "timestamp": "2026-02-01T10:00:00.000000",
            "color": "green"
        });
        ws.send(Message::Text(tick.to_string().into())).await.unwrap();
        ws.close(None).await.ok();
        drop(ws);

        // Second connection: the reconnected client must authenticate and
        // replay the full subscription set again.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let frames = collect_handshake(&mut ws).await;
        conn_tx.send(frames).unwrap();

        // Hold the session open until the client shuts down.
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Ping(data) = msg {
                let _ = ws.send(Message::Pong(data)).await;
            }
        }
    });

    let (mut client, mut changes) = LiveClient::new(test_config(addr));
    client.start().unwrap();

    let first = timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
    assert_auth_then_full_replay(&first, "s3cret");

    // The price tick pushed on the first session reaches the state.
    wait_for(&mut changes, |c| matches!(c, StateChange::Price { .. })).await;
    let state = client.state();
    assert_eq!(state.current_price(), Some(dec!(931.5)));
    assert_eq!(state.price_series_len(), 1);

    let second = timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
    assert_auth_then_full_replay(&second, "s3cret");

    wait_for(&mut changes, |c| {
        matches!(
            c,
            StateChange::Status {
                status: ConnectionStatus::Authenticated
            }
        )
    })
    .await;

    client.shutdown().await;
    wait_for(&mut changes, |c| {
        matches!(
            c,
            StateChange::Status {
                status: ConnectionStatus::Disconnected
            }
        )
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn test_retries_exhaust_into_terminal_state() {
    // Grab a port and close it again so every connect is refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = test_config(addr);
    config.reconnect_base = Duration::from_millis(10);
    config.reconnect_max = Duration::from_millis(20);
    config.max_reconnect_attempts = 3;

    let (mut client, mut changes) = LiveClient::new(config);
    client.start().unwrap();

    wait_for(&mut changes, |c| {
        matches!(c, StateChange::RetriesExhausted { attempts: 3 })
    })
    .await;

    let state = client.state();
    assert!(state.retries_exhausted());
    assert_eq!(state.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_start_is_a_no_op_while_running() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = collect_handshake(&mut ws).await;
        // Only one connection is ever accepted; a second start() must not
        // try to open another.
        while ws.next().await.is_some() {}
    });

    let (mut client, mut changes) = LiveClient::new(test_config(addr));
    client.start().unwrap();

    wait_for(&mut changes, |c| {
        matches!(
            c,
            StateChange::Status {
                status: ConnectionStatus::Authenticated
            }
        )
    })
    .await;

    // Second start while connected: no new connection, no error.
    client.start().unwrap();
    assert_eq!(client.state().status(), ConnectionStatus::Authenticated);

    client.shutdown().await;
    server.abort();
}
