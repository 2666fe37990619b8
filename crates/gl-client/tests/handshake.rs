//! End-to-end handshake tests
//!
//! Runs the client runtime against a scripted in-process WebSocket broker.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use gl_client::{ClientEvent, ClientHandle};
use gl_core::config::ClientConfig;
use gl_core::{ConnectionState, HostEvent};
use gl_protocol::{ClientMessage, ServerMessage};

const WAIT: Duration = Duration::from_secs(5);

/// Broker that answers each request with the next scripted reply and
/// reports every message it receives, then `None` when the client leaves
async fn spawn_broker(
    replies: Vec<serde_json::Value>,
) -> (SocketAddr, mpsc::UnboundedReceiver<Option<ClientMessage>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test broker");
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut ws = accept_async(stream).await.expect("handshake failed");
        let mut replies = replies.into_iter();

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let request: ClientMessage =
                serde_json::from_str(text.as_str()).expect("client sent invalid JSON");
            let _ = seen_tx.send(Some(request));

            if let Some(reply) = replies.next() {
                ws.send(Message::text(reply.to_string()))
                    .await
                    .expect("reply failed");
            }
        }
        let _ = seen_tx.send(None);
    });

    (addr, seen_rx)
}

async fn wait_for(
    events: &mut broadcast::Receiver<ClientEvent>,
    expected: HostEvent,
) -> ClientEvent {
    timeout(WAIT, async {
        loop {
            match events.recv().await {
                Ok(event) if event.kind == expected => return event,
                Ok(_) => continue,
                Err(e) => panic!("event channel failed: {}", e),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {}", expected))
}

async fn next_seen(seen: &mut mpsc::UnboundedReceiver<Option<ClientMessage>>) -> Option<ClientMessage> {
    timeout(WAIT, seen.recv())
        .await
        .expect("timed out waiting for broker")
        .expect("broker stopped")
}

#[tokio::test]
async fn test_full_handshake() {
    let (addr, mut seen) = spawn_broker(vec![
        serde_json::json!({"type": "AUTH_MESSAGE", "message": "Password:", "message_type": "SECRET"}),
        serde_json::json!({"type": "AUTH_SUCCESS"}),
        serde_json::json!({"type": "AUTH_SUCCESS"}),
    ])
    .await;

    let client = ClientHandle::spawn(&ClientConfig::default());
    let mut events = client.subscribe();

    client.connect(format!("ws://{}/ws", addr)).await.unwrap();
    wait_for(&mut events, HostEvent::Connect).await;

    let snapshot = client.snapshot().await.unwrap();
    assert!(snapshot.connected);
    assert_eq!(snapshot.session_state(), "Connected");

    client.send_auth_request("alice").await.unwrap();
    let prompt = wait_for(&mut events, HostEvent::Message).await;
    assert_eq!(
        prompt.message,
        Some(ServerMessage::AuthMessage {
            message: "Password:".to_string(),
            message_type: "SECRET".to_string(),
        })
    );
    assert_eq!(
        next_seen(&mut seen).await,
        Some(ClientMessage::AuthRequest {
            username: "alice".to_string()
        })
    );

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ConnectionState::Authenticating);
    assert_eq!(snapshot.prompt.text, "Password:");
    assert_eq!(snapshot.prompt.category, "secret");

    client.send_auth_response("hunter2").await.unwrap();
    let outcome = wait_for(&mut events, HostEvent::Message).await;
    assert_eq!(outcome.message, Some(ServerMessage::AuthSuccess));
    assert_eq!(
        client.snapshot().await.unwrap().last_message,
        Some(ServerMessage::AuthSuccess)
    );

    client
        .send_start_session("LANG=C.UTF-8, XDG_SESSION_TYPE=wayland", "sway --unsupported-gpu")
        .await
        .unwrap();
    wait_for(&mut events, HostEvent::Message).await;

    assert_eq!(
        next_seen(&mut seen).await,
        Some(ClientMessage::AuthResponse {
            response: "hunter2".to_string()
        })
    );
    assert_eq!(
        next_seen(&mut seen).await,
        Some(ClientMessage::StartSession {
            env: vec!["LANG=C.UTF-8".to_string(), "XDG_SESSION_TYPE=wayland".to_string()],
            cmd: vec!["sway".to_string(), "--unsupported-gpu".to_string()],
        })
    );

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.session_state(), "StartingSession");
    assert!(snapshot.logs.contains("sending start session request"));

    client.disconnect().await.unwrap();
    wait_for(&mut events, HostEvent::Close).await;
    assert_eq!(next_seen(&mut seen).await, None);
    assert_eq!(
        client.snapshot().await.unwrap().state,
        ConnectionState::Disconnected
    );

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_raises_error_then_close() {
    // Reserve a port, then free it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ClientHandle::spawn(&ClientConfig::default());
    let mut events = client.subscribe();

    client.connect(format!("ws://{}/ws", addr)).await.unwrap();

    let first = timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert_eq!(first.kind, HostEvent::Error);
    assert_eq!(first.message, None);
    let second = timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert_eq!(second.kind, HostEvent::Close);

    let snapshot = client.snapshot().await.unwrap();
    assert!(!snapshot.connected);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.state, ConnectionState::Disconnected);
    assert!(snapshot.logs.contains("connection error"));
}

#[tokio::test]
async fn test_reconnect_closes_previous_socket() {
    let (first_addr, mut first_seen) = spawn_broker(vec![]).await;
    let (second_addr, mut second_seen) = spawn_broker(vec![]).await;

    let client = ClientHandle::spawn(&ClientConfig::default());
    let mut events = client.subscribe();

    client.connect(format!("ws://{}/ws", first_addr)).await.unwrap();
    wait_for(&mut events, HostEvent::Connect).await;

    client.connect(format!("ws://{}/ws", second_addr)).await.unwrap();
    wait_for(&mut events, HostEvent::Connect).await;

    // The first broker sees its client leave without the new one noticing
    assert_eq!(next_seen(&mut first_seen).await, None);

    client.send_auth_request("bob").await.unwrap();
    assert_eq!(
        next_seen(&mut second_seen).await,
        Some(ClientMessage::AuthRequest {
            username: "bob".to_string()
        })
    );

    let snapshot = client.snapshot().await.unwrap();
    assert!(snapshot.connected);
    assert_eq!(snapshot.state, ConnectionState::Authenticating);
}

#[tokio::test]
async fn test_commands_while_disconnected_send_nothing() {
    let client = ClientHandle::spawn(&ClientConfig::default());

    client.send_auth_request("alice").await.unwrap();
    client.send_auth_response("x").await.unwrap();
    client.send_start_session("A=1", "'open").await.unwrap();

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ConnectionState::Disconnected);
    assert!(!snapshot.loading);
    assert!(snapshot.logs.is_empty());
}

#[tokio::test]
async fn test_handle_reports_actor_gone_after_shutdown() {
    let client = ClientHandle::spawn(&ClientConfig::default());
    client.shutdown().await.unwrap();

    // Give the task a moment to exit and drop its receiver
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(client.snapshot().await.is_err());
}

#[tokio::test]
async fn test_each_message_event_carries_its_own_frame() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        // Answer the first request with two frames back to back
        if let Some(Ok(_)) = ws.next().await {
            for reply in [
                serde_json::json!({"type": "AUTH_MESSAGE", "message": "Welcome", "message_type": "INFO"}),
                serde_json::json!({"type": "AUTH_MESSAGE", "message": "Password:", "message_type": "SECRET"}),
            ] {
                ws.send(Message::text(reply.to_string())).await.unwrap();
            }
        }
        while let Some(Ok(_)) = ws.next().await {}
    });

    let client = ClientHandle::spawn(&ClientConfig::default());
    let mut events = client.subscribe();

    client.connect(format!("ws://{}/ws", addr)).await.unwrap();
    wait_for(&mut events, HostEvent::Connect).await;
    client.send_auth_request("alice").await.unwrap();

    // Let both frames land before looking at either event
    tokio::time::sleep(Duration::from_millis(200)).await;

    let first = wait_for(&mut events, HostEvent::Message).await;
    let second = wait_for(&mut events, HostEvent::Message).await;
    assert!(matches!(
        first.message,
        Some(ServerMessage::AuthMessage { ref message, .. }) if message == "Welcome"
    ));
    assert!(matches!(
        second.message,
        Some(ServerMessage::AuthMessage { ref message, .. }) if message == "Password:"
    ));

    client.shutdown().await.unwrap();
}
