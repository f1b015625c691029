//! Integration tests for the sync server
//!
//! Run a real server on an ephemeral port and talk to it over WebSocket.

mod helpers;

use futures_util::SinkExt;
use shared::{Element, Scope, ServerMessage, foundational_elements};
use tokio_tungstenite::tungstenite::Message;
use webserver::{ElementLog, ServerStatus};

use helpers::*;

#[tokio::test]
async fn test_new_client_receives_seed_snapshot() {
    let server = TestServer::start().await;
    let mut client = connect(&server).await;

    assert_eq!(
        next_message(&mut client, 2000).await,
        Some(ServerMessage::Add {
            elements: foundational_elements()
        })
    );

    server.stop().await;
}

#[tokio::test]
async fn test_discovery_is_broadcast_to_every_client() {
    let server = TestServer::start().await;
    let mut alice = connect(&server).await;
    let mut bob = connect(&server).await;
    next_message(&mut alice, 2000).await.unwrap();
    next_message(&mut bob, 2000).await.unwrap();

    send_pair(&mut alice, "Water", "Fire").await;

    // Requester sees the discovery and the broadcast, in either order
    let mut saw_discovery = false;
    let mut saw_add = false;
    for _ in 0..2 {
        match next_message(&mut alice, 2000).await {
            Some(ServerMessage::Discovery { element, scope }) => {
                assert_eq!(element, Element::new("Steam", "💨"));
                assert_eq!(scope, Scope::Local);
                saw_discovery = true;
            }
            Some(ServerMessage::Add { elements }) => {
                assert_eq!(elements, vec![Element::new("Steam", "💨")]);
                saw_add = true;
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
    assert!(saw_discovery && saw_add);

    assert_eq!(
        next_message(&mut bob, 2000).await,
        Some(ServerMessage::Add {
            elements: vec![Element::new("Steam", "💨")]
        })
    );

    server.stop().await;
}

#[tokio::test]
async fn test_repeated_pair_is_existing_without_broadcast() {
    let server = TestServer::start().await;
    let mut alice = connect(&server).await;
    let mut bob = connect(&server).await;
    next_message(&mut alice, 2000).await.unwrap();
    next_message(&mut bob, 2000).await.unwrap();

    send_pair(&mut alice, "Water", "Fire").await;
    next_message(&mut alice, 2000).await.unwrap();
    next_message(&mut alice, 2000).await.unwrap();
    next_message(&mut bob, 2000).await.unwrap();
    let count = server.log.len().await.unwrap();

    send_pair(&mut bob, "Fire", "Water").await;

    assert_eq!(
        next_message(&mut bob, 2000).await,
        Some(ServerMessage::Existing {
            element: Element::new("Steam", "💨")
        })
    );
    assert_eq!(server.log.len().await.unwrap(), count);
    assert!(next_message(&mut alice, 300).await.is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_late_joiner_snapshot_includes_discoveries() {
    let server = TestServer::start().await;
    let mut alice = connect(&server).await;
    next_message(&mut alice, 2000).await.unwrap();

    send_pair(&mut alice, "Water", "Earth").await;
    next_message(&mut alice, 2000).await.unwrap();

    let mut late = connect(&server).await;
    match next_message(&mut late, 2000).await {
        Some(ServerMessage::Add { elements }) => {
            assert_eq!(elements.len(), 5);
            assert_eq!(elements[4], Element::new("Mud", "🟤"));
        }
        other => panic!("expected snapshot, got {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_failed_pair_reports_error_and_keeps_session() {
    let server = TestServer::start().await;
    let mut client = connect(&server).await;
    next_message(&mut client, 2000).await.unwrap();

    send_pair(&mut client, "Wind", "Fire").await;
    assert!(matches!(
        next_message(&mut client, 2000).await,
        Some(ServerMessage::Error { .. })
    ));

    client.send(Message::Text("{\"type\":\"bogus\"}".to_string())).await.unwrap();
    assert!(matches!(
        next_message(&mut client, 2000).await,
        Some(ServerMessage::Error { .. })
    ));

    // Still usable afterwards
    send_pair(&mut client, "Water", "Fire").await;
    assert!(next_message(&mut client, 2000).await.is_some());
    assert_eq!(server.log.len().await.unwrap(), 5);

    server.stop().await;
}

#[tokio::test]
async fn test_status_reports_elements_and_sessions() {
    let server = TestServer::start().await;
    let mut client = connect(&server).await;
    next_message(&mut client, 2000).await.unwrap();

    let status: ServerStatus = reqwest::get(server.http_url("/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status.status, "running");
    assert_eq!(status.elements, 4);
    assert_eq!(status.active_sessions, 1);

    client.close(None).await.unwrap();
    let url = server.http_url("/api/status");
    let url = url.as_str();
    let drained = wait_for_condition(
        move || async move {
            let status: ServerStatus = reqwest::get(url).await.unwrap().json().await.unwrap();
            status.active_sessions == 0
        },
        3000,
    )
    .await;
    assert!(drained);

    let health = reqwest::get(server.http_url("/health")).await.unwrap();
    assert!(health.status().is_success());

    server.stop().await;
}
