//! Tests for the per-session change watcher

use std::sync::Arc;

use shared::ServerMessage;
use tokio::sync::watch;

use crate::error::WebServerError;
use crate::services::ChangeWatcher;
use crate::traits::{ElementLog, MockElementLog};
use crate::types::{EMPTY_WATERMARK, LogEntry};

use super::fixtures::{mud, numbered_elements, steam};
use super::helpers::{create_test_log, create_test_outbox, recv_within, wait_for_condition};

#[tokio::test]
async fn test_catch_up_skips_entries_at_or_below_watermark() {
    let log = create_test_log();
    let seen = log.append(steam()).await.unwrap();
    let fresh = log.append(mud()).await.unwrap();

    let mut watcher = ChangeWatcher::new(log.clone(), log.subscribe(), seen.id);
    let batch = watcher.catch_up().await.unwrap();

    assert_eq!(batch, vec![fresh.element]);
    assert_eq!(watcher.watermark(), fresh.id);
    assert!(watcher.catch_up().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_next_batch_after_append() {
    let log = create_test_log();
    let mut watcher = ChangeWatcher::new(log.clone(), log.subscribe(), EMPTY_WATERMARK);

    let entry = log.append(steam()).await.unwrap();
    let batch = tokio::time::timeout(std::time::Duration::from_secs(1), watcher.next_batch())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batch, vec![steam()]);
    assert_eq!(watcher.watermark(), entry.id);
}

#[tokio::test]
async fn test_burst_of_appends_is_delivered_without_gaps() {
    let log = create_test_log();
    let mut watcher = ChangeWatcher::new(log.clone(), log.subscribe(), EMPTY_WATERMARK);

    let elements = numbered_elements(10);
    for element in elements.clone() {
        log.append(element).await.unwrap();
    }

    // Notifications may coalesce; the union of the batches must be exact
    let mut received = Vec::new();
    while received.len() < elements.len() {
        let batch = tokio::time::timeout(std::time::Duration::from_secs(1), watcher.next_batch())
            .await
            .unwrap()
            .unwrap();
        received.extend(batch);
    }
    assert_eq!(received, elements);
}

#[tokio::test]
async fn test_spawned_watcher_forwards_add_messages() {
    let log = create_test_log();
    let (outbox, mut rx) = create_test_outbox(16);
    let handle = ChangeWatcher::new(log.clone(), log.subscribe(), EMPTY_WATERMARK).spawn(outbox);

    log.append(steam()).await.unwrap();

    match recv_within(&mut rx, 1000).await {
        Some(ServerMessage::Add { elements }) => assert_eq!(elements, vec![steam()]),
        other => panic!("expected add message, got {other:?}"),
    }
    assert!(handle.is_running());
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_stops_delivery() {
    let log = create_test_log();
    let (outbox, mut rx) = create_test_outbox(16);
    let mut handle = ChangeWatcher::new(log.clone(), log.subscribe(), EMPTY_WATERMARK).spawn(outbox);

    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(!handle.is_running());

    log.append(steam()).await.unwrap();
    assert!(recv_within(&mut rx, 200).await.is_none());
}

#[tokio::test]
async fn test_watcher_ends_when_connection_closes() {
    let log = create_test_log();
    let (outbox, rx) = create_test_outbox(16);
    let handle = ChangeWatcher::new(log.clone(), log.subscribe(), EMPTY_WATERMARK).spawn(outbox);

    drop(rx);
    log.append(steam()).await.unwrap();

    let handle = &handle;
    assert!(wait_for_condition(move || async move { !handle.is_running() }, 1000).await);
}

#[tokio::test]
async fn test_failed_read_is_retried_on_next_notification() {
    let (changes_tx, changes_rx) = watch::channel(5);
    let changes_tx = Arc::new(changes_tx);

    let mut log = MockElementLog::new();
    let notifier = changes_tx.clone();
    let mut reads = 0;
    log.expect_read_since()
        .withf(|watermark| *watermark == 5)
        .times(2)
        .returning(move |_| {
            reads += 1;
            if reads == 1 {
                // The next append arrives while the store is still down
                notifier.send_replace(7);
                Err(WebServerError::storage("database is locked"))
            } else {
                Ok(vec![
                    LogEntry { id: 6, element: steam() },
                    LogEntry { id: 7, element: mud() },
                ])
            }
        });

    let mut watcher = ChangeWatcher::new(Arc::new(log), changes_rx, 5);
    changes_tx.send_replace(6);

    let batch = tokio::time::timeout(std::time::Duration::from_secs(1), watcher.next_batch())
        .await
        .unwrap()
        .unwrap();

    // Both reads started from 5, so the failure did not move the watermark
    assert_eq!(batch, vec![steam(), mud()]);
    assert_eq!(watcher.watermark(), 7);
}
