// ABOUTME: Integration tests for the session registry and per-session transport lifecycle
// ABOUTME: Two-phase creation, idempotent deletion, self-removal on close, SSE delivery, bounded drain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
#![cfg(feature = "transport-http")]

mod helpers;

use futures_util::StreamExt;
use helpers::mock_provider::{MockProvider, MockProviderFactory};
use helpers::{initialize_body, mock_registry, request_body};
use oura_mcp_server::errors::ErrorCode;
use oura_mcp_server::mcp::{SessionRegistry, StreamableHttpTransport};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

async fn open_session(registry: &SessionRegistry) -> String {
    let pending = registry.begin();
    let response = pending.transport().handle_post(initialize_body(1)).await;
    assert_eq!(response.status(), 200);
    registry.commit(pending).unwrap()
}

#[tokio::test]
async fn test_commit_requires_completed_handshake() {
    let (registry, _) = mock_registry();
    let pending = registry.begin();

    let error = registry.commit(pending).unwrap_err();
    assert_eq!(error.code, ErrorCode::InternalError);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_pending_session_is_not_visible_until_commit() {
    let (registry, _) = mock_registry();
    let pending = registry.begin();
    pending.transport().handle_post(initialize_body(1)).await;

    let token = pending.transport().session_id().unwrap().to_owned();
    assert!(registry.lookup(&token).is_none());

    assert_eq!(registry.commit(pending).unwrap(), token);
    assert!(registry.lookup(&token).is_some());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (registry, _) = mock_registry();
    let token = open_session(&registry).await;
    let transport = registry.lookup(&token).unwrap();

    assert!(registry.delete(&token));
    assert!(!registry.delete(&token));

    transport.close().await;
    transport.close().await;
    assert!(registry.is_empty());
    assert!(transport.is_closed());
}

#[tokio::test]
async fn test_transport_close_removes_its_own_entry() {
    let (registry, _) = mock_registry();
    let first = open_session(&registry).await;
    let second = open_session(&registry).await;

    registry.lookup(&first).unwrap().close().await;

    assert!(registry.lookup(&first).is_none());
    assert_eq!(registry.tokens(), vec![second]);
}

#[tokio::test]
async fn test_close_hook_survives_dropped_registry() {
    let transport = {
        let (registry, _) = mock_registry();
        let token = open_session(&registry).await;
        registry.lookup(&token).unwrap()
    };

    transport.close().await;
    assert!(transport.is_closed());
}

#[tokio::test]
async fn test_closed_transport_rejects_requests() {
    let (registry, _) = mock_registry();
    let token = open_session(&registry).await;
    let transport = registry.lookup(&token).unwrap();
    transport.close().await;

    let response = transport
        .handle_post(request_body(2, "ping", json!({})))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_close_all_empties_registry() {
    let (registry, _) = mock_registry();
    for _ in 0..3 {
        open_session(&registry).await;
    }
    assert_eq!(registry.len(), 3);

    let report = registry.close_all(Duration::from_secs(1)).await;
    assert_eq!(report.closed, 3);
    assert_eq!(report.timed_out, 0);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_close_all_on_empty_registry() {
    let (registry, _) = mock_registry();
    let report = registry.close_all(Duration::from_secs(1)).await;
    assert_eq!(report.closed + report.timed_out, 0);
}

#[tokio::test]
async fn test_close_all_drops_sessions_that_overrun_timeout() {
    let registry = SessionRegistry::new(Arc::new(MockProviderFactory::slow(
        Duration::from_secs(5),
    )));
    let token = open_session(&registry).await;
    let transport = registry.lookup(&token).unwrap();

    let in_flight = tokio::spawn(async move {
        transport
            .handle_post(request_body(
                2,
                "tools/call",
                json!({"name": "get_personal_info", "arguments": {}}),
            ))
            .await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let report = registry.close_all(Duration::from_millis(100)).await;
    assert_eq!(report.closed, 0);
    assert_eq!(report.timed_out, 1);
    assert!(registry.is_empty());

    in_flight.abort();
}

#[tokio::test]
async fn test_commit_during_drain_is_refused() {
    let registry = SessionRegistry::new(Arc::new(MockProviderFactory::slow(
        Duration::from_secs(5),
    )));
    let token = open_session(&registry).await;
    let transport = registry.lookup(&token).unwrap();

    let in_flight = tokio::spawn(async move {
        transport
            .handle_post(request_body(
                2,
                "tools/call",
                json!({"name": "get_personal_info", "arguments": {}}),
            ))
            .await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let draining = registry.clone();
    let drain = tokio::spawn(async move { draining.close_all(Duration::from_millis(500)).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(registry.is_draining());

    let late = registry.begin();
    let response = late.transport().handle_post(initialize_body(1)).await;
    assert_eq!(response.status(), 200);
    let error = registry.commit(late).unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceUnavailable);

    let report = drain.await.unwrap();
    assert_eq!(report.timed_out, 1);
    assert!(registry.is_empty());

    in_flight.abort();
}

#[tokio::test]
async fn test_close_ends_sse_stream() {
    let transport = StreamableHttpTransport::new(Arc::new(MockProvider::default()));
    transport.handle_post(initialize_body(1)).await;

    let response = transport.handle_get();
    assert_eq!(response.status(), 200);
    transport.close().await;

    let body = tokio::time::timeout(
        Duration::from_secs(2),
        axum::body::to_bytes(response.into_body(), usize::MAX),
    )
    .await;
    assert!(body.is_ok(), "SSE stream should end once the session closes");
}

#[tokio::test]
async fn test_tool_failure_notification_reaches_sse_stream() {
    let provider = Arc::new(MockProvider::default());
    provider.fail_requests();
    let transport = StreamableHttpTransport::new(provider);
    transport.handle_post(initialize_body(1)).await;

    let mut stream = transport.handle_get().into_body().into_data_stream();

    let response = transport
        .handle_post(request_body(
            2,
            "logging/setLevel",
            json!({"level": "warning"}),
        ))
        .await;
    assert_eq!(response.status(), 200);

    let response = transport
        .handle_post(request_body(
            3,
            "tools/call",
            json!({"name": "get_personal_info", "arguments": {}}),
        ))
        .await;
    let body: Value = serde_json::from_slice(
        &axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(body["result"]["isError"], true);

    let chunk = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("notification within timeout")
        .expect("stream still open")
        .unwrap();
    let text = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(text.contains("event: message"));
    assert!(text.contains("notifications/message"));
    assert!(text.contains("\"level\":\"error\""));
}

#[tokio::test]
async fn test_requests_before_initialize_are_rejected() {
    let transport = StreamableHttpTransport::new(Arc::new(MockProvider::default()));
    let response = transport
        .handle_post(request_body(1, "tools/list", json!({})))
        .await;
    assert_eq!(response.status(), 400);
    assert!(transport.session_id().is_none());
}
