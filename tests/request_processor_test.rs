// ABOUTME: Integration tests for MCP method routing in the request processor
// ABOUTME: Initialize negotiation, tools, error codes, batches, and log-level driven notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

mod helpers;

use helpers::mock_provider::MockProvider;
use helpers::{initialize_body, request_body};
use oura_mcp_server::mcp::McpRequestProcessor;
use serde_json::{json, Value};
use std::sync::Arc;

fn processor() -> McpRequestProcessor {
    McpRequestProcessor::new(Arc::new(MockProvider::default()))
}

async fn call(processor: &McpRequestProcessor, payload: Value) -> Value {
    processor.handle_payload(payload).await.expect("response")
}

#[tokio::test]
async fn test_initialize_echoes_supported_version() {
    let processor = processor();
    let mut body = initialize_body(1);
    body["params"]["protocolVersion"] = json!("2025-03-26");

    let response = call(&processor, body).await;
    assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_initialize_falls_back_to_latest_version() {
    let processor = processor();
    let mut body = initialize_body(1);
    body["params"]["protocolVersion"] = json!("1999-01-01");

    let response = call(&processor, body).await;
    assert_eq!(response["result"]["protocolVersion"], "2025-06-18");
}

#[tokio::test]
async fn test_unknown_method_is_method_not_found() {
    let processor = processor();
    let response = call(&processor, request_body(4, "resources/list", json!({}))).await;
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["id"], 4);
}

#[tokio::test]
async fn test_notifications_produce_no_response() {
    let processor = processor();
    for method in [
        "notifications/initialized",
        "notifications/cancelled",
        "notifications/unknown",
    ] {
        let result = processor
            .handle_payload(json!({"jsonrpc": "2.0", "method": method}))
            .await;
        assert!(result.is_none(), "{method} should not be answered");
    }
}

#[tokio::test]
async fn test_tools_call_success_carries_text_and_structured_content() {
    let processor = processor();
    let response = call(
        &processor,
        request_body(
            2,
            "tools/call",
            json!({"name": "get_personal_info", "arguments": {}}),
        ),
    )
    .await;

    let result = &response["result"];
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"]["id"], "user-1");
    let text = result["content"][0]["text"].as_str().unwrap();
    let parsed: Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed["age"], 34);
}

#[tokio::test]
async fn test_tools_call_unknown_tool_is_invalid_params() {
    let processor = processor();
    let response = call(
        &processor,
        request_body(3, "tools/call", json!({"name": "get_weather"})),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_oauth_tools_hidden_in_token_mode() {
    let processor = processor();
    let response = call(
        &processor,
        request_body(
            3,
            "tools/call",
            json!({"name": "get_authorization_url", "arguments": {}}),
        ),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_tools_call_bad_date_is_invalid_params() {
    let processor = processor();
    let response = call(
        &processor,
        request_body(
            3,
            "tools/call",
            json!({"name": "get_daily_sleep", "arguments": {"start_date": "03/01/2024"}}),
        ),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_provider_failure_is_tool_error_result() {
    let provider = Arc::new(MockProvider::default());
    provider.fail_requests();
    let processor = McpRequestProcessor::new(provider);

    let response = call(
        &processor,
        request_body(
            5,
            "tools/call",
            json!({"name": "get_workouts", "arguments": {}}),
        ),
    )
    .await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("upstream unavailable"));
}

#[tokio::test]
async fn test_log_notifications_follow_set_level() {
    let provider = Arc::new(MockProvider::default());
    provider.fail_requests();
    let processor = McpRequestProcessor::new(provider);
    let mut notifications = processor.subscribe();
    let failing_call = request_body(
        6,
        "tools/call",
        json!({"name": "get_tags", "arguments": {}}),
    );

    call(&processor, failing_call.clone()).await;
    assert!(notifications.try_recv().is_err());

    call(
        &processor,
        request_body(7, "logging/setLevel", json!({"level": "critical"})),
    )
    .await;
    call(&processor, failing_call.clone()).await;
    assert!(notifications.try_recv().is_err());

    call(
        &processor,
        request_body(8, "logging/setLevel", json!({"level": "debug"})),
    )
    .await;
    call(&processor, failing_call).await;
    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.method, "notifications/message");
    let params = notification.params.unwrap();
    assert_eq!(params["level"], "error");
    assert_eq!(params["data"]["tool"], "get_tags");
}

#[tokio::test]
async fn test_set_level_rejects_unknown_level() {
    let processor = processor();
    let response = call(
        &processor,
        request_body(9, "logging/setLevel", json!({"level": "verbose"})),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_batch_answers_requests_only() {
    let processor = processor();
    let response = call(
        &processor,
        json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ping"},
            {"jsonrpc": "2.0", "method": "notifications/initialized"},
            {"jsonrpc": "2.0", "id": 2, "method": "tools/list"},
        ]),
    )
    .await;

    let responses = response.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
}

#[tokio::test]
async fn test_empty_batch_is_invalid_request() {
    let processor = processor();
    let response = call(&processor, json!([])).await;
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn test_batch_of_notifications_has_no_response() {
    let processor = processor();
    let result = processor
        .handle_payload(json!([{"jsonrpc": "2.0", "method": "notifications/initialized"}]))
        .await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_client_responses_are_ignored() {
    let processor = processor();
    let result = processor
        .handle_payload(json!({"jsonrpc": "2.0", "id": 10, "result": {}}))
        .await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_invalid_message_is_invalid_request() {
    let processor = processor();
    let response = call(&processor, json!({"jsonrpc": "1.0", "id": 3, "method": "ping"})).await;
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn test_null_id_request_is_invalid_request() {
    let processor = processor();
    let response = call(
        &processor,
        json!({"jsonrpc": "2.0", "id": null, "method": "tools/list"}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32600);
    assert!(response["id"].is_null());
}
