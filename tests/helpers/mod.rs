// ABOUTME: Shared helpers for the server integration tests
// ABOUTME: In-process axum request builder and an in-memory wearable provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

pub mod axum_test;
pub mod mock_provider;

use oura_mcp_server::config::{HttpConfig, OuraApiConfig, Secret, ServerConfig, TransportMode};
#[cfg(feature = "transport-http")]
use oura_mcp_server::mcp::SessionRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// HTTP-mode configuration with an optional API key
pub fn http_config(api_key: Option<&str>) -> ServerConfig {
    ServerConfig {
        transport: TransportMode::Http,
        http: HttpConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
            api_key: api_key.map(|key| Secret::new(key.to_owned())),
            shutdown_timeout: Duration::from_secs(1),
        },
        oura: OuraApiConfig {
            personal_access_token: Some(Secret::new("test-pat".to_owned())),
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:3000/callback".to_owned(),
            api_base_url: "http://127.0.0.1:9/v2".to_owned(),
            http_timeout_secs: 5,
        },
    }
}

/// Registry backed by [`mock_provider::MockProviderFactory`]
#[cfg(feature = "transport-http")]
pub fn mock_registry() -> (SessionRegistry, Arc<mock_provider::MockProviderFactory>) {
    let factory = Arc::new(mock_provider::MockProviderFactory::default());
    (SessionRegistry::new(factory.clone()), factory)
}

/// A valid `initialize` request body
pub fn initialize_body(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": { "name": "integration-test", "version": "1.0.0" }
        }
    })
}

/// A JSON-RPC request body
pub fn request_body(id: i64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}
