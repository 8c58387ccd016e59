// ABOUTME: Streamable HTTP routes on /mcp: session creation, request forwarding, SSE, termination
// ABOUTME: Resolves the mcp-session-id header against the session registry before forwarding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! MCP endpoint routing
//!
//! - `POST /mcp` with a known session token forwards to that session. Without
//!   a token, a valid `initialize` body creates a session whose token comes
//!   back in the `Mcp-Session-Id` header. Anything else is a 400.
//! - `GET /mcp` opens the session's SSE stream; `DELETE /mcp` ends the
//!   session. Both need a known token.

use crate::config::Secret;
use crate::errors::ErrorCode;
use crate::constants::json_rpc::{INTERNAL_ERROR, PARSE_ERROR, SERVER_ERROR};
use crate::constants::paths;
use crate::constants::protocol::SESSION_ID_HEADER;
use crate::jsonrpc::JsonRpcResponse;
use crate::mcp::schema::is_initialize_request;
use crate::mcp::SessionRegistry;
use crate::middleware::{api_key_middleware, ApiKeyAuth};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, error, warn};

/// MCP routes implementation
pub struct McpRoutes;

impl McpRoutes {
    /// `/mcp` routes, gated by `api_key` when one is configured
    pub fn routes(registry: SessionRegistry, api_key: Option<Secret>) -> Router {
        let router = Router::new()
            .route(
                paths::MCP,
                post(handle_post).get(handle_get).delete(handle_delete),
            )
            .with_state(registry);

        match api_key {
            Some(key) => router.layer(middleware::from_fn_with_state(
                ApiKeyAuth::new(key),
                api_key_middleware,
            )),
            None => router,
        }
    }
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
}

fn bad_request(code: i32, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(JsonRpcResponse::error(None, code, message)),
    )
        .into_response()
}

fn shutting_down() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(JsonRpcResponse::error(
            None,
            SERVER_ERROR,
            "Server is shutting down",
        )),
    )
        .into_response()
}

async fn handle_post(
    State(registry): State<SessionRegistry>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejected MCP POST with unparsable body: {e}");
            return bad_request(PARSE_ERROR, "Parse error");
        }
    };

    if let Some(token) = session_token(&headers) {
        return match registry.lookup(token) {
            Some(transport) => transport.handle_post(payload).await,
            None => {
                debug!(mcp_session = %token, "POST for unknown session");
                bad_request(SERVER_ERROR, "Bad Request: No valid session")
            }
        };
    }

    if !is_initialize_request(&payload) {
        return bad_request(SERVER_ERROR, "Bad Request: No valid session");
    }

    if registry.is_draining() {
        return shutting_down();
    }

    let pending = registry.begin();
    let response = pending.transport().handle_post(payload).await;
    if pending.transport().session_id().is_none() {
        return response;
    }
    match registry.commit(pending) {
        Ok(_) => response,
        Err(e) if e.code == ErrorCode::ResourceUnavailable => {
            debug!("Refused MCP session during shutdown: {e}");
            shutting_down()
        }
        Err(e) => {
            error!("Failed to register MCP session: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::error(None, INTERNAL_ERROR, "Internal error")),
            )
                .into_response()
        }
    }
}

async fn handle_get(State(registry): State<SessionRegistry>, headers: HeaderMap) -> Response {
    match session_token(&headers).and_then(|token| registry.lookup(token)) {
        Some(transport) => transport.handle_get(),
        None => bad_request(SERVER_ERROR, "Invalid or missing session ID"),
    }
}

async fn handle_delete(State(registry): State<SessionRegistry>, headers: HeaderMap) -> Response {
    match session_token(&headers).and_then(|token| registry.lookup(token)) {
        Some(transport) => transport.handle_delete().await,
        None => bad_request(SERVER_ERROR, "Invalid or missing session ID"),
    }
}
