// ABOUTME: Streamable HTTP transport for one MCP session: POST handling, SSE notification stream, close
// ABOUTME: Mints the session token during the initialize handshake and serializes requests per session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Per-session half of the streamable HTTP transport.
//!
//! A transport starts without a session id. The first `initialize` request
//! it processes mints a UUID v4 token, which is returned in the
//! `Mcp-Session-Id` header and fixed for the transport's lifetime. Requests
//! on one transport are processed one at a time; separate transports run
//! concurrently.

use super::request_processor::McpRequestProcessor;
use super::schema::is_initialize_request;
use crate::constants::defaults::SSE_KEEPALIVE_SECS;
use crate::constants::json_rpc::{INVALID_REQUEST, SERVER_ERROR};
use crate::constants::protocol::SESSION_ID_HEADER;
use crate::jsonrpc::JsonRpcResponse;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use oura_providers::WearableProvider;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Callback run once when the transport closes, with the session token
pub type CloseHook = Box<dyn FnOnce(&str) + Send>;

/// One MCP session over streamable HTTP
pub struct StreamableHttpTransport {
    processor: McpRequestProcessor,
    session_id: OnceLock<String>,
    request_lock: Mutex<()>,
    closed: AtomicBool,
    closed_signal: watch::Sender<bool>,
    on_close: std::sync::Mutex<Option<CloseHook>>,
}

impl StreamableHttpTransport {
    /// Transport bound to a fresh provider, not yet initialized
    #[must_use]
    pub fn new(provider: Arc<dyn WearableProvider>) -> Self {
        let (closed_signal, _) = watch::channel(false);
        Self {
            processor: McpRequestProcessor::new(provider),
            session_id: OnceLock::new(),
            request_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
            closed_signal,
            on_close: std::sync::Mutex::new(None),
        }
    }

    /// Session token, once the initialize handshake has run
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    /// Whether [`Self::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Request processor for this session
    #[must_use]
    pub const fn processor(&self) -> &McpRequestProcessor {
        &self.processor
    }

    /// Install the hook run on close; replaces any previous hook
    pub fn set_on_close(&self, hook: CloseHook) {
        *self
            .on_close
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Handle a POSTed JSON-RPC payload
    pub async fn handle_post(&self, payload: Value) -> Response {
        let _guard = self.request_lock.lock().await;
        if self.is_closed() {
            return session_terminated();
        }

        if is_initialize_request(&payload) {
            if self.session_id.get().is_some() {
                return json_rpc_error(
                    StatusCode::BAD_REQUEST,
                    payload.get("id").cloned(),
                    INVALID_REQUEST,
                    "Invalid Request: Server already initialized",
                );
            }
            let token = Uuid::new_v4().to_string();
            self.processor.set_session_label(token.clone());
            if self.session_id.set(token).is_err() {
                debug!("session id raced with a concurrent initialize");
            }
        } else if self.session_id.get().is_none() {
            return json_rpc_error(
                StatusCode::BAD_REQUEST,
                None,
                SERVER_ERROR,
                "Bad Request: Server not initialized",
            );
        }

        let response = self.processor.handle_payload(payload).await;
        let session_id = self.session_id.get().cloned().unwrap_or_default();

        match response {
            Some(body) => (
                StatusCode::OK,
                [(SESSION_ID_HEADER, session_id)],
                Json(body),
            )
                .into_response(),
            None => (StatusCode::ACCEPTED, [(SESSION_ID_HEADER, session_id)]).into_response(),
        }
    }

    /// Open the server-to-client SSE stream for this session
    pub fn handle_get(&self) -> Response {
        if self.is_closed() {
            return session_terminated();
        }

        let mut notifications = self.processor.subscribe();
        let mut closed = self.closed_signal.subscribe();
        let session_id = self.session_id.get().cloned().unwrap_or_default();
        debug!(mcp_session = %session_id, "SSE stream opened");

        let stream = async_stream::stream! {
            loop {
                let message = tokio::select! {
                    message = notifications.recv() => message,
                    _ = closed.wait_for(|closed| *closed) => break,
                };
                match message {
                    Ok(notification) => match serde_json::to_string(&notification) {
                        Ok(data) => yield Ok::<Event, Infallible>(Event::default().event("message").data(data)),
                        Err(e) => warn!("Failed to serialize notification: {e}"),
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("SSE stream lagged, skipped {skipped} notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        (
            [(SESSION_ID_HEADER, session_id)],
            Sse::new(stream).keep_alive(
                KeepAlive::new().interval(Duration::from_secs(SSE_KEEPALIVE_SECS)),
            ),
        )
            .into_response()
    }

    /// Terminate the session at the client's request
    pub async fn handle_delete(&self) -> Response {
        self.close().await;
        StatusCode::OK.into_response()
    }

    /// Close the transport.
    ///
    /// Waits for an in-flight request, ends open SSE streams, then runs the
    /// close hook. Later calls return immediately.
    pub async fn close(&self) {
        let guard = self.request_lock.lock().await;
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.closed_signal.send_replace(true);
        drop(guard);

        let hook = self
            .on_close
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let session_id = self.session_id().unwrap_or_default();
        info!(mcp_session = %session_id, "MCP session closed");
        if let Some(hook) = hook {
            hook(session_id);
        }
    }
}

fn json_rpc_error(
    status: StatusCode,
    id: Option<Value>,
    code: i32,
    message: &str,
) -> Response {
    (status, Json(JsonRpcResponse::error(id, code, message))).into_response()
}

fn session_terminated() -> Response {
    json_rpc_error(
        StatusCode::NOT_FOUND,
        None,
        SERVER_ERROR,
        "Session terminated",
    )
}
