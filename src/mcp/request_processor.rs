// ABOUTME: MCP request processor bound to one provider instance
// ABOUTME: Routes JSON-RPC methods, runs tools, tracks the client log level, and emits server notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! One [`McpRequestProcessor`] exists per session: the single stdio session,
//! or each streamable HTTP session. It owns that session's provider and the
//! broadcast channel its server notifications travel on.

use super::schema::{
    negotiate_protocol_version, InitializeRequest, InitializeResponse, LoggingLevel,
    LoggingMessage, SetLevelRequest, ToolCall, ToolResponse,
};
use super::tools::{self, ToolError};
use crate::constants::defaults::NOTIFICATION_CHANNEL_CAPACITY;
use crate::constants::json_rpc::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::jsonrpc::{split_batch, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse};
use crate::logging::AppLogger;
use oura_providers::WearableProvider;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Handles MCP messages for a single session
pub struct McpRequestProcessor {
    provider: Arc<dyn WearableProvider>,
    session_label: OnceLock<String>,
    log_level: RwLock<Option<LoggingLevel>>,
    notifications: broadcast::Sender<JsonRpcRequest>,
}

impl McpRequestProcessor {
    /// Create a processor that serves `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn WearableProvider>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self {
            provider,
            session_label: OnceLock::new(),
            log_level: RwLock::new(None),
            notifications,
        }
    }

    /// Name this session in logs; only the first call has an effect
    pub fn set_session_label(&self, label: impl Into<String>) {
        if self.session_label.set(label.into()).is_err() {
            debug!("session label already set");
        }
    }

    fn session_label(&self) -> &str {
        self.session_label.get().map_or("pending", String::as_str)
    }

    /// Receive server-initiated notifications for this session
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<JsonRpcRequest> {
        self.notifications.subscribe()
    }

    /// The provider this session talks to
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn WearableProvider> {
        &self.provider
    }

    /// Handle a raw JSON payload (single message or batch).
    ///
    /// Returns `None` when nothing needs to be sent back: the payload held
    /// only notifications or responses.
    pub async fn handle_payload(&self, payload: Value) -> Option<Value> {
        let (items, is_batch) = split_batch(payload);
        if is_batch && items.is_empty() {
            return Some(to_value(&JsonRpcResponse::error(
                None,
                crate::constants::json_rpc::INVALID_REQUEST,
                "Invalid Request: empty batch",
            )));
        }

        let mut responses = Vec::with_capacity(items.len());
        for item in items {
            let response = match JsonRpcMessage::from_value(item) {
                Ok(JsonRpcMessage::Request(request) | JsonRpcMessage::Notification(request)) => {
                    self.handle_request(request).await
                }
                Ok(JsonRpcMessage::Response(response)) => {
                    debug!(id = ?response.id, "Ignoring client response; no server requests are outstanding");
                    None
                }
                Err(error_response) => Some(error_response),
            };
            if let Some(response) = response {
                responses.push(to_value(&response));
            }
        }

        if is_batch {
            (!responses.is_empty()).then_some(Value::Array(responses))
        } else {
            responses.pop()
        }
    }

    /// Handle an MCP request and return a response (None for notifications)
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let start_time = Instant::now();
        debug!(
            mcp_session = %self.session_label(),
            mcp_method = %request.method,
            mcp_id = ?request.id,
            "Received MCP request"
        );

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => Self::handle_initialize(&request),
            "ping" => JsonRpcResponse::success(request.id.clone(), json!({})),
            "tools/list" => self.handle_tools_list(&request),
            "tools/call" => self.handle_tools_call(&request).await,
            "logging/setLevel" => self.handle_set_level(&request),
            _ => JsonRpcResponse::error(
                request.id.clone(),
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        debug!(
            duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(0),
            "Completed MCP {} processing", request.method
        );
        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => {
                debug!(mcp_session = %self.session_label(), "Client finished initialization");
            }
            "notifications/cancelled" => {
                // Requests on a session are serialized; nothing is in flight here.
                debug!(params = ?request.params, "Cancellation notice received");
            }
            other => debug!("Unknown notification type: {other}"),
        }
    }

    fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeRequest = match parse_params(request) {
            Ok(params) => params,
            Err(response) => return response,
        };
        let version = negotiate_protocol_version(&params.protocol_version);
        if version != params.protocol_version {
            warn!(
                requested = %params.protocol_version,
                negotiated = %version,
                "Client requested unsupported protocol version"
            );
        }
        debug!(
            client = ?params.client_info.as_ref().map(|c| &c.name),
            protocol_version = %version,
            "Handling initialize request"
        );
        JsonRpcResponse::success(
            request.id.clone(),
            to_value(&InitializeResponse::new(version.to_owned())),
        )
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = tools::list_tools(self.provider.supports_oauth());
        JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let call: ToolCall = match parse_params(request) {
            Ok(call) => call,
            Err(response) => return response,
        };

        let start_time = Instant::now();
        let outcome = tools::call_tool(
            self.provider.as_ref(),
            &call.name,
            call.arguments,
            self.provider.supports_oauth(),
        )
        .await;
        let duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(0);

        let tool_response = match outcome {
            Ok(value) => {
                AppLogger::log_mcp_tool_call(self.session_label(), &call.name, true, duration_ms);
                ToolResponse::success(value)
            }
            Err(error @ (ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. })) => {
                return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, error.to_string());
            }
            Err(ToolError::Provider(error)) => {
                AppLogger::log_mcp_tool_call(self.session_label(), &call.name, false, duration_ms);
                warn!(tool = %call.name, code = ?error.code, "Tool call failed: {}", error.message);
                self.emit_log(
                    LoggingLevel::Error,
                    json!({ "tool": call.name, "error": error.to_string() }),
                );
                ToolResponse::error(error.to_string())
            }
        };

        match serde_json::to_value(&tool_response) {
            Ok(result) => JsonRpcResponse::success(request.id.clone(), result),
            Err(e) => {
                error!("Failed to serialize tool response: {e}");
                JsonRpcResponse::error(request.id.clone(), INTERNAL_ERROR, "Internal error")
            }
        }
    }

    fn handle_set_level(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params: SetLevelRequest = match parse_params(request) {
            Ok(params) => params,
            Err(response) => return response,
        };
        *self
            .log_level
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(params.level);
        debug!(level = ?params.level, "Client log level updated");
        JsonRpcResponse::success(request.id.clone(), json!({}))
    }

    /// Send `notifications/message` if the client asked for `level` or lower.
    ///
    /// Dropped silently when the client never called `logging/setLevel` or
    /// when nobody is listening.
    pub fn emit_log(&self, level: LoggingLevel, data: Value) {
        let threshold = *self
            .log_level
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if !threshold.is_some_and(|threshold| level >= threshold) {
            return;
        }

        let message = LoggingMessage {
            level,
            logger: Some(crate::constants::oura::PROVIDER_NAME.to_owned()),
            data,
        };
        let notification =
            JsonRpcRequest::notification("notifications/message", Some(to_value(&message)));
        if self.notifications.send(notification).is_err() {
            debug!("No listeners for server notification");
        }
    }
}

fn parse_params<T: DeserializeOwned>(request: &JsonRpcRequest) -> Result<T, JsonRpcResponse> {
    let params = request.params.clone().unwrap_or(Value::Null);
    serde_json::from_value(params).map_err(|e| {
        JsonRpcResponse::error(
            request.id.clone(),
            INVALID_PARAMS,
            format!("Invalid params for {}: {e}", request.method),
        )
    })
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
