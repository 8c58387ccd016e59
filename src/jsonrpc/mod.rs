// ABOUTME: JSON-RPC 2.0 message types and classification for MCP traffic
// ABOUTME: Request, response, and error structures plus request/notification/response/batch detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # JSON-RPC 2.0 Foundation
//!
//! Both transports carry the same JSON-RPC 2.0 messages. Incoming payloads
//! are classified with [`JsonRpcMessage::from_value`]; batches are split with
//! [`split_batch`] before classification.
//!
//! ```rust
//! use oura_mcp_server::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
//! # use serde_json::json;
//!
//! let request = JsonRpcRequest::with_id("ping", None, json!(7));
//! let response = JsonRpcResponse::success(request.id.clone(), json!({}));
//! assert!(response.is_success());
//! ```

use crate::constants::json_rpc::INVALID_REQUEST;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::constants::protocol::JSONRPC_VERSION;

/// JSON-RPC 2.0 Request (or notification when `id` is absent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Method name to invoke
    pub method: String,

    /// Optional parameters for the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Request identifier (for correlation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Response
///
/// Exactly one of `result` or `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Result of the method call (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request identifier for correlation; serialized as `null` when unknown
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Error Object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new request with a specific ID
    #[must_use]
    pub fn with_id(method: impl Into<String>, params: Option<Value>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Create a notification (no ID, no response expected)
    #[must_use]
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Whether the sender expects a response
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl JsonRpcResponse {
    /// Create a success response
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            error: Some(JsonRpcError::new(code, message)),
            id,
        }
    }

    /// Check if this is a success response
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    /// Check if this is an error response
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl JsonRpcError {
    /// Create a new error
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// A single classified JSON-RPC message
#[derive(Debug, Clone)]
pub enum JsonRpcMessage {
    /// Method call expecting a response
    Request(JsonRpcRequest),
    /// Method call without an id
    Notification(JsonRpcRequest),
    /// Reply to a server-initiated request
    Response(JsonRpcResponse),
}

impl JsonRpcMessage {
    /// Classify one JSON value.
    ///
    /// # Errors
    ///
    /// Returns an `Invalid Request` error response, echoing the id when one
    /// can be recovered, for anything that is not a well-formed 2.0 message.
    pub fn from_value(value: Value) -> Result<Self, JsonRpcResponse> {
        let id = value.get("id").cloned().filter(|id| !id.is_null());

        let Some(object) = value.as_object() else {
            return Err(invalid_request(None, "message must be a JSON object"));
        };
        if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(invalid_request(id, "jsonrpc must be \"2.0\""));
        }

        if object.contains_key("method") {
            if object.get("id").is_some_and(Value::is_null) {
                return Err(invalid_request(None, "id must not be null"));
            }
            let request: JsonRpcRequest = serde_json::from_value(value)
                .map_err(|e| invalid_request(id.clone(), &e.to_string()))?;
            return Ok(if request.is_notification() {
                Self::Notification(request)
            } else {
                Self::Request(request)
            });
        }

        if object.contains_key("result") || object.contains_key("error") {
            let response: JsonRpcResponse = serde_json::from_value(value)
                .map_err(|e| invalid_request(id.clone(), &e.to_string()))?;
            return Ok(Self::Response(response));
        }

        Err(invalid_request(id, "message has neither method nor result"))
    }

    /// Whether this message expects a reply
    #[must_use]
    pub const fn expects_response(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

fn invalid_request(id: Option<Value>, detail: &str) -> JsonRpcResponse {
    JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {detail}"))
}

/// Split a payload into its messages; the flag reports whether it was a batch
#[must_use]
pub fn split_batch(value: Value) -> (Vec<Value>, bool) {
    match value {
        Value::Array(items) => (items, true),
        single => (vec![single], false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifies_request_notification_and_response() {
        let request = JsonRpcMessage::from_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "ping"
        }))
        .unwrap();
        assert!(matches!(request, JsonRpcMessage::Request(_)));
        assert!(request.expects_response());

        let notification = JsonRpcMessage::from_value(json!({
            "jsonrpc": "2.0", "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(matches!(notification, JsonRpcMessage::Notification(_)));

        let response = JsonRpcMessage::from_value(json!({
            "jsonrpc": "2.0", "id": "s-1", "result": {}
        }))
        .unwrap();
        assert!(matches!(response, JsonRpcMessage::Response(_)));
    }

    #[test]
    fn test_version_comes_from_shared_constants() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({}));
        assert_eq!(response.jsonrpc, oura_core::constants::protocol::JSONRPC_VERSION);
        assert_eq!(JSONRPC_VERSION, "2.0");
    }

    #[test]
    fn test_rejects_request_with_null_id() {
        let error = JsonRpcMessage::from_value(json!({
            "jsonrpc": "2.0", "id": null, "method": "tools/list"
        }))
        .unwrap_err();
        assert!(error.id.is_none());
        let error = error.error.unwrap();
        assert_eq!(error.code, INVALID_REQUEST);
        assert!(error.message.contains("id must not be null"));
    }

    #[test]
    fn test_rejects_wrong_version_and_keeps_id() {
        let error = JsonRpcMessage::from_value(json!({
            "jsonrpc": "1.0", "id": 9, "method": "ping"
        }))
        .unwrap_err();
        assert_eq!(error.id, Some(json!(9)));
        assert_eq!(error.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn test_rejects_non_object() {
        let error = JsonRpcMessage::from_value(json!(42)).unwrap_err();
        assert!(error.id.is_none());
        assert!(error.is_error());
    }

    #[test]
    fn test_error_response_serializes_null_id() {
        let response = JsonRpcResponse::error(None, -32000, "Bad Request: No valid session");
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(
            encoded,
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32000, "message": "Bad Request: No valid session" },
                "id": null
            })
        );
    }

    #[test]
    fn test_split_batch() {
        let (items, is_batch) = split_batch(json!([{"a": 1}, {"b": 2}]));
        assert!(is_batch);
        assert_eq!(items.len(), 2);

        let (items, is_batch) = split_batch(json!({"a": 1}));
        assert!(!is_batch);
        assert_eq!(items.len(), 1);
    }
}
