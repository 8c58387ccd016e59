// ABOUTME: MCP protocol schema definitions and message structures
// ABOUTME: Initialize handshake, capabilities, tool schemas, tool results, and logging levels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! MCP Protocol Schema Definitions
//!
//! Type-safe definitions for the subset of MCP messages this server speaks,
//! so handlers build responses from structs instead of hand-written JSON.

#![deny(missing_docs)]

use crate::constants::protocol::{JSONRPC_VERSION, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS};
use crate::constants::server::{INSTRUCTIONS, SERVER_NAME, SERVER_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Server Information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

/// MCP Tool Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// What the tool returns
    pub description: String,
    /// Argument schema
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// JSON Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type, `object` for tool arguments
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Argument properties by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertySchema>>,
    /// Names of mandatory arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// JSON Schema Property Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    /// JSON type of the argument
    #[serde(rename = "type")]
    pub property_type: String,
    /// Argument description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Format hint such as `date`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// `tools/call` parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool to run
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Tool Response after execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Human-readable content blocks
    pub content: Vec<Content>,
    /// Whether the tool failed
    #[serde(rename = "isError")]
    pub is_error: bool,
    /// Machine-readable result
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl ToolResponse {
    /// Successful result carrying `value` as text and as structured content
    #[must_use]
    pub fn success(value: Value) -> Self {
        let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        Self {
            content: vec![Content::Text { text }],
            is_error: false,
            structured_content: Some(value),
        }
    }

    /// Failed result with a message for the model to read
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text {
                text: message.into(),
            }],
            is_error: true,
            structured_content: None,
        }
    }
}

/// Content types for MCP messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    /// Plain text block
    #[serde(rename = "text")]
    Text {
        /// Text body
        text: String,
    },
}

/// MCP Server Capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Present when the server emits `notifications/message`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    /// Present when the server offers tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    /// Whether the tool list can change during a session
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Logging capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingCapability {}

/// Initialize Request from client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Revision the client asks for
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Client identity, optional in practice
    #[serde(rename = "clientInfo", default)]
    pub client_info: Option<ClientInfo>,
    /// Client capabilities, accepted but unused
    #[serde(default)]
    pub capabilities: Value,
}

/// Client Information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name
    pub name: String,
    /// Client version, empty when omitted
    #[serde(default)]
    pub version: String,
}

/// Complete MCP Initialize Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Negotiated protocol revision
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server identity
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    /// Advertised capabilities
    pub capabilities: ServerCapabilities,
    /// Usage hints for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResponse {
    /// Response advertising tools and logging for the negotiated revision
    #[must_use]
    pub fn new(protocol_version: String) -> Self {
        Self {
            protocol_version,
            server_info: ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: SERVER_VERSION.to_owned(),
            },
            capabilities: ServerCapabilities {
                logging: Some(LoggingCapability {}),
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            instructions: Some(INSTRUCTIONS.to_owned()),
        }
    }
}

/// Pick the revision to speak: the client's if supported, else the latest
#[must_use]
pub fn negotiate_protocol_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .copied()
        .find(|version| *version == requested)
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

/// Whether `value` is a well-formed `initialize` request.
///
/// Only a single object qualifies: `jsonrpc` is `"2.0"`, `method` is
/// `"initialize"`, an `id` is present, and `params.protocolVersion` is a string.
#[must_use]
pub fn is_initialize_request(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    object.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
        && object.get("method").and_then(Value::as_str) == Some("initialize")
        && object.get("id").is_some_and(|id| id.is_string() || id.is_number())
        && object
            .get("params")
            .and_then(|params| params.get("protocolVersion"))
            .is_some_and(Value::is_string)
}

/// Syslog-style severities used by `logging/setLevel` and `notifications/message`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    /// Debug-level messages
    Debug,
    /// Informational messages
    Info,
    /// Normal but significant conditions
    Notice,
    /// Warning conditions
    Warning,
    /// Error conditions
    Error,
    /// Critical conditions
    Critical,
    /// Action must be taken immediately
    Alert,
    /// System is unusable
    Emergency,
}

/// `logging/setLevel` parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SetLevelRequest {
    /// Minimum severity the client wants to receive
    pub level: LoggingLevel,
}

/// `notifications/message` parameters
#[derive(Debug, Clone, Serialize)]
pub struct LoggingMessage {
    /// Severity
    pub level: LoggingLevel,
    /// Emitting component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// Arbitrary payload
    pub data: Value,
}
