// ABOUTME: Model Context Protocol layer: schema, tools, request processing, and transports
// ABOUTME: Stdio transport for one local client, streamable HTTP transport plus session registry for many
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Per-session JSON-RPC method routing
pub mod request_processor;
/// MCP protocol types
pub mod schema;
/// Live HTTP sessions keyed by token
#[cfg(feature = "transport-http")]
pub mod session_registry;
/// Newline-delimited JSON-RPC over stdin/stdout
#[cfg(feature = "transport-stdio")]
pub mod stdio_transport;
/// One streamable HTTP session
#[cfg(feature = "transport-http")]
pub mod streamable_http;
/// Oura tool catalogue and dispatch
pub mod tools;

pub use request_processor::McpRequestProcessor;
#[cfg(feature = "transport-http")]
pub use session_registry::{DrainReport, PendingSession, SessionRegistry};
#[cfg(feature = "transport-stdio")]
pub use stdio_transport::StdioTransport;
#[cfg(feature = "transport-http")]
pub use streamable_http::StreamableHttpTransport;
