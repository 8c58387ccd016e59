// ABOUTME: Library entry point for the Oura MCP server
// ABOUTME: Exposes Oura Ring data as MCP tools over stdio or streamable HTTP with session multiplexing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Oura MCP Server
//!
//! A Model Context Protocol server that lets LLM clients query Oura Ring
//! sleep, activity, readiness, heart-rate and related data.
//!
//! ## Transports
//!
//! - **stdio**: one session over newline-delimited JSON-RPC on stdin/stdout.
//! - **streamable HTTP**: `POST/GET/DELETE /mcp`, many concurrent sessions
//!   keyed by the `Mcp-Session-Id` header, each with its own provider
//!   instance. `GET /health` reports liveness.
//!
//! ## Architecture
//!
//! - **`oura-core`**: error types and shared constants
//! - **`oura-providers`**: typed Oura REST client behind the `WearableProvider` trait
//! - **`mcp`**: protocol schema, tools, request processing, transports, session registry
//! - **`routes`** / **`middleware`**: axum routes and the bearer API-key gate
//! - **`server`**: process lifecycle, signals, and the shutdown drain
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use oura_mcp_server::config::ServerConfig;
//! use oura_mcp_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("{}", config.summary());
//!     oura_mcp_server::server::run_http(config).await
//! }
//! ```

/// Environment configuration
pub mod config;

/// Application constants
pub mod constants;

/// Error types re-exported from `oura-core`
pub mod errors;

/// JSON-RPC 2.0 message types
pub mod jsonrpc;

/// Structured logging setup
pub mod logging;

/// MCP protocol layer and transports
pub mod mcp;

/// HTTP middleware
#[cfg(feature = "transport-http")]
pub mod middleware;

/// HTTP routes
#[cfg(feature = "transport-http")]
pub mod routes;

/// Process lifecycle
pub mod server;
