// ABOUTME: HTTP route modules for the streamable MCP transport
// ABOUTME: MCP endpoint routes and the health probe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Health probe
pub mod health;
/// `/mcp` endpoint
pub mod mcp;

pub use health::HealthRoutes;
pub use mcp::McpRoutes;
