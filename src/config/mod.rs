// ABOUTME: Configuration module for the Oura MCP server
// ABOUTME: Environment-driven settings for transports, the HTTP boundary, and Oura API access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and server configuration
pub mod environment;

pub use environment::{HttpConfig, OuraApiConfig, Secret, ServerConfig, TransportMode};
