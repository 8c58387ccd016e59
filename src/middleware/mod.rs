// ABOUTME: HTTP middleware for the streamable MCP endpoint
// ABOUTME: Bearer API-key gate applied ahead of session handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bearer API-key authentication
pub mod auth;

pub use auth::{api_key_middleware, ApiKeyAuth};
