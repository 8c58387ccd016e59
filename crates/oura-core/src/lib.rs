// ABOUTME: Core types and constants for the Oura MCP server
// ABOUTME: Foundation crate with error handling and protocol/API constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Oura Core
//!
//! Foundation crate shared by the provider crate and the server crate. It
//! changes infrequently, which keeps incremental builds of the workspace cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ProviderError`
//! - **constants**: JSON-RPC error codes, MCP protocol versions, and Oura API endpoints

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
