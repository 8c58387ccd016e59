// ABOUTME: Error types for the Oura MCP server
// ABOUTME: Re-exports the shared AppError/ErrorCode system from oura-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use oura_core::errors::provider::{ProviderError, ProviderResult};
pub use oura_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails};
