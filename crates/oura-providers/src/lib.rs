// ABOUTME: Oura Ring data provider for the Oura MCP server
// ABOUTME: Provider traits, typed API models, shared HTTP client, and the Oura REST v2 client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Wearable data provider layer.
//!
//! The MCP server depends on [`WearableProvider`] and [`ProviderFactory`]
//! only; [`OuraProvider`] is the production implementation.

pub use oura_core::constants;
pub use oura_core::errors;

/// Core provider traits, credentials, and query ranges
pub mod core;
/// Shared HTTP client for provider API calls
pub mod http_client;
/// Typed Oura API documents
pub mod models;
/// Oura REST API v2 client
pub mod oura_provider;

pub use crate::core::{
    DateRange, DateTimeRange, OAuthToken, OuraCredentials, OuraProviderConfig, ProviderFactory,
    WearableProvider,
};
pub use http_client::{initialize_shared_client, shared_client};
pub use oura_provider::{OuraProvider, OuraProviderFactory};
