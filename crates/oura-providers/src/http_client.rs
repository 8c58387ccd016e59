// ABOUTME: Shared pooled HTTP client for Oura API calls
// ABOUTME: Initialized once at startup with configured timeouts, reused by every provider instance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Request timeout used when startup never configured one
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connect timeout used when startup never configured one
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

static CLIENT_TIMEOUTS: OnceLock<(u64, u64)> = OnceLock::new();

static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Record the timeouts for the shared client.
///
/// Only the first call wins, and only if it happens before the first
/// [`shared_client`] call.
pub fn initialize_shared_client(timeout_secs: u64, connect_timeout_secs: u64) {
    if CLIENT_TIMEOUTS
        .set((timeout_secs, connect_timeout_secs))
        .is_err()
    {
        tracing::debug!("shared HTTP client timeouts already configured");
    }
}

/// Pooled client shared by all provider instances.
///
/// The client holds connections only, never credentials, so sharing it
/// across sessions leaks no session state.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let (timeout, connect_timeout) = CLIENT_TIMEOUTS
            .get()
            .copied()
            .unwrap_or((DEFAULT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS));

        ClientBuilder::new()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .user_agent(concat!("oura-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}
