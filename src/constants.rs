// ABOUTME: Server-wide constants for the Oura MCP server
// ABOUTME: Tool names, HTTP paths, and configuration defaults, plus re-exported core constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Protocol and Oura constants live in `oura-core` and are re-exported here so
//! the server reads them from one place.

pub use oura_core::constants::{json_rpc, oura, protocol};

/// Server identity reported during `initialize`
pub mod server {
    /// Server name
    pub const SERVER_NAME: &str = "oura-mcp-server";

    /// Server version, taken from the package manifest
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Instructions returned to clients during `initialize`
    pub const INSTRUCTIONS: &str = "Tools expose the user's Oura Ring data: sleep, activity, readiness, heart rate, workouts, sessions, SpO2, stress and tags. Date arguments use YYYY-MM-DD.";
}

/// HTTP surface
pub mod paths {
    /// MCP endpoint for POST, GET and DELETE
    pub const MCP: &str = "/mcp";

    /// Liveness probe
    pub const HEALTH: &str = "/health";
}

/// Defaults for environment-driven configuration
pub mod defaults {
    /// Bind address in HTTP mode
    pub const HTTP_HOST: &str = "0.0.0.0";

    /// Listening port in HTTP mode
    pub const HTTP_PORT: u16 = 3000;

    /// Upper bound for closing one session during shutdown
    pub const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

    /// Request timeout for calls to the Oura API
    pub const OURA_HTTP_TIMEOUT_SECS: u64 = 30;

    /// Connect timeout for calls to the Oura API
    pub const OURA_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Interval between SSE keep-alive comments
    pub const SSE_KEEPALIVE_SECS: u64 = 15;

    /// Buffered server notifications per session before slow listeners lag
    pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;
}

/// MCP tool names
pub mod tools {
    /// Ring owner profile
    pub const GET_PERSONAL_INFO: &str = "get_personal_info";
    /// Daily sleep scores
    pub const GET_DAILY_SLEEP: &str = "get_daily_sleep";
    /// Detailed sleep periods
    pub const GET_SLEEP_PERIODS: &str = "get_sleep_periods";
    /// Daily activity summaries
    pub const GET_DAILY_ACTIVITY: &str = "get_daily_activity";
    /// Daily readiness scores
    pub const GET_DAILY_READINESS: &str = "get_daily_readiness";
    /// Heart rate samples
    pub const GET_HEART_RATE: &str = "get_heart_rate";
    /// Workouts
    pub const GET_WORKOUTS: &str = "get_workouts";
    /// Meditation and breathing sessions
    pub const GET_SESSIONS: &str = "get_sessions";
    /// Daily SpO2
    pub const GET_DAILY_SPO2: &str = "get_daily_spo2";
    /// Daily stress
    pub const GET_DAILY_STRESS: &str = "get_daily_stress";
    /// User tags
    pub const GET_TAGS: &str = "get_tags";
    /// OAuth authorization URL (OAuth client mode only)
    pub const GET_AUTHORIZATION_URL: &str = "get_authorization_url";
    /// OAuth code exchange (OAuth client mode only)
    pub const EXCHANGE_AUTHORIZATION_CODE: &str = "exchange_authorization_code";
}
