// ABOUTME: Constants module with domain-separated organization
// ABOUTME: JSON-RPC error codes, MCP protocol versions, and Oura API endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by domain rather than kept in a single flat file.

/// JSON-RPC 2.0 error codes
pub mod json_rpc {
    /// Parse error - Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - Invalid JSON-RPC
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Generic server error, used for session resolution failures
    pub const SERVER_ERROR: i32 = -32000;
}

/// MCP protocol identifiers
pub mod protocol {
    /// JSON-RPC version (standard, not configurable)
    pub const JSONRPC_VERSION: &str = "2.0";

    /// Newest protocol revision this server speaks
    pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

    /// Every protocol revision accepted during `initialize`, newest first
    pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

    /// Header carrying the session token on the streamable HTTP transport
    pub const SESSION_ID_HEADER: &str = "mcp-session-id";

    /// Header carrying the negotiated protocol version on follow-up HTTP requests
    pub const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";
}

/// Oura API endpoints and defaults
pub mod oura {
    /// Provider identifier used in logs and error messages
    pub const PROVIDER_NAME: &str = "oura";

    /// Default REST API base URL
    pub const DEFAULT_API_BASE_URL: &str = "https://api.ouraring.com/v2";

    /// OAuth2 authorization endpoint
    pub const AUTHORIZE_URL: &str = "https://cloud.ouraring.com/oauth/authorize";

    /// OAuth2 token endpoint
    pub const TOKEN_URL: &str = "https://api.ouraring.com/oauth/token";

    /// Default OAuth2 redirect URI
    pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";

    /// Scopes requested during the authorization flow
    pub const DEFAULT_SCOPES: &str = "email personal daily heartrate workout tag session spo2";

    /// Upper bound on `next_token` pages followed for a single collection query
    pub const MAX_PAGES: usize = 50;

    /// Access tokens expiring within this window are refreshed before use
    pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;
}
