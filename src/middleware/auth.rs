// ABOUTME: Optional bearer API-key gate for the MCP endpoint
// ABOUTME: Compares the Authorization header in constant time and rejects mismatches with 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! API key authentication middleware
//!
//! When an API key is configured, every request to `/mcp` must carry
//! `Authorization: Bearer <key>`. The check runs before any session lookup.
//!
//! ```rust,no_run
//! use axum::{middleware, routing::post, Router};
//! use oura_mcp_server::config::Secret;
//! use oura_mcp_server::middleware::{api_key_middleware, ApiKeyAuth};
//!
//! # async fn handler() -> &'static str { "" }
//! let auth = ApiKeyAuth::new(Secret::new("my-key".to_owned()));
//! let app: Router = Router::new()
//!     .route("/mcp", post(handler))
//!     .layer(middleware::from_fn_with_state(auth, api_key_middleware));
//! ```

use crate::config::Secret;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Expected bearer credential
#[derive(Clone)]
pub struct ApiKeyAuth {
    expected: Arc<String>,
}

impl ApiKeyAuth {
    /// Gate accepting `Authorization: Bearer <key>`
    #[must_use]
    pub fn new(key: Secret) -> Self {
        Self {
            expected: Arc::new(format!("Bearer {}", key.expose())),
        }
    }

    /// Whether the raw `Authorization` header value matches
    #[must_use]
    pub fn verify(&self, authorization: Option<&str>) -> bool {
        authorization.is_some_and(|value| {
            bool::from(value.as_bytes().ct_eq(self.expected.as_bytes()))
        })
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("expected", &"[REDACTED]")
            .finish()
    }
}

/// Reject requests whose bearer token does not match the configured key
pub async fn api_key_middleware(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !auth.verify(authorization) {
        warn!(
            method = %request.method(),
            uri = %request.uri(),
            has_header = authorization.is_some(),
            "Rejected MCP request with missing or invalid API key"
        );
        return unauthorized();
    }

    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}
