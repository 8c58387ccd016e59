// ABOUTME: Health probe route for the HTTP transport
// ABOUTME: Always reports ok, independent of sessions and API-key configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::paths;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// `GET /health`
    pub fn routes() -> Router {
        Router::new().route(paths::HEALTH, get(health_handler))
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "transport": "streamable-http"
    }))
}
