// ABOUTME: Process lifecycle for both transports: router assembly, listener, signals, session drain
// ABOUTME: HTTP mode serves /mcp and /health until interrupted; stdio mode runs until stdin closes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server lifecycle
//!
//! HTTP mode binds `host:port`, serves the MCP and health routes, and on
//! SIGINT/SIGTERM closes every live session before the listener stops. Each
//! session close is bounded by the configured shutdown timeout; sessions
//! that overrun are dropped from the registry anyway.
//!
//! Each transport is compiled only with its feature: `transport-http` or
//! `transport-stdio`.

use tracing::{info, warn};

#[cfg(feature = "transport-http")]
pub use http::{build_router, drain_sessions, run_http};
#[cfg(feature = "transport-stdio")]
pub use stdio::run_stdio;

#[cfg(feature = "transport-http")]
mod http {
    use super::shutdown_signal;
    use crate::config::ServerConfig;
    use crate::errors::{AppError, AppResult};
    use crate::mcp::SessionRegistry;
    use crate::routes::{HealthRoutes, McpRoutes};
    use axum::http::HeaderName;
    use axum::Router;
    use oura_providers::{OuraProviderFactory, ProviderFactory};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
    use tower_http::trace::TraceLayer;
    use tracing::{info, warn};

    const REQUEST_ID_HEADER: &str = "x-request-id";

    /// Assemble the HTTP application: `/mcp` (optionally key-gated) and `/health`
    pub fn build_router(registry: SessionRegistry, config: &ServerConfig) -> Router {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        Router::new()
            .merge(McpRoutes::routes(registry, config.http.api_key.clone()))
            .merge(HealthRoutes::routes())
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// Run the streamable HTTP transport until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the provider configuration is invalid, the listener
    /// cannot bind, or the server fails while serving
    pub async fn run_http(config: ServerConfig) -> AppResult<()> {
        let factory: Arc<dyn ProviderFactory> =
            Arc::new(OuraProviderFactory::new(config.provider_config()?));
        let registry = SessionRegistry::new(factory);
        let app = build_router(registry.clone(), &config);

        let address = format!("{}:{}", config.http.host, config.http.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            AppError::internal(format!("Failed to bind {address}")).with_source(e)
        })?;
        info!(
            "Oura MCP HTTP server listening on port {}",
            config.http.port
        );

        let shutdown_timeout = config.http.shutdown_timeout;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                drain_sessions(&registry, shutdown_timeout).await;
            })
            .await
            .map_err(|e| AppError::internal("HTTP server failed").with_source(e))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Refuse new sessions, then close every live one, each bounded by `timeout`
    pub async fn drain_sessions(registry: &SessionRegistry, timeout: Duration) {
        let report = registry.close_all(timeout).await;
        if report.timed_out > 0 {
            warn!(
                closed = report.closed,
                timed_out = report.timed_out,
                "Some sessions did not close cleanly"
            );
        } else {
            info!(closed = report.closed, "All MCP sessions closed");
        }
    }
}

#[cfg(feature = "transport-stdio")]
mod stdio {
    use super::shutdown_signal;
    use crate::config::ServerConfig;
    use crate::errors::AppResult;
    use crate::mcp::StdioTransport;
    use oura_providers::{OuraProviderFactory, ProviderFactory};
    use tracing::info;

    /// Run the stdio transport until stdin closes or an interrupt arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the provider configuration is invalid or stdio fails
    pub async fn run_stdio(config: ServerConfig) -> AppResult<()> {
        let factory = OuraProviderFactory::new(config.provider_config()?);
        let transport = StdioTransport::new(factory.create());

        tokio::select! {
            result = transport.run() => result,
            () = shutdown_signal() => {
                info!("Interrupted, stopping stdio transport");
                Ok(())
            }
        }
    }
}

/// Resolve on Ctrl+C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Shutdown signal received");
}
