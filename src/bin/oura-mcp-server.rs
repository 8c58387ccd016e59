// ABOUTME: Oura MCP server binary: parses flags, loads configuration, runs the selected transport
// ABOUTME: Exits 0 after a clean shutdown and 1 on any startup or runtime error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Oura MCP Server Binary
//!
//! Runs over stdio by default; `--http` or `MCP_TRANSPORT=http` selects the
//! streamable HTTP transport.

use anyhow::{bail, Result};
use clap::Parser;
use oura_mcp_server::{
    config::{ServerConfig, TransportMode},
    constants::server::{SERVER_NAME, SERVER_VERSION},
    logging, server,
};
use oura_providers::initialize_shared_client;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "oura-mcp-server")]
#[command(about = "Oura Ring data for LLM clients over the Model Context Protocol")]
#[command(version)]
struct Args {
    /// Serve streamable HTTP instead of stdio
    #[arg(long)]
    http: bool,

    /// Override the HTTP listening port
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_from_env() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ServerConfig::from_env()?.with_overrides(args.http, args.port);

    info!("Starting {SERVER_NAME} v{SERVER_VERSION}");
    info!("{}", config.summary());

    initialize_shared_client(
        config.oura.http_timeout_secs,
        oura_mcp_server::constants::defaults::OURA_CONNECT_TIMEOUT_SECS,
    );

    match config.transport {
        #[cfg(feature = "transport-http")]
        TransportMode::Http => server::run_http(config).await?,
        #[cfg(feature = "transport-stdio")]
        TransportMode::Stdio => server::run_stdio(config).await?,
        #[allow(unreachable_patterns)]
        mode => bail!("{mode:?} transport is not compiled into this binary"),
    }

    info!("Shutdown complete");
    Ok(())
}
