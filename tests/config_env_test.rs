// ABOUTME: Integration tests for loading ServerConfig from the process environment
// ABOUTME: Serialized with serial_test because they mutate environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use oura_mcp_server::config::{ServerConfig, TransportMode};
use oura_mcp_server::errors::ErrorCode;
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "OURA_PERSONAL_ACCESS_TOKEN",
    "OURA_CLIENT_ID",
    "OURA_CLIENT_SECRET",
    "OURA_REDIRECT_URI",
    "OURA_API_BASE_URL",
    "OURA_HTTP_TIMEOUT_SECS",
    "MCP_TRANSPORT",
    "MCP_HOST",
    "MCP_PORT",
    "MCP_API_KEY",
    "MCP_SHUTDOWN_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_with_personal_access_token() {
    clear_env();
    env::set_var("OURA_PERSONAL_ACCESS_TOKEN", "pat-value");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.transport, TransportMode::Stdio);
    assert_eq!(config.http.port, 3000);
    assert!(config.http.api_key.is_none());
    assert_eq!(config.http.shutdown_timeout.as_secs(), 5);
    assert_eq!(config.oura.api_base_url, "https://api.ouraring.com/v2");
    assert!(!config.summary().contains("pat-value"));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_http_mode_settings() {
    clear_env();
    env::set_var("OURA_CLIENT_ID", "client");
    env::set_var("OURA_CLIENT_SECRET", "secret");
    env::set_var("MCP_TRANSPORT", "HTTP");
    env::set_var("MCP_PORT", "8080");
    env::set_var("MCP_API_KEY", "bearer-key");
    env::set_var("MCP_SHUTDOWN_TIMEOUT_SECS", "2");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.transport, TransportMode::Http);
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.http.api_key.as_ref().unwrap().expose(), "bearer-key");
    assert_eq!(config.http.shutdown_timeout.as_secs(), 2);

    let summary = config.summary();
    assert!(!summary.contains("bearer-key"));
    assert!(!summary.contains("secret"));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_without_credentials_fails() {
    clear_env();
    env::set_var("OURA_CLIENT_ID", "client-only");

    let error = ServerConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigMissing);

    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_bad_port() {
    clear_env();
    env::set_var("OURA_PERSONAL_ACCESS_TOKEN", "pat-value");
    env::set_var("MCP_PORT", "not-a-port");

    let error = ServerConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_win() {
    clear_env();
    env::set_var("OURA_PERSONAL_ACCESS_TOKEN", "pat-value");
    env::set_var("MCP_PORT", "4000");

    let config = ServerConfig::from_env()
        .unwrap()
        .with_overrides(true, Some(5000));
    assert_eq!(config.transport, TransportMode::Http);
    assert_eq!(config.http.port, 5000);

    clear_env();
}
