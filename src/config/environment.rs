// ABOUTME: Environment configuration for the Oura MCP server
// ABOUTME: Loads .env and process variables once at startup, validates credentials, renders a secret-free summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration.
//!
//! Configuration is read once, validated, and never mutated afterwards apart
//! from command-line overrides applied before the server starts. Empty
//! strings are treated exactly like unset variables.

use crate::constants::{defaults, oura};
use crate::errors::{AppError, AppResult};
use oura_providers::{OuraCredentials, OuraProviderConfig};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which transport the process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP with session multiplexing
    Http,
}

impl TransportMode {
    /// Interpret `MCP_TRANSPORT`; anything but `http` means stdio
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("http") => Self::Http,
            None | Some("") => Self::Stdio,
            Some(v) if v.eq_ignore_ascii_case("stdio") => Self::Stdio,
            Some(other) => {
                warn!("Unknown MCP_TRANSPORT '{other}', using stdio");
                Self::Stdio
            }
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "streamable-http"),
        }
    }
}

/// String that never appears in `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Borrow the secret
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// HTTP transport settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Bearer key required on `/mcp` when set
    pub api_key: Option<Secret>,
    /// Upper bound for closing one session during shutdown
    pub shutdown_timeout: Duration,
}

/// Oura API access settings
#[derive(Debug, Clone)]
pub struct OuraApiConfig {
    /// Personal access token
    pub personal_access_token: Option<Secret>,
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<Secret>,
    /// OAuth redirect URI
    pub redirect_uri: String,
    /// REST API base URL
    pub api_base_url: String,
    /// Upstream request timeout
    pub http_timeout_secs: u64,
}

/// Process-wide configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Selected transport
    pub transport: TransportMode,
    /// HTTP transport settings (used in HTTP mode only)
    pub http: HttpConfig,
    /// Oura API settings
    pub oura: OuraApiConfig,
}

impl ServerConfig {
    /// Load configuration from `.env` and the process environment, then validate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparsable values or missing credentials.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {e}");
        }

        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from an arbitrary variable source without validating credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparsable numeric values.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let credential = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Ok(Self {
            transport: TransportMode::from_env_value(var("MCP_TRANSPORT").as_deref()),
            http: HttpConfig {
                host: var("MCP_HOST").unwrap_or_else(|| defaults::HTTP_HOST.to_owned()),
                port: parse_or("MCP_PORT", var("MCP_PORT"), defaults::HTTP_PORT)?,
                api_key: var("MCP_API_KEY").map(Secret::new),
                shutdown_timeout: Duration::from_secs(parse_or(
                    "MCP_SHUTDOWN_TIMEOUT_SECS",
                    var("MCP_SHUTDOWN_TIMEOUT_SECS"),
                    defaults::SHUTDOWN_TIMEOUT_SECS,
                )?),
            },
            oura: OuraApiConfig {
                personal_access_token: credential("OURA_PERSONAL_ACCESS_TOKEN").map(Secret::new),
                client_id: credential("OURA_CLIENT_ID"),
                client_secret: credential("OURA_CLIENT_SECRET").map(Secret::new),
                redirect_uri: var("OURA_REDIRECT_URI")
                    .unwrap_or_else(|| oura::DEFAULT_REDIRECT_URI.to_owned()),
                api_base_url: var("OURA_API_BASE_URL")
                    .unwrap_or_else(|| oura::DEFAULT_API_BASE_URL.to_owned()),
                http_timeout_secs: parse_or(
                    "OURA_HTTP_TIMEOUT_SECS",
                    var("OURA_HTTP_TIMEOUT_SECS"),
                    defaults::OURA_HTTP_TIMEOUT_SECS,
                )?,
            },
        })
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Fails unless a personal access token, or both client id and client
    /// secret, are configured.
    pub fn validate(&self) -> AppResult<()> {
        self.credentials().map(|_| ())
    }

    /// Credentials in the shape the provider expects
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::validate`].
    pub fn credentials(&self) -> AppResult<OuraCredentials> {
        OuraCredentials::from_parts(
            self.oura
                .personal_access_token
                .as_ref()
                .map_or("", Secret::expose),
            self.oura.client_id.as_deref().unwrap_or(""),
            self.oura.client_secret.as_ref().map_or("", Secret::expose),
            &self.oura.redirect_uri,
        )
    }

    /// Provider configuration derived from this server configuration
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::validate`].
    pub fn provider_config(&self) -> AppResult<OuraProviderConfig> {
        Ok(OuraProviderConfig::new(
            self.credentials()?,
            self.oura.api_base_url.clone(),
        ))
    }

    /// Apply command-line overrides; flags win over the environment
    #[must_use]
    pub fn with_overrides(mut self, force_http: bool, port: Option<u16>) -> Self {
        if force_http {
            self.transport = TransportMode::Http;
        }
        if let Some(port) = port {
            self.http.port = port;
        }
        self
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        let auth = if self.oura.personal_access_token.is_some() {
            "personal access token"
        } else {
            "OAuth client"
        };
        let mut summary = format!(
            "Oura MCP Server Configuration:\n\
             - Transport: {}\n\
             - Oura API: {}\n\
             - Oura Auth: {}\n\
             - Upstream Timeout: {}s",
            self.transport, self.oura.api_base_url, auth, self.oura.http_timeout_secs,
        );
        if self.transport == TransportMode::Http {
            summary.push_str(&format!(
                "\n - Listen: {}:{}\n - API Key: {}\n - Shutdown Timeout: {}s",
                self.http.host,
                self.http.port,
                if self.http.api_key.is_some() {
                    "Enabled"
                } else {
                    "Disabled"
                },
                self.http.shutdown_timeout.as_secs(),
            ));
        }
        summary
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}")))
    })
}
