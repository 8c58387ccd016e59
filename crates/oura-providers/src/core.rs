// ABOUTME: Core provider traits and request types for wearable health data access
// ABOUTME: Defines WearableProvider, ProviderFactory, credentials, and query ranges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Provider Abstractions
//!
//! The MCP layer talks to wearable data through [`WearableProvider`] and builds
//! instances through [`ProviderFactory`]. Each MCP session receives its own
//! provider instance, so implementations may keep per-session state such as
//! OAuth tokens without any cross-session sharing.
//!
//! ## Request Side
//!
//! - [`DateRange`]: calendar-day bounds used by daily collections
//! - [`DateTimeRange`]: instant bounds used by heart rate samples
//!
//! ## Response Side
//!
//! Providers return the typed documents in [`crate::models`]. Pagination is
//! resolved inside the provider, callers always receive complete lists.

use crate::errors::{AppError, AppResult};
use crate::models::{
    DailyActivity, DailyReadiness, DailySleep, DailySpo2, DailyStress, EnhancedTag,
    HeartRateSample, MindfulSession, PersonalInfo, SleepPeriod, Workout,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Credentials accepted by the Oura API
#[derive(Clone, PartialEq, Eq)]
pub enum OuraCredentials {
    /// Long-lived personal access token
    PersonalAccessToken(String),
    /// Registered OAuth2 application; user tokens are obtained at runtime
    OAuthClient {
        /// OAuth client id
        client_id: String,
        /// OAuth client secret
        client_secret: String,
        /// Redirect URI registered with Oura
        redirect_uri: String,
    },
}

impl OuraCredentials {
    /// Pick the credential shape from raw configuration values.
    ///
    /// A non-empty personal access token wins. Otherwise both client id and
    /// secret must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when neither shape is complete.
    pub fn from_parts(
        personal_access_token: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> AppResult<Self> {
        if !personal_access_token.is_empty() {
            return Ok(Self::PersonalAccessToken(personal_access_token.to_owned()));
        }
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(AppError::config_missing(
                "Either OURA_PERSONAL_ACCESS_TOKEN or both OURA_CLIENT_ID and OURA_CLIENT_SECRET must be provided",
            ));
        }
        Ok(Self::OAuthClient {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
        })
    }

    /// Whether these credentials drive the OAuth2 authorization flow
    #[must_use]
    pub const fn is_oauth_client(&self) -> bool {
        matches!(self, Self::OAuthClient { .. })
    }
}

// Secrets never reach log output.
impl fmt::Debug for OuraCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonalAccessToken(_) => f
                .debug_tuple("PersonalAccessToken")
                .field(&"<redacted>")
                .finish(),
            Self::OAuthClient {
                client_id,
                redirect_uri,
                ..
            } => f
                .debug_struct("OAuthClient")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("redirect_uri", redirect_uri)
                .finish(),
        }
    }
}

/// Static configuration for an Oura provider instance
#[derive(Debug, Clone)]
pub struct OuraProviderConfig {
    /// Credentials used for every request
    pub credentials: OuraCredentials,
    /// REST API base URL, without trailing slash
    pub api_base_url: String,
    /// OAuth2 authorization endpoint
    pub authorize_url: String,
    /// OAuth2 token endpoint
    pub token_url: String,
    /// Space separated OAuth2 scopes
    pub scopes: String,
}

impl OuraProviderConfig {
    /// Configuration pointing at the public Oura endpoints
    #[must_use]
    pub fn new(credentials: OuraCredentials, api_base_url: impl Into<String>) -> Self {
        use crate::constants::oura;

        Self {
            credentials,
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
            authorize_url: oura::AUTHORIZE_URL.to_owned(),
            token_url: oura::TOKEN_URL.to_owned(),
            scopes: oura::DEFAULT_SCOPES.to_owned(),
        }
    }
}

/// OAuth2 token set held by a provider instance
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token used to mint a new access token
    pub refresh_token: Option<String>,
    /// Absolute expiry, when the token endpoint reported one
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes
    pub scope: Option<String>,
}

impl OAuthToken {
    /// Whether the token expires within `margin`
    #[must_use]
    pub fn expires_within(&self, margin: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        expires_at - margin <= Utc::now()
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Calendar-day bounds, both inclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day to include
    pub start_date: Option<NaiveDate>,
    /// Last day to include
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    /// Parse optional `YYYY-MM-DD` bounds.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for malformed dates or when the start
    /// falls after the end.
    pub fn parse(start_date: Option<&str>, end_date: Option<&str>) -> AppResult<Self> {
        let range = Self {
            start_date: start_date.map(|s| parse_day("start_date", s)).transpose()?,
            end_date: end_date.map(|s| parse_day("end_date", s)).transpose()?,
        };
        if let (Some(start), Some(end)) = (range.start_date, range.end_date) {
            if start > end {
                return Err(AppError::invalid_input(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        Ok(range)
    }

    /// Query pairs understood by the Oura usercollection endpoints
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

fn parse_day(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        AppError::invalid_input(format!("{field} must be YYYY-MM-DD, got '{value}': {e}"))
    })
}

/// Instant bounds for time-series collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimeRange {
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub end: Option<DateTime<Utc>>,
}

impl DateTimeRange {
    /// Parse optional RFC 3339 bounds.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for malformed timestamps or inverted bounds.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> AppResult<Self> {
        let range = Self {
            start: start
                .map(|s| parse_instant("start_datetime", s))
                .transpose()?,
            end: end.map(|s| parse_instant("end_datetime", s)).transpose()?,
        };
        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start >= end {
                return Err(AppError::invalid_input(
                    "start_datetime must be before end_datetime",
                ));
            }
        }
        Ok(range)
    }

    /// Query pairs understood by the Oura heart rate endpoint
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start {
            pairs.push((
                "start_datetime",
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(end) = self.end {
            pairs.push(("end_datetime", end.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        pairs
    }
}

fn parse_instant(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            AppError::invalid_input(format!(
                "{field} must be an RFC 3339 timestamp, got '{value}': {e}"
            ))
        })
}

/// Wearable health data source consumed by MCP tools
#[async_trait]
pub trait WearableProvider: Send + Sync {
    /// Provider identifier
    fn name(&self) -> &'static str;

    /// Whether this instance can make authenticated calls right now
    async fn is_authenticated(&self) -> bool;

    /// Whether this instance supports the OAuth2 authorization code flow
    fn supports_oauth(&self) -> bool;

    /// Build the URL a user visits to grant access
    ///
    /// # Errors
    ///
    /// Fails when the provider is not configured as an OAuth client.
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// Exchange an authorization code for tokens and keep them on this instance
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthToken>;

    /// Ring owner profile
    async fn personal_info(&self) -> AppResult<PersonalInfo>;

    /// Daily sleep scores
    async fn daily_sleep(&self, range: &DateRange) -> AppResult<Vec<DailySleep>>;

    /// Detailed sleep periods
    async fn sleep_periods(&self, range: &DateRange) -> AppResult<Vec<SleepPeriod>>;

    /// Daily activity summaries
    async fn daily_activity(&self, range: &DateRange) -> AppResult<Vec<DailyActivity>>;

    /// Daily readiness scores
    async fn daily_readiness(&self, range: &DateRange) -> AppResult<Vec<DailyReadiness>>;

    /// Heart rate time series
    async fn heart_rate(&self, range: &DateTimeRange) -> AppResult<Vec<HeartRateSample>>;

    /// Workouts
    async fn workouts(&self, range: &DateRange) -> AppResult<Vec<Workout>>;

    /// Meditation and breathing sessions
    async fn sessions(&self, range: &DateRange) -> AppResult<Vec<MindfulSession>>;

    /// Daily blood oxygen
    async fn daily_spo2(&self, range: &DateRange) -> AppResult<Vec<DailySpo2>>;

    /// Daily stress
    async fn daily_stress(&self, range: &DateRange) -> AppResult<Vec<DailyStress>>;

    /// User tags
    async fn tags(&self, range: &DateRange) -> AppResult<Vec<EnhancedTag>>;
}

/// Builds provider instances; called once per MCP session
pub trait ProviderFactory: Send + Sync {
    /// Create a new, fully initialized provider instance
    fn create(&self) -> Arc<dyn WearableProvider>;
}
