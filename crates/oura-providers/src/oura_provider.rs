// ABOUTME: Oura Ring REST API v2 provider with personal token and OAuth2 authentication
// ABOUTME: Follows next_token pagination, refreshes expiring tokens, maps HTTP failures to ProviderError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::oura;
use crate::core::{
    DateRange, DateTimeRange, OAuthToken, OuraCredentials, OuraProviderConfig, ProviderFactory,
    WearableProvider,
};
use crate::errors::provider::ProviderError;
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{
    DailyActivity, DailyReadiness, DailySleep, DailySpo2, DailyStress, EnhancedTag,
    HeartRateSample, MindfulSession, OuraPage, PersonalInfo, SleepPeriod, Workout,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Retry hint used when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

impl From<TokenResponse> for OAuthToken {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
            scope: response.scope,
        }
    }
}

/// Oura API client holding the token state for one MCP session
pub struct OuraProvider {
    config: OuraProviderConfig,
    client: Client,
    token: RwLock<Option<OAuthToken>>,
}

impl OuraProvider {
    /// Create a provider backed by the shared pooled client
    #[must_use]
    pub fn new(config: OuraProviderConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create a provider with an explicit HTTP client
    #[must_use]
    pub fn with_client(config: OuraProviderConfig, client: Client) -> Self {
        Self {
            config,
            client,
            token: RwLock::new(None),
        }
    }

    fn not_oauth_client() -> AppError {
        AppError::config(
            "OAuth flow requires OURA_CLIENT_ID and OURA_CLIENT_SECRET; this server runs with a personal access token",
        )
    }

    /// Resolve the bearer token for the next API call
    async fn access_token(&self) -> AppResult<String> {
        match &self.config.credentials {
            OuraCredentials::PersonalAccessToken(token) => Ok(token.clone()),
            OuraCredentials::OAuthClient { .. } => {
                self.refresh_token_if_needed().await?;
                self.token
                    .read()
                    .await
                    .as_ref()
                    .map(|token| token.access_token.clone())
                    .ok_or_else(|| {
                        AppError::from(ProviderError::NotAuthorized {
                            provider: oura::PROVIDER_NAME.to_owned(),
                            reason: "no access token yet, complete the OAuth authorization first"
                                .to_owned(),
                        })
                    })
            }
        }
    }

    async fn refresh_token_if_needed(&self) -> AppResult<()> {
        let refresh_token = {
            let guard = self.token.read().await;
            let Some(token) = guard.as_ref() else {
                return Ok(());
            };
            if !token.expires_within(Duration::from_secs(oura::TOKEN_REFRESH_MARGIN_SECS)) {
                return Ok(());
            }
            match token.refresh_token.clone() {
                Some(refresh_token) => refresh_token,
                None => {
                    warn!("Oura access token is expiring and no refresh token is available");
                    return Ok(());
                }
            }
        };

        info!("Refreshing Oura access token");
        let mut refreshed = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }
        *self.token.write().await = Some(refreshed);
        Ok(())
    }

    /// POST a grant to the token endpoint with the client credentials attached
    async fn request_token(&self, grant: &[(&str, &str)]) -> AppResult<OAuthToken> {
        let OuraCredentials::OAuthClient {
            client_id,
            client_secret,
            ..
        } = &self.config.credentials
        else {
            return Err(Self::not_oauth_client());
        };

        let mut params: Vec<(&str, &str)> = grant.to_vec();
        params.push(("client_id", client_id.as_str()));
        params.push(("client_secret", client_secret.as_str()));

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                provider: oura::PROVIDER_NAME.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed {
                provider: oura::PROVIDER_NAME.to_owned(),
                reason: format!("token endpoint returned {status}: {text}"),
            }
            .into());
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: oura::PROVIDER_NAME.to_owned(),
                    reason: format!("token response: {e}"),
                })?;
        Ok(token.into())
    }

    /// Authenticated GET against a usercollection endpoint
    async fn api_request<T>(&self, endpoint: &str, query: &[(&'static str, String)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/{}",
            self.config.api_base_url,
            endpoint.trim_start_matches('/')
        );
        debug!("Oura API request: {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                provider: oura::PROVIDER_NAME.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(Self::handle_api_error(status, &headers, &text));
        }

        response.json().await.map_err(|e| {
            AppError::from(ProviderError::InvalidResponse {
                provider: oura::PROVIDER_NAME.to_owned(),
                reason: format!("{endpoint}: {e}"),
            })
        })
    }

    fn handle_api_error(status: StatusCode, headers: &HeaderMap, text: &str) -> AppError {
        warn!(
            "Oura API request failed - status: {status}, body_length: {} bytes",
            text.len()
        );

        let error = match status {
            StatusCode::UNAUTHORIZED => ProviderError::AuthenticationFailed {
                provider: oura::PROVIDER_NAME.to_owned(),
                reason: "access token expired or invalid".to_owned(),
            },
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded {
                provider: oura::PROVIDER_NAME.to_owned(),
                retry_after_secs: headers
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                limit_type: "API rate limit".to_owned(),
            },
            _ => ProviderError::ApiError {
                provider: oura::PROVIDER_NAME.to_owned(),
                status_code: status.as_u16(),
                message: if text.is_empty() {
                    status.to_string()
                } else {
                    text.to_owned()
                },
            },
        };
        error.into()
    }

    /// Fetch every page of a collection, following `next_token`
    async fn fetch_collection<T>(
        &self,
        endpoint: &str,
        query: Vec<(&'static str, String)>,
    ) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        for _ in 0..oura::MAX_PAGES {
            let mut page_query = query.clone();
            if let Some(token) = next_token.take() {
                page_query.push(("next_token", token));
            }

            let page: OuraPage<T> = self.api_request(endpoint, &page_query).await?;
            records.extend(page.data);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(records),
            }
        }

        warn!(
            "Stopped following {endpoint} pages after {} pages",
            oura::MAX_PAGES
        );
        Ok(records)
    }
}

#[async_trait]
impl WearableProvider for OuraProvider {
    fn name(&self) -> &'static str {
        oura::PROVIDER_NAME
    }

    async fn is_authenticated(&self) -> bool {
        match self.config.credentials {
            OuraCredentials::PersonalAccessToken(_) => true,
            OuraCredentials::OAuthClient { .. } => self.token.read().await.is_some(),
        }
    }

    fn supports_oauth(&self) -> bool {
        self.config.credentials.is_oauth_client()
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        let OuraCredentials::OAuthClient {
            client_id,
            redirect_uri,
            ..
        } = &self.config.credentials
        else {
            return Err(Self::not_oauth_client());
        };

        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("scope", self.config.scopes.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::config_invalid(format!("invalid authorize URL: {e}")))?;
        Ok(url.into())
    }

    #[instrument(skip(self, code), fields(provider = "oura"))]
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthToken> {
        let OuraCredentials::OAuthClient { redirect_uri, .. } = &self.config.credentials else {
            return Err(Self::not_oauth_client());
        };
        if code.trim().is_empty() {
            return Err(AppError::invalid_input("authorization code must not be empty"));
        }

        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .await?;
        info!("Oura authorization code exchanged");
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn personal_info(&self) -> AppResult<PersonalInfo> {
        self.api_request("usercollection/personal_info", &[]).await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn daily_sleep(&self, range: &DateRange) -> AppResult<Vec<DailySleep>> {
        self.fetch_collection("usercollection/daily_sleep", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn sleep_periods(&self, range: &DateRange) -> AppResult<Vec<SleepPeriod>> {
        self.fetch_collection("usercollection/sleep", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn daily_activity(&self, range: &DateRange) -> AppResult<Vec<DailyActivity>> {
        self.fetch_collection("usercollection/daily_activity", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn daily_readiness(&self, range: &DateRange) -> AppResult<Vec<DailyReadiness>> {
        self.fetch_collection("usercollection/daily_readiness", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn heart_rate(&self, range: &DateTimeRange) -> AppResult<Vec<HeartRateSample>> {
        self.fetch_collection("usercollection/heartrate", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn workouts(&self, range: &DateRange) -> AppResult<Vec<Workout>> {
        self.fetch_collection("usercollection/workout", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn sessions(&self, range: &DateRange) -> AppResult<Vec<MindfulSession>> {
        self.fetch_collection("usercollection/session", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn daily_spo2(&self, range: &DateRange) -> AppResult<Vec<DailySpo2>> {
        self.fetch_collection("usercollection/daily_spo2", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn daily_stress(&self, range: &DateRange) -> AppResult<Vec<DailyStress>> {
        self.fetch_collection("usercollection/daily_stress", range.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(provider = "oura"))]
    async fn tags(&self, range: &DateRange) -> AppResult<Vec<EnhancedTag>> {
        self.fetch_collection("usercollection/enhanced_tag", range.query_pairs())
            .await
    }
}

/// Production factory: one fresh [`OuraProvider`] per call
#[derive(Debug, Clone)]
pub struct OuraProviderFactory {
    config: OuraProviderConfig,
    client: Option<Client>,
}

impl OuraProviderFactory {
    /// Factory whose providers use the shared pooled client
    #[must_use]
    pub const fn new(config: OuraProviderConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Factory whose providers use the given client
    #[must_use]
    pub const fn with_client(config: OuraProviderConfig, client: Client) -> Self {
        Self {
            config,
            client: Some(client),
        }
    }
}

impl ProviderFactory for OuraProviderFactory {
    fn create(&self) -> Arc<dyn WearableProvider> {
        let provider = match &self.client {
            Some(client) => OuraProvider::with_client(self.config.clone(), client.clone()),
            None => OuraProvider::new(self.config.clone()),
        };
        Arc::new(provider)
    }
}
