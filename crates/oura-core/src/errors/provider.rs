// ABOUTME: Structured error types for upstream wearable provider operations
// ABOUTME: Carries status codes and rate limit hints, converts into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};

/// Failures talking to an upstream provider API
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider rejected the access token
    #[error("{provider} authentication failed: {reason}")]
    AuthenticationFailed {
        /// Provider name
        provider: String,
        /// Why the provider rejected us
        reason: String,
    },

    /// Provider is rate limiting this client
    #[error("{provider} rate limit exceeded ({limit_type}), retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Provider name
        provider: String,
        /// Seconds until the limit resets
        retry_after_secs: u64,
        /// Kind of limit that was hit
        limit_type: String,
    },

    /// Provider answered with a non-success status
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status returned by the provider
        status_code: u16,
        /// Response body or summary
        message: String,
    },

    /// Request never produced a response
    #[error("{provider} request failed: {source}")]
    Network {
        /// Provider name
        provider: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Response body did not match the expected shape
    #[error("{provider} returned an unreadable response: {reason}")]
    InvalidResponse {
        /// Provider name
        provider: String,
        /// Decoder message
        reason: String,
    },

    /// Operation needs credentials this provider instance does not hold
    #[error("{provider} is not authorized: {reason}")]
    NotAuthorized {
        /// Provider name
        provider: String,
        /// What is missing
        reason: String,
    },
}

/// Result alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Error code this provider failure maps to
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::AuthenticationFailed { .. } => ErrorCode::ExternalAuthFailed,
            Self::RateLimitExceeded { .. } => ErrorCode::ExternalRateLimited,
            Self::ApiError { .. } | Self::InvalidResponse { .. } => {
                ErrorCode::ExternalServiceError
            }
            Self::Network { .. } => ErrorCode::ExternalServiceUnavailable,
            Self::NotAuthorized { .. } => ErrorCode::AuthRequired,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        Self::new(error.error_code(), error.to_string()).with_source(error)
    }
}
