// ABOUTME: Oura MCP tool catalogue and dispatch onto the WearableProvider trait
// ABOUTME: Builds tool schemas, validates arguments, and turns provider results into tool responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::schema::{JsonSchema, PropertySchema, ToolSchema};
use crate::constants::tools::{
    EXCHANGE_AUTHORIZATION_CODE, GET_AUTHORIZATION_URL, GET_DAILY_ACTIVITY, GET_DAILY_READINESS,
    GET_DAILY_SLEEP, GET_DAILY_SPO2, GET_DAILY_STRESS, GET_HEART_RATE, GET_PERSONAL_INFO,
    GET_SESSIONS, GET_SLEEP_PERIODS, GET_TAGS, GET_WORKOUTS,
};
use crate::errors::AppError;
use oura_providers::{DateRange, DateTimeRange, WearableProvider};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a tool call could not run
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with this name is offered to this session
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// Arguments failed validation
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Validation failure
        reason: String,
    },
    /// The provider call itself failed
    #[error(transparent)]
    Provider(#[from] AppError),
}

#[derive(Debug, Default, Deserialize)]
struct DateArgs {
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DateTimeArgs {
    start_datetime: Option<String>,
    end_datetime: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorizationUrlArgs {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeCodeArgs {
    code: String,
}

fn property(kind: &str, description: &str, format: Option<&str>) -> PropertySchema {
    PropertySchema {
        property_type: kind.into(),
        description: Some(description.into()),
        format: format.map(Into::into),
    }
}

fn object_schema(
    properties: BTreeMap<String, PropertySchema>,
    required: Option<Vec<String>>,
) -> JsonSchema {
    JsonSchema {
        schema_type: "object".into(),
        properties: Some(properties),
        required,
    }
}

fn date_range_tool(name: &str, description: &str) -> ToolSchema {
    let mut properties = BTreeMap::new();
    properties.insert(
        "start_date".to_owned(),
        property("string", "First day to include (YYYY-MM-DD)", Some("date")),
    );
    properties.insert(
        "end_date".to_owned(),
        property("string", "Last day to include (YYYY-MM-DD)", Some("date")),
    );
    ToolSchema {
        name: name.to_owned(),
        description: description.to_owned(),
        input_schema: object_schema(properties, None),
    }
}

fn create_personal_info_tool() -> ToolSchema {
    ToolSchema {
        name: GET_PERSONAL_INFO.to_owned(),
        description: "Get the ring owner's profile: age, weight, height, biological sex, email"
            .into(),
        input_schema: object_schema(BTreeMap::new(), None),
    }
}

fn create_heart_rate_tool() -> ToolSchema {
    let mut properties = BTreeMap::new();
    properties.insert(
        "start_datetime".to_owned(),
        property(
            "string",
            "Start of the window (RFC 3339, e.g. 2024-03-01T00:00:00Z)",
            Some("date-time"),
        ),
    );
    properties.insert(
        "end_datetime".to_owned(),
        property("string", "End of the window (RFC 3339)", Some("date-time")),
    );
    ToolSchema {
        name: GET_HEART_RATE.to_owned(),
        description: "Get heart rate samples (bpm) with their measurement context".into(),
        input_schema: object_schema(properties, None),
    }
}

fn create_authorization_url_tool() -> ToolSchema {
    let mut properties = BTreeMap::new();
    properties.insert(
        "state".to_owned(),
        property(
            "string",
            "Opaque value echoed back on the redirect; generated when omitted",
            None,
        ),
    );
    ToolSchema {
        name: GET_AUTHORIZATION_URL.to_owned(),
        description: "Get the Oura URL the user must open to grant this server access".into(),
        input_schema: object_schema(properties, None),
    }
}

fn create_exchange_code_tool() -> ToolSchema {
    let mut properties = BTreeMap::new();
    properties.insert(
        "code".to_owned(),
        property(
            "string",
            "The `code` query parameter from the OAuth redirect",
            None,
        ),
    );
    ToolSchema {
        name: EXCHANGE_AUTHORIZATION_CODE.to_owned(),
        description: "Exchange an OAuth authorization code for access tokens for this session"
            .into(),
        input_schema: object_schema(properties, Some(vec!["code".to_owned()])),
    }
}

/// Tools offered to a session; OAuth tools only when the provider supports OAuth
#[must_use]
pub fn list_tools(supports_oauth: bool) -> Vec<ToolSchema> {
    let mut tools = vec![
        create_personal_info_tool(),
        date_range_tool(
            GET_DAILY_SLEEP,
            "Get daily sleep scores and their contributors",
        ),
        date_range_tool(
            GET_SLEEP_PERIODS,
            "Get detailed sleep periods: stage durations, heart rate, HRV, efficiency",
        ),
        date_range_tool(
            GET_DAILY_ACTIVITY,
            "Get daily activity: score, steps, calories, time per intensity",
        ),
        date_range_tool(
            GET_DAILY_READINESS,
            "Get daily readiness scores, temperature deviation and contributors",
        ),
        create_heart_rate_tool(),
        date_range_tool(GET_WORKOUTS, "Get recorded and auto-detected workouts"),
        date_range_tool(GET_SESSIONS, "Get meditation, breathing and relaxation sessions"),
        date_range_tool(GET_DAILY_SPO2, "Get average nightly blood oxygen (SpO2)"),
        date_range_tool(
            GET_DAILY_STRESS,
            "Get daily stress and recovery time with a day summary",
        ),
        date_range_tool(GET_TAGS, "Get tags the user logged in the Oura app"),
    ];
    if supports_oauth {
        tools.push(create_authorization_url_tool());
        tools.push(create_exchange_code_tool());
    }
    tools
}

fn parse_args<T>(tool: &str, arguments: Option<Value>) -> Result<T, ToolError>
where
    T: DeserializeOwned + Default,
{
    match arguments {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| ToolError::InvalidArguments {
            tool: tool.to_owned(),
            reason: e.to_string(),
        }),
    }
}

fn invalid(tool: &str, error: &AppError) -> ToolError {
    ToolError::InvalidArguments {
        tool: tool.to_owned(),
        reason: error.message.clone(),
    }
}

fn date_range(tool: &str, arguments: Option<Value>) -> Result<DateRange, ToolError> {
    let args: DateArgs = parse_args(tool, arguments)?;
    DateRange::parse(args.start_date.as_deref(), args.end_date.as_deref())
        .map_err(|e| invalid(tool, &e))
}

fn collection<T: Serialize>(records: &[T]) -> Result<Value, ToolError> {
    let data = serde_json::to_value(records).map_err(AppError::from)?;
    Ok(json!({ "count": records.len(), "data": data }))
}

/// Run one tool against `provider`.
///
/// Argument problems are reported as [`ToolError::InvalidArguments`] before
/// any upstream call is made; upstream failures come back as
/// [`ToolError::Provider`].
///
/// # Errors
///
/// See [`ToolError`].
pub async fn call_tool(
    provider: &dyn WearableProvider,
    name: &str,
    arguments: Option<Value>,
    supports_oauth: bool,
) -> Result<Value, ToolError> {
    match name {
        GET_PERSONAL_INFO => {
            let info = provider.personal_info().await?;
            Ok(serde_json::to_value(info).map_err(AppError::from)?)
        }
        GET_DAILY_SLEEP => {
            let range = date_range(name, arguments)?;
            collection(&provider.daily_sleep(&range).await?)
        }
        GET_SLEEP_PERIODS => {
            let range = date_range(name, arguments)?;
            collection(&provider.sleep_periods(&range).await?)
        }
        GET_DAILY_ACTIVITY => {
            let range = date_range(name, arguments)?;
            collection(&provider.daily_activity(&range).await?)
        }
        GET_DAILY_READINESS => {
            let range = date_range(name, arguments)?;
            collection(&provider.daily_readiness(&range).await?)
        }
        GET_HEART_RATE => {
            let args: DateTimeArgs = parse_args(name, arguments)?;
            let range = DateTimeRange::parse(
                args.start_datetime.as_deref(),
                args.end_datetime.as_deref(),
            )
            .map_err(|e| invalid(name, &e))?;
            collection(&provider.heart_rate(&range).await?)
        }
        GET_WORKOUTS => {
            let range = date_range(name, arguments)?;
            collection(&provider.workouts(&range).await?)
        }
        GET_SESSIONS => {
            let range = date_range(name, arguments)?;
            collection(&provider.sessions(&range).await?)
        }
        GET_DAILY_SPO2 => {
            let range = date_range(name, arguments)?;
            collection(&provider.daily_spo2(&range).await?)
        }
        GET_DAILY_STRESS => {
            let range = date_range(name, arguments)?;
            collection(&provider.daily_stress(&range).await?)
        }
        GET_TAGS => {
            let range = date_range(name, arguments)?;
            collection(&provider.tags(&range).await?)
        }
        GET_AUTHORIZATION_URL if supports_oauth => {
            let args: AuthorizationUrlArgs = parse_args(name, arguments)?;
            let state = args
                .state
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let url = provider.authorization_url(&state)?;
            Ok(json!({ "authorization_url": url, "state": state }))
        }
        EXCHANGE_AUTHORIZATION_CODE if supports_oauth => {
            let args: ExchangeCodeArgs = serde_json::from_value(arguments.unwrap_or(Value::Null))
                .map_err(|e| ToolError::InvalidArguments {
                    tool: name.to_owned(),
                    reason: e.to_string(),
                })?;
            if args.code.trim().is_empty() {
                return Err(ToolError::InvalidArguments {
                    tool: name.to_owned(),
                    reason: "code must not be empty".to_owned(),
                });
            }
            let token = provider.exchange_code(&args.code).await?;
            Ok(json!({
                "authenticated": true,
                "expires_at": token.expires_at,
                "scope": token.scope,
            }))
        }
        other => Err(ToolError::UnknownTool(other.to_owned())),
    }
}
