// ABOUTME: Typed Oura API v2 response models for sleep, activity, readiness, and biometrics
// ABOUTME: Every score and measurement is optional because Oura omits fields it has not computed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Oura usercollection documents.
//!
//! Field names follow the Oura wire format so documents round-trip to MCP
//! clients unchanged. Unknown fields are ignored on decode.

use serde::{Deserialize, Serialize};

/// Paginated envelope returned by every usercollection list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct OuraPage<T> {
    /// Records on this page
    pub data: Vec<T>,
    /// Token for fetching the next page (None if no more pages)
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Ring owner profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Oura user id
    pub id: String,
    /// Age in years
    pub age: Option<u32>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Height in meters
    pub height: Option<f64>,
    /// Biological sex as reported by the user
    pub biological_sex: Option<String>,
    /// Account email, present with the `email` scope
    pub email: Option<String>,
}

/// Contributors to the daily sleep score (each 1-100)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepContributors {
    pub deep_sleep: Option<u32>,
    pub efficiency: Option<u32>,
    pub latency: Option<u32>,
    pub rem_sleep: Option<u32>,
    pub restfulness: Option<u32>,
    pub timing: Option<u32>,
    pub total_sleep: Option<u32>,
}

/// Daily sleep score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySleep {
    pub id: String,
    /// Calendar day (YYYY-MM-DD)
    pub day: String,
    /// Sleep score (1-100)
    pub score: Option<u32>,
    #[serde(default)]
    pub contributors: SleepContributors,
    pub timestamp: Option<String>,
}

/// A single detected sleep period (long sleep, nap, rest)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepPeriod {
    pub id: String,
    pub day: String,
    pub bedtime_start: Option<String>,
    pub bedtime_end: Option<String>,
    /// Period kind, e.g. `long_sleep`, `late_nap`
    #[serde(rename = "type")]
    pub period_type: Option<String>,
    pub average_breath: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub average_hrv: Option<f64>,
    pub lowest_heart_rate: Option<u32>,
    /// Durations below are seconds
    pub awake_time: Option<u32>,
    pub deep_sleep_duration: Option<u32>,
    pub light_sleep_duration: Option<u32>,
    pub rem_sleep_duration: Option<u32>,
    pub total_sleep_duration: Option<u32>,
    pub time_in_bed: Option<u32>,
    pub latency: Option<u32>,
    /// Sleep efficiency percentage
    pub efficiency: Option<u32>,
    pub restless_periods: Option<u32>,
}

/// Contributors to the daily activity score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityContributors {
    pub meet_daily_targets: Option<u32>,
    pub move_every_hour: Option<u32>,
    pub recovery_time: Option<u32>,
    pub stay_active: Option<u32>,
    pub training_frequency: Option<u32>,
    pub training_volume: Option<u32>,
}

/// Daily activity summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub id: String,
    pub day: String,
    pub score: Option<u32>,
    pub active_calories: Option<u32>,
    pub total_calories: Option<u32>,
    pub steps: Option<u32>,
    /// Meters
    pub equivalent_walking_distance: Option<u32>,
    /// Seconds spent per intensity band
    pub high_activity_time: Option<u32>,
    pub medium_activity_time: Option<u32>,
    pub low_activity_time: Option<u32>,
    pub sedentary_time: Option<u32>,
    pub resting_time: Option<u32>,
    pub inactivity_alerts: Option<u32>,
    #[serde(default)]
    pub contributors: ActivityContributors,
    pub timestamp: Option<String>,
}

/// Contributors to the readiness score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadinessContributors {
    pub activity_balance: Option<u32>,
    pub body_temperature: Option<u32>,
    pub hrv_balance: Option<u32>,
    pub previous_day_activity: Option<u32>,
    pub previous_night: Option<u32>,
    pub recovery_index: Option<u32>,
    pub resting_heart_rate: Option<u32>,
    pub sleep_balance: Option<u32>,
}

/// Daily readiness score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReadiness {
    pub id: String,
    pub day: String,
    pub score: Option<u32>,
    /// Degrees Celsius relative to baseline
    pub temperature_deviation: Option<f64>,
    pub temperature_trend_deviation: Option<f64>,
    #[serde(default)]
    pub contributors: ReadinessContributors,
    pub timestamp: Option<String>,
}

/// One heart rate sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub bpm: u32,
    /// Measurement context, e.g. `awake`, `rest`, `sleep`, `workout`
    pub source: Option<String>,
    pub timestamp: String,
}

/// Recorded or auto-detected workout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub activity: Option<String>,
    pub calories: Option<f64>,
    pub day: String,
    /// Meters
    pub distance: Option<f64>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    /// `easy`, `moderate` or `hard`
    pub intensity: Option<String>,
    pub label: Option<String>,
    /// `manual`, `autodetected`, `confirmed`, `workout_heart_rate`
    pub source: Option<String>,
}

/// Guided or unguided session (meditation, breathing, nap)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MindfulSession {
    pub id: String,
    pub day: String,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    pub mood: Option<String>,
}

/// Blood oxygen aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spo2Percentage {
    pub average: Option<f64>,
}

/// Daily blood oxygen summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySpo2 {
    pub id: String,
    pub day: String,
    pub spo2_percentage: Option<Spo2Percentage>,
    pub breathing_disturbance_index: Option<u32>,
}

/// Daily stress summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStress {
    pub id: String,
    pub day: String,
    /// Seconds spent in high stress
    pub stress_high: Option<u32>,
    /// Seconds spent in high recovery
    pub recovery_high: Option<u32>,
    /// `restored`, `normal` or `stressful`
    pub day_summary: Option<String>,
}

/// User-entered tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancedTag {
    pub id: String,
    pub tag_type_code: Option<String>,
    pub custom_name: Option<String>,
    pub comment: Option<String>,
    pub start_day: Option<String>,
    pub end_day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_sleep_decodes_partial_documents() {
        let page: OuraPage<DailySleep> = serde_json::from_value(serde_json::json!({
            "data": [{
                "id": "a1",
                "day": "2024-03-01",
                "score": 82,
                "contributors": { "deep_sleep": 90, "timing": null },
                "timestamp": "2024-03-01T00:00:00+00:00",
                "unrelated_field": true
            }],
            "next_token": null
        }))
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].score, Some(82));
        assert_eq!(page.data[0].contributors.deep_sleep, Some(90));
        assert_eq!(page.data[0].contributors.timing, None);
        assert!(page.next_token.is_none());
    }

    #[test]
    fn test_sleep_period_type_uses_wire_name() {
        let period: SleepPeriod = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "day": "2024-03-01",
            "type": "long_sleep",
            "total_sleep_duration": 27000
        }))
        .unwrap();
        assert_eq!(period.period_type.as_deref(), Some("long_sleep"));

        let encoded = serde_json::to_value(&period).unwrap();
        assert_eq!(encoded["type"], "long_sleep");
    }
}
