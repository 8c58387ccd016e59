// ABOUTME: In-memory WearableProvider for transport and routing tests
// ABOUTME: Serves fixed fixtures, can fail on demand, and counts provider instances

use async_trait::async_trait;
use oura_mcp_server::errors::{AppError, AppResult, ProviderError};
use oura_providers::models::{
    DailyActivity, DailyReadiness, DailySleep, DailySpo2, DailyStress, EnhancedTag,
    HeartRateSample, MindfulSession, PersonalInfo, SleepPeriod, Workout,
};
use oura_providers::{
    DateRange, DateTimeRange, OAuthToken, ProviderFactory, WearableProvider,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Provider returning canned data
#[derive(Default)]
pub struct MockProvider {
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Provider whose `personal_info` takes `delay` to answer
    pub fn slow(delay: Duration) -> Self {
        Self {
            failing: AtomicBool::new(false),
            delay: Some(delay),
        }
    }

    /// Make every data call fail with an upstream error
    pub fn fail_requests(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::from(ProviderError::ApiError {
                provider: "oura".to_owned(),
                status_code: 503,
                message: "upstream unavailable".to_owned(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl WearableProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_authenticated(&self) -> bool {
        true
    }

    fn supports_oauth(&self) -> bool {
        false
    }

    fn authorization_url(&self, _state: &str) -> AppResult<String> {
        Err(AppError::invalid_input("OAuth not configured"))
    }

    async fn exchange_code(&self, _code: &str) -> AppResult<OAuthToken> {
        Err(AppError::invalid_input("OAuth not configured"))
    }

    async fn personal_info(&self) -> AppResult<PersonalInfo> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        Ok(PersonalInfo {
            id: "user-1".to_owned(),
            age: Some(34),
            ..PersonalInfo::default()
        })
    }

    async fn daily_sleep(&self, range: &DateRange) -> AppResult<Vec<DailySleep>> {
        self.check()?;
        let day = range
            .start_date
            .map_or_else(|| "2024-01-01".to_owned(), |date| date.to_string());
        Ok(vec![DailySleep {
            id: "sleep-1".to_owned(),
            day,
            score: Some(82),
            ..DailySleep::default()
        }])
    }

    async fn sleep_periods(&self, _range: &DateRange) -> AppResult<Vec<SleepPeriod>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn daily_activity(&self, _range: &DateRange) -> AppResult<Vec<DailyActivity>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn daily_readiness(&self, _range: &DateRange) -> AppResult<Vec<DailyReadiness>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn heart_rate(&self, _range: &DateTimeRange) -> AppResult<Vec<HeartRateSample>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn workouts(&self, _range: &DateRange) -> AppResult<Vec<Workout>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn sessions(&self, _range: &DateRange) -> AppResult<Vec<MindfulSession>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn daily_spo2(&self, _range: &DateRange) -> AppResult<Vec<DailySpo2>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn daily_stress(&self, _range: &DateRange) -> AppResult<Vec<DailyStress>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn tags(&self, _range: &DateRange) -> AppResult<Vec<EnhancedTag>> {
        self.check()?;
        Ok(Vec::new())
    }
}

/// Factory counting how many providers it created
#[derive(Default)]
pub struct MockProviderFactory {
    created: AtomicUsize,
    delay: Option<Duration>,
}

impl MockProviderFactory {
    /// Factory handing out slow providers
    pub fn slow(delay: Duration) -> Self {
        Self {
            created: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    /// Number of providers handed out so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ProviderFactory for MockProviderFactory {
    fn create(&self) -> Arc<dyn WearableProvider> {
        self.created.fetch_add(1, Ordering::SeqCst);
        match self.delay {
            Some(delay) => Arc::new(MockProvider::slow(delay)),
            None => Arc::new(MockProvider::default()),
        }
    }
}
