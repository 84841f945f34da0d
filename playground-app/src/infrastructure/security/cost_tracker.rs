use chrono::{NaiveDate, Utc};
use playground_errors::AppError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostLimits {
    pub daily_requests: u32,
    pub cost_per_request_cents: u32,
    pub daily_cost_cents: u32,
}

impl Default for CostLimits {
    fn default() -> Self {
        Self {
            daily_requests: 100,
            cost_per_request_cents: 5,
            daily_cost_cents: 500,
        }
    }
}

/// Daily budget for chat-completion calls. Counters reset when the UTC date changes.
pub struct CostTracker {
    limits: CostLimits,
    daily_requests: AtomicU32,
    daily_cost_cents: AtomicU32,
    current_day: Mutex<NaiveDate>,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::with_limits(CostLimits::default())
    }

    pub fn with_limits(limits: CostLimits) -> Self {
        Self {
            limits,
            daily_requests: AtomicU32::new(0),
            daily_cost_cents: AtomicU32::new(0),
            current_day: Mutex::new(Utc::now().date_naive()),
        }
    }

    pub fn check_and_increment(&self) -> Result<(), CostLimitError> {
        self.reset_if_new_day(Utc::now().date_naive());

        let current_requests = self.daily_requests.load(Ordering::SeqCst);
        let current_cost = self.daily_cost_cents.load(Ordering::SeqCst);

        if current_requests >= self.limits.daily_requests {
            return Err(CostLimitError::DailyRequestLimitReached);
        }

        if current_cost + self.limits.cost_per_request_cents > self.limits.daily_cost_cents {
            return Err(CostLimitError::DailyCostLimitReached);
        }

        self.daily_requests.fetch_add(1, Ordering::SeqCst);
        self.daily_cost_cents
            .fetch_add(self.limits.cost_per_request_cents, Ordering::SeqCst);

        Ok(())
    }

    pub fn remaining_requests(&self) -> u32 {
        self.limits
            .daily_requests
            .saturating_sub(self.daily_requests.load(Ordering::SeqCst))
    }

    fn reset_if_new_day(&self, today: NaiveDate) {
        let mut current_day = match self.current_day.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if today != *current_day {
            self.daily_requests.store(0, Ordering::SeqCst);
            self.daily_cost_cents.store(0, Ordering::SeqCst);
            *current_day = today;
            tracing::info!("Daily cost tracker reset");
        }
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CostLimitError {
    #[error("Daily analysis limit reached. Please try again tomorrow.")]
    DailyRequestLimitReached,

    #[error("Daily budget exhausted. Please try again tomorrow.")]
    DailyCostLimitReached,
}

impl From<CostLimitError> for AppError {
    fn from(err: CostLimitError) -> Self {
        AppError::RateLimited(err.to_string())
    }
}
