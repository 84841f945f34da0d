use dashmap::DashMap;
use playground_errors::AppError;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub per_minute: u32,
    pub per_hour: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_minute: 5,
            per_hour: 20,
        }
    }
}

#[derive(Clone)]
struct RequestRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl Default for RequestRecord {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Fixed-window request counter per client IP.
#[derive(Clone)]
pub struct RateLimiter {
    limits: RateLimits,
    requests: Arc<DashMap<IpAddr, RequestRecord>>,
    last_cleanup: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(RateLimits::default())
    }

    pub fn with_limits(limits: RateLimits) -> Self {
        Self {
            limits,
            requests: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn check_rate_limit(&self, ip: IpAddr) -> Result<(), RateLimitError> {
        self.maybe_cleanup();

        let now = Instant::now();
        let mut record = self.requests.entry(ip).or_default();

        if now.duration_since(record.minute_start) > MINUTE {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) > HOUR {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= self.limits.per_minute {
            let wait = MINUTE.saturating_sub(now.duration_since(record.minute_start));
            return Err(RateLimitError::PerMinute(wait.as_secs()));
        }

        if record.hour_count >= self.limits.per_hour {
            let wait = HOUR.saturating_sub(now.duration_since(record.hour_start));
            return Err(RateLimitError::PerHour(wait.as_secs()));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self) {
        // A poisoned lock only delays cleanup.
        let Ok(mut last_cleanup) = self.last_cleanup.lock() else {
            return;
        };
        if last_cleanup.elapsed() > CLEANUP_INTERVAL {
            let before = self.requests.len();
            self.requests
                .retain(|_, record| record.hour_start.elapsed() <= HOUR);
            *last_cleanup = Instant::now();
            tracing::debug!(removed = before - self.requests.len(), "Rate limiter cleanup");
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Too many requests. Try again in {0} seconds.")]
    PerMinute(u64),

    #[error("Hourly request limit reached. Try again in {} minutes.", .0.div_ceil(60))]
    PerHour(u64),
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        AppError::RateLimited(err.to_string())
    }
}
