//! Rate budget guard for enrichment cycles.
//!
//! Enrichment hits third-party fundamentals/news providers that throttle
//! aggressively. When the in-process budget is spent the whole refresh
//! cycle is skipped rather than queued; events simply go out un-enriched
//! until the budget recovers.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// In-memory rate budget over a sliding window.
#[derive(Clone)]
pub struct QuotaGuard {
    limiter: Arc<DirectRateLimiter>,
    retry_hint: Duration,
}

impl QuotaGuard {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let safe_limit = quota_limit.max(1);
        let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

        let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
        let period = Duration::from_secs_f64(seconds_per_cell);
        let quota = Quota::with_period(period)
            .expect("period is always greater than zero")
            .allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            retry_hint: period,
        }
    }

    /// Tries to spend one cell of budget. When the budget is exhausted the
    /// recommended wait before the next attempt is returned.
    pub fn acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            Ok(())
        } else {
            Err(self.retry_hint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_spent_cell_by_cell() {
        let guard = QuotaGuard::new(Duration::from_secs(60), 2);
        assert!(guard.acquire().is_ok());
        assert!(guard.acquire().is_ok());

        let hint = guard.acquire().expect_err("budget must be spent");
        assert!(hint > Duration::ZERO);
    }

    #[test]
    fn zero_limit_still_admits_one() {
        let guard = QuotaGuard::new(Duration::from_secs(60), 0);
        assert!(guard.acquire().is_ok());
    }
}
