//! Construction-time configuration for the pipeline stages.
//!
//! Defaults mirror the operational envelope the system runs with in
//! production: six-ish calendar sources that answer in seconds when healthy,
//! a rate-limited fundamentals provider, and a five-minute freshness target.

use std::time::Duration;

use catalyst_core::MergeConfig;

/// Limits for the bounded concurrent collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Maximum number of adapters fetching at once.
    pub max_concurrency: usize,
    /// Deadline for a single adapter fetch.
    pub per_adapter_timeout: Duration,
    /// Deadline for the whole collection; stragglers are aborted.
    pub overall_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 6,
            per_adapter_timeout: Duration::from_secs(15),
            overall_timeout: Duration::from_secs(20),
        }
    }
}

/// Limits for the enrichment step.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Maximum concurrent headline fetches. Separate from the collector cap.
    pub max_concurrency: usize,
    /// Deadline for the batched fundamentals fetch.
    pub fundamentals_timeout: Duration,
    /// Deadline for the whole headline phase.
    pub headlines_timeout: Duration,
    /// Deadline for one ticker's headline fetch.
    pub per_ticker_timeout: Duration,
    /// Only the first N unique tickers get fundamentals.
    pub fundamentals_ticker_cap: usize,
    /// Only the first N unique tickers get headlines.
    pub headline_ticker_cap: usize,
    /// Per-ticker headline cache TTL.
    pub headline_ttl: Duration,
    /// Rate budget window and limit for enrichment cycles.
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            fundamentals_timeout: Duration::from_secs(35),
            headlines_timeout: Duration::from_secs(15),
            per_ticker_timeout: Duration::from_secs(4),
            fundamentals_ticker_cap: 30,
            headline_ticker_cap: 15,
            headline_ttl: Duration::from_secs(180),
            quota_window: Duration::from_secs(60),
            quota_limit: 30,
        }
    }
}

/// Freshness settings for the assembled event list.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for a cached pipeline result.
    pub events_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            events_ttl: Duration::from_secs(300),
        }
    }
}

/// Bundled configuration for [`CatalystTracker`](crate::CatalystTracker).
#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
    pub collector: CollectorConfig,
    pub enrichment: EnrichmentConfig,
    pub cache: CacheConfig,
    pub merge: MergeConfig,
}
