//! Orchestration for the catalyst event pipeline.
//!
//! This crate contains:
//! - The bounded concurrent collector
//! - The single-flight TTL cache
//! - Fundamentals and headline enrichment with its rate budget
//! - `CatalystTracker`, the cached entry point tying it all together

pub mod cache;
pub mod collector;
pub mod config;
pub mod enrich;
pub mod error;
pub mod quota;
pub mod tracker;

pub use cache::{CacheResponse, SingleFlightCache};
pub use collector::{CollectionResult, Collector, SourceFailure};
pub use config::{CacheConfig, CollectorConfig, EnrichmentConfig, TrackerConfig};
pub use enrich::Enricher;
pub use error::PipelineError;
pub use quota::QuotaGuard;
pub use tracker::{
    CatalystTracker, EventQuery, Freshness, ResponseMeta, SourceReport, TrackerResponse,
};
