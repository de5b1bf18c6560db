//! Core contracts for the catalyst event pipeline.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Source and enrichment adapter contracts
//! - Keyword heuristics for classifying source text
//! - The fuzzy deduplicator/merger
//! - The deterministic scoring engine

pub mod adapter;
pub mod classify;
pub mod domain;
pub mod error;
pub mod merge;
pub mod scoring;
pub mod source;

pub use adapter::{
    AdapterError, AdapterErrorKind, EnrichmentProvider, FetchWindow, SourceAdapter,
};
pub use domain::{
    CatalystCategory, CatalystEvent, Confidence, EventDate, EventStatus, Fundamentals, Headline,
    OutcomeProbability, RawEvent, Ticker, TradingScore, UtcDateTime,
};
pub use error::{CoreError, ValidationError};
pub use merge::{merge, MergeConfig};
pub use scoring::{outcome_probability, score_event, trading_score, ScoringTables};
pub use source::ProviderId;
