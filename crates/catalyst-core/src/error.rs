use thiserror::Error;

/// Validation and contract errors exposed by `catalyst-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("provider id cannot be empty")]
    EmptyProvider,
    #[error("provider id length {len} exceeds max {max}")]
    ProviderTooLong { len: usize, max: usize },
    #[error("provider id contains invalid character '{ch}' at index {index}")]
    ProviderInvalidChar { ch: char, index: usize },

    #[error("invalid catalyst category '{value}'")]
    InvalidCategory { value: String },
    #[error("invalid event status '{value}'")]
    InvalidStatus { value: String },

    #[error("unparseable event date '{value}'")]
    UnparseableDate { value: String },
    #[error("calendar date out of range: {year}-{month:02}-{day:02}")]
    DateOutOfRange { year: i32, month: u8, day: u8 },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("merged event must carry at least one source")]
    EmptySourceSet,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
