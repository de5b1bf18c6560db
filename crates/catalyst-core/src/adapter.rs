//! Source and enrichment adapter contracts.
//!
//! Adapters are external: this crate defines the traits and the structured
//! error they report through. Implementations must never panic on bad
//! upstream data; they classify the failure and let the collector decide
//! what survives.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::domain::{EventDate, Fundamentals, Headline, RawEvent, Ticker};
use crate::ProviderId;

/// Adapter-level failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterErrorKind {
    /// The adapter did not respond within its deadline.
    Timeout,
    /// The upstream endpoint could not be reached.
    Unreachable,
    /// The upstream responded with data the adapter could not interpret.
    ParseFailure,
}

/// Structured error reported by source and enrichment adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterError {
    kind: AdapterErrorKind,
    message: String,
    retryable: bool,
}

impl AdapterError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::Unreachable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::ParseFailure,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> AdapterErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            AdapterErrorKind::Timeout => "adapter.timeout",
            AdapterErrorKind::Unreachable => "adapter.unreachable",
            AdapterErrorKind::ParseFailure => "adapter.parse_failure",
        }
    }
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for AdapterError {}

/// Date window a fetch should cover, relative to the caller's "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchWindow {
    pub days_back: u32,
    pub days_forward: u32,
}

impl FetchWindow {
    pub const fn new(days_back: u32, days_forward: u32) -> Self {
        Self {
            days_back,
            days_forward,
        }
    }

    /// Whether a dated event falls inside the window around `today`.
    pub fn contains(&self, date: EventDate, today: Date) -> bool {
        let start = today - Duration::days(i64::from(self.days_back));
        let end = today + Duration::days(i64::from(self.days_forward));
        let date = date.as_date();
        start <= date && date <= end
    }
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self::new(30, 90)
    }
}

/// Contract every event source implements.
///
/// Implementations must be `Send + Sync`; the collector shares them across
/// spawned tasks and races them under one deadline.
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier recorded in merged-event source sets.
    fn id(&self) -> ProviderId;

    /// Fetch raw events covering `window`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the upstream times out, cannot be
    /// reached, or responds with unparseable data. A failing adapter must
    /// fail alone; it never gets to veto the rest of the collection.
    fn fetch<'a>(
        &'a self,
        window: FetchWindow,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawEvent>, AdapterError>> + Send + 'a>>;
}

/// Contract for the fundamentals/news side-channel used during enrichment.
pub trait EnrichmentProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetch fundamentals snapshots for a batch of tickers. Tickers the
    /// provider has no data for are simply absent from the map.
    fn fetch_fundamentals<'a>(
        &'a self,
        tickers: &'a [Ticker],
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<Ticker, Fundamentals>, AdapterError>> + Send + 'a>>;

    /// Fetch recent headlines for a batch of tickers.
    fn fetch_headlines<'a>(
        &'a self,
        tickers: &'a [Ticker],
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<Ticker, Vec<Headline>>, AdapterError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AdapterError::timeout("t").code(), "adapter.timeout");
        assert_eq!(AdapterError::unreachable("u").code(), "adapter.unreachable");
        assert_eq!(
            AdapterError::parse_failure("p").code(),
            "adapter.parse_failure"
        );
    }

    #[test]
    fn timeouts_are_retryable_parse_failures_are_not() {
        assert!(AdapterError::timeout("t").retryable());
        assert!(!AdapterError::parse_failure("p").retryable());
    }

    #[test]
    fn window_contains_is_inclusive() {
        let window = FetchWindow::new(30, 90);
        let today = date!(2026 - 03 - 15);
        let edge = EventDate::from_date(date!(2026 - 06 - 13));
        let past_edge = EventDate::from_date(date!(2026 - 02 - 13));
        let outside = EventDate::from_date(date!(2026 - 06 - 14));
        assert!(window.contains(edge, today));
        assert!(window.contains(past_edge, today));
        assert!(!window.contains(outside, today));
    }
}
