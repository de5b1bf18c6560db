// Shared fixtures for the behavioral test suites: deterministic in-process
// adapters and enrichment providers, plus event builders.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub use std::sync::Arc;

pub use catalyst_core::{
    AdapterError, CatalystCategory, CatalystEvent, EnrichmentProvider, EventDate, EventStatus,
    FetchWindow, Fundamentals, Headline, ProviderId, RawEvent, SourceAdapter, Ticker,
};

pub fn provider(id: &str) -> ProviderId {
    ProviderId::parse(id).expect("valid provider id")
}

pub fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("valid ticker")
}

pub fn event_date(value: &str) -> EventDate {
    EventDate::parse(value).expect("valid date")
}

pub fn raw_event(
    symbol: &str,
    source: &str,
    category: CatalystCategory,
    date: Option<&str>,
) -> RawEvent {
    let mut event = RawEvent::new(symbol, category, provider(source));
    event.event_date = date.map(event_date);
    event
}

/// Adapter that serves a fixed batch, optionally after a delay.
pub struct StaticAdapter {
    id: ProviderId,
    events: Vec<RawEvent>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticAdapter {
    pub fn new(id: &str, events: Vec<RawEvent>) -> Self {
        Self {
            id: provider(id),
            events,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for StaticAdapter {
    fn id(&self) -> ProviderId {
        self.id.clone()
    }

    fn fetch<'a>(
        &'a self,
        _window: FetchWindow,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawEvent>, AdapterError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.events.clone())
        })
    }
}

/// Adapter that always fails with the given error.
pub struct FailingAdapter {
    id: ProviderId,
    error: AdapterError,
}

impl FailingAdapter {
    pub fn new(id: &str, error: AdapterError) -> Self {
        Self {
            id: provider(id),
            error,
        }
    }
}

impl SourceAdapter for FailingAdapter {
    fn id(&self) -> ProviderId {
        self.id.clone()
    }

    fn fetch<'a>(
        &'a self,
        _window: FetchWindow,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawEvent>, AdapterError>> + Send + 'a>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

/// Adapter that serves a batch once, then fails every later fetch.
pub struct FlakyAdapter {
    id: ProviderId,
    events: Vec<RawEvent>,
    calls: AtomicUsize,
}

impl FlakyAdapter {
    pub fn new(id: &str, events: Vec<RawEvent>) -> Self {
        Self {
            id: provider(id),
            events,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SourceAdapter for FlakyAdapter {
    fn id(&self) -> ProviderId {
        self.id.clone()
    }

    fn fetch<'a>(
        &'a self,
        _window: FetchWindow,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawEvent>, AdapterError>> + Send + 'a>> {
        Box::pin(async move {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(self.events.clone())
            } else {
                Err(AdapterError::unreachable("upstream went away"))
            }
        })
    }
}

/// Enrichment provider backed by in-memory maps.
pub struct StaticEnrichment {
    id: ProviderId,
    fundamentals: HashMap<Ticker, Fundamentals>,
    headlines: HashMap<Ticker, Vec<Headline>>,
    headline_calls: AtomicUsize,
}

impl StaticEnrichment {
    pub fn new(id: &str) -> Self {
        Self {
            id: provider(id),
            fundamentals: HashMap::new(),
            headlines: HashMap::new(),
            headline_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fundamentals(mut self, symbol: &str, pairs: &[(&str, &str)]) -> Self {
        let snapshot: Fundamentals = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        self.fundamentals.insert(ticker(symbol), snapshot);
        self
    }

    pub fn with_headlines(mut self, symbol: &str, titles: &[&str]) -> Self {
        let headlines = titles.iter().map(|title| Headline::new(*title)).collect();
        self.headlines.insert(ticker(symbol), headlines);
        self
    }

    pub fn headline_calls(&self) -> usize {
        self.headline_calls.load(Ordering::SeqCst)
    }
}

impl EnrichmentProvider for StaticEnrichment {
    fn id(&self) -> ProviderId {
        self.id.clone()
    }

    fn fetch_fundamentals<'a>(
        &'a self,
        tickers: &'a [Ticker],
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<Ticker, Fundamentals>, AdapterError>> + Send + 'a>>
    {
        Box::pin(async move {
            Ok(tickers
                .iter()
                .filter_map(|t| self.fundamentals.get(t).map(|f| (t.clone(), f.clone())))
                .collect())
        })
    }

    fn fetch_headlines<'a>(
        &'a self,
        tickers: &'a [Ticker],
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<Ticker, Vec<Headline>>, AdapterError>> + Send + 'a>>
    {
        Box::pin(async move {
            self.headline_calls.fetch_add(1, Ordering::SeqCst);
            Ok(tickers
                .iter()
                .filter_map(|t| self.headlines.get(t).map(|h| (t.clone(), h.clone())))
                .collect())
        })
    }
}
