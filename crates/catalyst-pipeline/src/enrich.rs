//! Fundamentals and headline enrichment.
//!
//! Runs after merging, under its own concurrency cap and rate budget so a
//! slow enrichment provider can never starve collection. Every failure mode
//! here is soft: events keep `None` fields and the pipeline moves on.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use catalyst_core::{AdapterError, CatalystEvent, EnrichmentProvider, Headline, Ticker};

use crate::cache::SingleFlightCache;
use crate::config::EnrichmentConfig;
use crate::quota::QuotaGuard;

pub struct Enricher {
    provider: Arc<dyn EnrichmentProvider>,
    config: EnrichmentConfig,
    quota: QuotaGuard,
    headline_cache: SingleFlightCache<Ticker, Vec<Headline>>,
}

impl Enricher {
    pub fn new(provider: Arc<dyn EnrichmentProvider>, config: EnrichmentConfig) -> Self {
        let quota = QuotaGuard::new(config.quota_window, config.quota_limit);
        let headline_cache = SingleFlightCache::new(config.headline_ttl);
        Self {
            provider,
            config,
            quota,
            headline_cache,
        }
    }

    /// Attach fundamentals and recent headlines to `events` in place.
    /// Never fails; at worst the events come back untouched.
    pub async fn enrich(&self, events: &mut [CatalystEvent]) {
        if events.is_empty() {
            return;
        }
        if let Err(wait) = self.quota.acquire() {
            warn!(
                retry_after_ms = wait.as_millis() as u64,
                "enrichment budget spent, skipping cycle"
            );
            return;
        }

        let tickers = unique_tickers(events, self.config.fundamentals_ticker_cap);
        if tickers.is_empty() {
            return;
        }

        self.attach_fundamentals(events, &tickers).await;

        let top: Vec<Ticker> = tickers
            .into_iter()
            .take(self.config.headline_ticker_cap)
            .collect();
        self.attach_headlines(events, &top).await;
    }

    async fn attach_fundamentals(&self, events: &mut [CatalystEvent], tickers: &[Ticker]) {
        let fetch = self.provider.fetch_fundamentals(tickers);
        match timeout(self.config.fundamentals_timeout, fetch).await {
            Ok(Ok(snapshots)) => {
                debug!(tickers = snapshots.len(), "fundamentals attached");
                for event in events.iter_mut() {
                    let Some(snapshot) = snapshots.get(&event.ticker) else {
                        continue;
                    };
                    // Calendar rows often carry the bare ticker where the
                    // company name belongs; the snapshot knows better.
                    let placeholder = event.company.as_deref() == Some(event.ticker.as_str());
                    if event.company.is_none() || placeholder {
                        if let Some(name) = snapshot.company_name() {
                            event.company = Some(name.to_owned());
                        }
                    }
                    event.fundamentals = Some(snapshot.clone());
                }
            }
            Ok(Err(error)) => {
                warn!(code = error.code(), message = error.message(), "fundamentals fetch failed");
            }
            Err(_) => warn!("fundamentals fetch timed out, skipping"),
        }
    }

    async fn attach_headlines(&self, events: &mut [CatalystEvent], tickers: &[Ticker]) {
        if tickers.is_empty() {
            return;
        }
        let semaphore = Semaphore::new(self.config.max_concurrency.max(1));
        let fetches = tickers
            .iter()
            .map(|ticker| self.headlines_for(ticker, &semaphore));

        match timeout(self.config.headlines_timeout, join_all(fetches)).await {
            Ok(results) => {
                let by_ticker: HashMap<Ticker, Vec<Headline>> =
                    results.into_iter().flatten().collect();
                for event in events.iter_mut() {
                    if let Some(headlines) = by_ticker.get(&event.ticker) {
                        event.headlines = Some(headlines.clone());
                    }
                }
            }
            Err(_) => warn!("headline phase timed out, skipping"),
        }
    }

    /// One ticker's headlines, served from the per-ticker cache when fresh.
    async fn headlines_for(
        &self,
        ticker: &Ticker,
        semaphore: &Semaphore,
    ) -> Option<(Ticker, Vec<Headline>)> {
        let _permit = semaphore.acquire().await.ok()?;

        let response = self
            .headline_cache
            .get_or_compute(ticker.clone(), || async move {
                let batch = [ticker.clone()];
                match timeout(
                    self.config.per_ticker_timeout,
                    self.provider.fetch_headlines(&batch),
                )
                .await
                {
                    Ok(Ok(mut map)) => Ok(map.remove(ticker).unwrap_or_default()),
                    Ok(Err(error)) => Err(error),
                    Err(_) => Err(AdapterError::timeout("headline fetch deadline")),
                }
            })
            .await;

        match response {
            Ok(response) => response
                .value()
                .map(|headlines| (ticker.clone(), (**headlines).clone())),
            Err(error) => {
                warn!(ticker = %ticker, code = error.code(), "headline fetch failed");
                None
            }
        }
    }
}

/// Unique tickers in first-seen order, capped.
fn unique_tickers(events: &[CatalystEvent], cap: usize) -> Vec<Ticker> {
    let mut seen = Vec::with_capacity(cap);
    for event in events {
        if seen.len() == cap {
            break;
        }
        if !seen.contains(&event.ticker) {
            seen.push(event.ticker.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_core::{CatalystCategory, ProviderId};

    fn event(ticker: &str) -> CatalystEvent {
        CatalystEvent::new(
            Ticker::parse(ticker).expect("must parse"),
            CatalystCategory::RegulatoryDecision,
            ProviderId::parse("rttnews").expect("must parse"),
        )
    }

    #[test]
    fn unique_tickers_preserve_first_seen_order() {
        let events = vec![event("BBB"), event("AAA"), event("BBB"), event("CCC")];
        let tickers = unique_tickers(&events, 10);
        let names: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
        assert_eq!(names, vec!["BBB", "AAA", "CCC"]);
    }

    #[test]
    fn unique_tickers_respect_cap() {
        let events = vec![event("AAA"), event("BBB"), event("CCC")];
        assert_eq!(unique_tickers(&events, 2).len(), 2);
    }
}
