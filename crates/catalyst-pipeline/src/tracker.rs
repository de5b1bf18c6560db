//! The pipeline entry point.
//!
//! `CatalystTracker` wires the collector, merger, enricher, and scorer
//! behind a single-flight snapshot cache. Callers get a response for every
//! query; degraded states are reported in the metadata, not as errors.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use catalyst_core::{
    merge, score_event, CatalystCategory, CatalystEvent, EnrichmentProvider, FetchWindow,
    MergeConfig, ProviderId, ScoringTables, SourceAdapter, UtcDateTime,
};

use crate::cache::{CacheResponse, SingleFlightCache};
use crate::collector::{CollectionResult, Collector, SourceFailure};
use crate::config::TrackerConfig;
use crate::enrich::Enricher;
use crate::error::PipelineError;

/// One cached snapshot per distinct window and enrichment setting.
type QueryKey = (u32, u32, bool);

/// A query for upcoming and recent catalyst events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub days_back: u32,
    pub days_forward: u32,
    /// Filter applied after the cache; every category shares one snapshot.
    pub category: Option<CatalystCategory>,
    pub enriched: bool,
}

impl EventQuery {
    fn key(&self) -> QueryKey {
        (self.days_back, self.days_forward, self.enriched)
    }

    fn window(&self) -> FetchWindow {
        FetchWindow::new(self.days_back, self.days_forward)
    }
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            days_back: 30,
            days_forward: 90,
            category: None,
            enriched: true,
        }
    }
}

/// How the served events relate to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Served from cache within its TTL.
    Fresh,
    /// Computed by this call.
    Computed,
    /// Expired data served while a refresh runs or after one failed.
    Stale,
    /// A refresh is in flight and no previous snapshot exists.
    NotReady,
    /// The refresh failed outright and nothing cached could stand in.
    Unavailable,
}

/// A source failure flattened for response metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub provider: ProviderId,
    pub code: String,
    pub message: String,
}

impl From<&SourceFailure> for SourceReport {
    fn from(failure: &SourceFailure) -> Self {
        Self {
            provider: failure.provider.clone(),
            code: failure.error.code().to_owned(),
            message: failure.error.message().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub generated_at: UtcDateTime,
    pub freshness: Freshness,
    pub sources_succeeded: Vec<ProviderId>,
    pub sources_failed: Vec<SourceReport>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackerResponse {
    pub events: Vec<CatalystEvent>,
    pub meta: ResponseMeta,
}

/// Everything one refresh produced, cached as a unit so the metadata
/// survives cache hits.
#[derive(Debug, Clone)]
struct Snapshot {
    events: Vec<CatalystEvent>,
    succeeded: Vec<ProviderId>,
    failed: Vec<SourceReport>,
}

pub struct CatalystTracker {
    collector: Collector,
    enricher: Option<Enricher>,
    merge_config: MergeConfig,
    tables: ScoringTables,
    cache: SingleFlightCache<QueryKey, Snapshot>,
}

impl CatalystTracker {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        enrichment: Option<Arc<dyn EnrichmentProvider>>,
        config: TrackerConfig,
    ) -> Self {
        let cache = SingleFlightCache::new(config.cache.events_ttl);
        let enricher =
            enrichment.map(|provider| Enricher::new(provider, config.enrichment.clone()));
        Self {
            collector: Collector::new(adapters, config.collector),
            enricher,
            merge_config: config.merge,
            tables: ScoringTables::default(),
            cache,
        }
    }

    /// Replace the default scoring tables, for callers with their own rates.
    pub fn with_tables(mut self, tables: ScoringTables) -> Self {
        self.tables = tables;
        self
    }

    /// Serve catalyst events for `query`, refreshing the snapshot if needed.
    pub async fn get_catalyst_events(&self, query: EventQuery) -> TrackerResponse {
        let outcome = self
            .cache
            .get_or_compute(query.key(), || self.refresh(&query))
            .await;
        self.respond(&query, outcome)
    }

    /// Expire the cached snapshot for `query` so the next call recomputes.
    /// The expired snapshot stays available for stale serving.
    pub async fn force_refresh(&self, query: &EventQuery) {
        self.cache.force_refresh(&query.key()).await;
    }

    fn respond(
        &self,
        query: &EventQuery,
        outcome: Result<CacheResponse<Snapshot>, PipelineError>,
    ) -> TrackerResponse {
        let mut warnings = Vec::new();
        let (snapshot, freshness) = match outcome {
            Ok(CacheResponse::Fresh(snapshot)) => (Some(snapshot), Freshness::Fresh),
            Ok(CacheResponse::Computed(snapshot)) => (Some(snapshot), Freshness::Computed),
            Ok(CacheResponse::Stale(snapshot)) => {
                warnings
                    .push("serving expired data; a refresh is in flight or just failed".to_owned());
                (Some(snapshot), Freshness::Stale)
            }
            Ok(CacheResponse::NotReady) => {
                warnings.push(
                    "a refresh is already in flight and no snapshot exists yet; retry shortly"
                        .to_owned(),
                );
                (None, Freshness::NotReady)
            }
            Err(PipelineError::AllSourcesFailed { count }) => {
                warn!(sources = count, "refresh failed, no snapshot to serve");
                warnings.push(format!("all {count} sources failed and nothing is cached"));
                (None, Freshness::Unavailable)
            }
        };

        let (events, succeeded, failed) = match snapshot {
            Some(snapshot) => {
                let mut events = snapshot.events.clone();
                if let Some(category) = query.category {
                    events.retain(|event| event.category == category);
                }
                (events, snapshot.succeeded.clone(), snapshot.failed.clone())
            }
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        TrackerResponse {
            events,
            meta: ResponseMeta {
                request_id: Uuid::new_v4().to_string(),
                generated_at: UtcDateTime::now(),
                freshness,
                sources_succeeded: succeeded,
                sources_failed: failed,
                warnings,
            },
        }
    }

    /// One full collect, merge, enrich, and score pass.
    async fn refresh(&self, query: &EventQuery) -> Result<Snapshot, PipelineError> {
        let window = query.window();
        let collection = self.collector.collect(window).await;
        if collection.is_total_failure() {
            return Err(PipelineError::AllSourcesFailed {
                count: collection.failed.len(),
            });
        }

        let CollectionResult {
            events,
            succeeded,
            failed,
        } = collection;

        let merged = merge(events, &self.merge_config);
        let mut kept = self.apply_window(merged, window);

        if query.enriched {
            if let Some(enricher) = &self.enricher {
                enricher.enrich(&mut kept).await;
            }
        }

        for event in &mut kept {
            score_event(event, &self.tables);
        }
        sort_for_presentation(&mut kept);

        info!(
            events = kept.len(),
            succeeded = succeeded.len(),
            failed = failed.len(),
            "snapshot refreshed"
        );
        Ok(Snapshot {
            events: kept,
            succeeded,
            failed: failed.iter().map(SourceReport::from).collect(),
        })
    }

    /// Drop dated events outside the window and stamp `days_until`.
    /// Undated events always survive; their date may firm up later.
    fn apply_window(&self, events: Vec<CatalystEvent>, window: FetchWindow) -> Vec<CatalystEvent> {
        let today = UtcDateTime::now().date();
        let mut kept = Vec::with_capacity(events.len());
        for mut event in events {
            match event.event_date {
                Some(date) => {
                    if window.contains(date, today) {
                        event.days_until = Some(date.days_from(today));
                        kept.push(event);
                    }
                }
                None => kept.push(event),
            }
        }
        kept
    }
}

/// Highest trading score first, then nearest date, then ticker.
fn sort_for_presentation(events: &mut [CatalystEvent]) {
    events.sort_by(|a, b| {
        let score_a = a.trading_score.as_ref().map_or(0, |s| s.value);
        let score_b = b.trading_score.as_ref().map_or(0, |s| s.value);
        score_b
            .cmp(&score_a)
            .then_with(|| proximity(a).cmp(&proximity(b)))
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
}

fn proximity(event: &CatalystEvent) -> i64 {
    event.days_until.map_or(9999, i64::abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_core::{Ticker, TradingScore};

    fn scored(ticker: &str, score: u8, days_until: Option<i64>) -> CatalystEvent {
        let mut event = CatalystEvent::new(
            Ticker::parse(ticker).expect("must parse"),
            CatalystCategory::RegulatoryDecision,
            ProviderId::parse("rttnews").expect("must parse"),
        );
        event.trading_score = Some(TradingScore {
            value: score,
            factors: Vec::new(),
        });
        event.days_until = days_until;
        event
    }

    #[test]
    fn presentation_order_is_score_then_proximity_then_ticker() {
        let mut events = vec![
            scored("CCC", 40, Some(30)),
            scored("BBB", 40, Some(-2)),
            scored("AAA", 70, None),
            scored("DDD", 40, Some(-2)),
        ];
        sort_for_presentation(&mut events);
        let order: Vec<&str> = events.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB", "DDD", "CCC"]);
    }

    #[test]
    fn undated_events_sort_after_any_dated_event_at_equal_score() {
        let mut events = vec![scored("AAA", 40, None), scored("BBB", 40, Some(89))];
        sort_for_presentation(&mut events);
        assert_eq!(events[0].ticker.as_str(), "BBB");
    }

    #[test]
    fn response_meta_serializes_without_headline_noise() {
        let meta = ResponseMeta {
            request_id: "r".to_owned(),
            generated_at: UtcDateTime::now(),
            freshness: Freshness::Computed,
            sources_succeeded: vec![ProviderId::parse("rttnews").expect("must parse")],
            sources_failed: Vec::new(),
            warnings: Vec::new(),
        };
        let json = serde_json::to_string(&meta).expect("meta must serialize");
        assert!(json.contains("\"freshness\":\"computed\""));
    }
}
