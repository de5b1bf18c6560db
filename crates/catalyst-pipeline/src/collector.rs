//! Bounded concurrent collection across source adapters.
//!
//! All adapters race under a shared semaphore with a per-adapter deadline
//! and one overall deadline. Any subset may fail; the collector reports
//! partial results plus a per-provider failure record instead of an error.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{info, warn};

use catalyst_core::{AdapterError, FetchWindow, ProviderId, RawEvent, SourceAdapter};

use crate::config::CollectorConfig;

/// One provider's failure inside an otherwise usable collection.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub provider: ProviderId,
    pub error: AdapterError,
}

/// Outcome of one collection cycle. Never an error: a total failure is a
/// result with an empty `succeeded` list.
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    pub events: Vec<RawEvent>,
    pub succeeded: Vec<ProviderId>,
    pub failed: Vec<SourceFailure>,
}

impl CollectionResult {
    pub fn is_total_failure(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// Fans a fetch window out to every registered adapter.
pub struct Collector {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, config: CollectorConfig) -> Self {
        Self { adapters, config }
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Collect raw events from every adapter, tolerating individual
    /// failures. Adapters still running at the overall deadline are aborted
    /// and recorded as timed out.
    pub async fn collect(&self, window: FetchWindow) -> CollectionResult {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let per_adapter_timeout = self.config.per_adapter_timeout;

        let mut tasks: JoinSet<(ProviderId, Result<Vec<RawEvent>, AdapterError>)> = JoinSet::new();
        let mut pending: BTreeSet<ProviderId> = BTreeSet::new();

        for adapter in &self.adapters {
            pending.insert(adapter.id());
            let adapter = Arc::clone(adapter);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let provider = adapter.id();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (provider, Err(AdapterError::unreachable("collector closed")))
                    }
                };
                let outcome = match timeout(per_adapter_timeout, adapter.fetch(window)).await {
                    Ok(result) => result,
                    Err(_) => Err(AdapterError::timeout(format!(
                        "no response within {per_adapter_timeout:?}"
                    ))),
                };
                (provider, outcome)
            });
        }

        let mut result = CollectionResult::default();
        let deadline = Instant::now() + self.config.overall_timeout;
        let mut deadline_hit = false;

        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((provider, Ok(events))))) => {
                    pending.remove(&provider);
                    info!(provider = %provider, count = events.len(), "source fetch succeeded");
                    result.events.extend(events);
                    result.succeeded.push(provider);
                }
                Ok(Some(Ok((provider, Err(error))))) => {
                    pending.remove(&provider);
                    warn!(provider = %provider, code = error.code(), message = error.message(), "source fetch failed");
                    result.failed.push(SourceFailure { provider, error });
                }
                Ok(Some(Err(join_error))) => {
                    warn!(error = %join_error, "source task aborted");
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    tasks.abort_all();
                    break;
                }
            }
        }

        // Anything still pending never reported back: either the overall
        // deadline cut it off or its task died.
        for provider in pending {
            if result.succeeded.contains(&provider)
                || result.failed.iter().any(|f| f.provider == provider)
            {
                continue;
            }
            let error = if deadline_hit {
                AdapterError::timeout("aborted at overall collection deadline")
            } else {
                AdapterError::unreachable("source task ended without a result")
            };
            warn!(provider = %provider, code = error.code(), "source fetch failed");
            result.failed.push(SourceFailure { provider, error });
        }

        info!(
            events = result.events.len(),
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "collection cycle finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    use catalyst_core::CatalystCategory;

    struct StaticAdapter {
        id: ProviderId,
        events: usize,
        delay: Duration,
    }

    impl SourceAdapter for StaticAdapter {
        fn id(&self) -> ProviderId {
            self.id.clone()
        }

        fn fetch<'a>(
            &'a self,
            _window: FetchWindow,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<RawEvent>, AdapterError>> + Send + 'a>>
        {
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                Ok((0..self.events)
                    .map(|i| {
                        RawEvent::new(
                            format!("TK{i}"),
                            CatalystCategory::RegulatoryDecision,
                            self.id.clone(),
                        )
                    })
                    .collect())
            })
        }
    }

    fn adapter(name: &str, events: usize, delay: Duration) -> Arc<dyn SourceAdapter> {
        Arc::new(StaticAdapter {
            id: ProviderId::parse(name).expect("must parse"),
            events,
            delay,
        })
    }

    #[tokio::test]
    async fn collects_from_all_adapters() {
        let collector = Collector::new(
            vec![
                adapter("alpha", 2, Duration::ZERO),
                adapter("beta", 3, Duration::ZERO),
            ],
            CollectorConfig::default(),
        );

        let result = collector.collect(FetchWindow::default()).await;
        assert_eq!(result.events.len(), 5);
        assert_eq!(result.succeeded.len(), 2);
        assert!(result.failed.is_empty());
    }

    #[tokio::test]
    async fn slow_adapter_times_out_alone() {
        let config = CollectorConfig {
            per_adapter_timeout: Duration::from_millis(50),
            overall_timeout: Duration::from_secs(5),
            ..CollectorConfig::default()
        };
        let collector = Collector::new(
            vec![
                adapter("fast", 1, Duration::ZERO),
                adapter("slow", 1, Duration::from_secs(2)),
            ],
            config,
        );

        let result = collector.collect(FetchWindow::default()).await;
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].error.code(), "adapter.timeout");
        assert!(!result.is_total_failure());
    }

    #[tokio::test]
    async fn overall_deadline_aborts_stragglers() {
        let config = CollectorConfig {
            max_concurrency: 2,
            per_adapter_timeout: Duration::from_secs(10),
            overall_timeout: Duration::from_millis(100),
        };
        let collector = Collector::new(
            vec![
                adapter("fast", 1, Duration::ZERO),
                adapter("slow_a", 1, Duration::from_secs(5)),
                adapter("slow_b", 1, Duration::from_secs(5)),
            ],
            config,
        );

        let result = collector.collect(FetchWindow::default()).await;
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.failed.len(), 2);
        assert!(result
            .failed
            .iter()
            .all(|f| f.error.code() == "adapter.timeout"));
    }
}
