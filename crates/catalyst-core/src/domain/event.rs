use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{CatalystCategory, EventDate, EventStatus, Fundamentals, Ticker, UtcDateTime};
use crate::ProviderId;

const MAX_SUMMARY_LEN: usize = 300;

/// Unvalidated event exactly as one source reported it.
///
/// The ticker stays a raw string: validation and blacklist filtering happen
/// in the merger so that one malformed record never fails a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub ticker: String,
    pub category: CatalystCategory,
    pub provider: ProviderId,
    pub company: Option<String>,
    pub drug_name: Option<String>,
    pub indication: Option<String>,
    pub stage: Option<String>,
    pub status: Option<EventStatus>,
    pub event_date: Option<EventDate>,
    pub url: Option<String>,
}

impl RawEvent {
    pub fn new(ticker: impl Into<String>, category: CatalystCategory, provider: ProviderId) -> Self {
        Self {
            ticker: ticker.into(),
            category,
            provider,
            company: None,
            drug_name: None,
            indication: None,
            stage: None,
            status: None,
            event_date: None,
            url: None,
        }
    }
}

/// Canonical merged event, the unit the scoring and enrichment steps work on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalystEvent {
    pub ticker: Ticker,
    pub category: CatalystCategory,
    pub sources: BTreeSet<ProviderId>,
    pub company: Option<String>,
    pub drug_name: Option<String>,
    pub indication: Option<String>,
    pub stage: Option<String>,
    pub status: Option<EventStatus>,
    pub event_date: Option<EventDate>,
    pub url: Option<String>,
    /// Signed days from "today" to the event; `None` when undated.
    pub days_until: Option<i64>,
    pub fundamentals: Option<Fundamentals>,
    pub headlines: Option<Vec<Headline>>,
    pub outcome: Option<OutcomeProbability>,
    pub trading_score: Option<TradingScore>,
}

impl CatalystEvent {
    pub fn new(ticker: Ticker, category: CatalystCategory, source: ProviderId) -> Self {
        let mut sources = BTreeSet::new();
        sources.insert(source);
        Self {
            ticker,
            category,
            sources,
            company: None,
            drug_name: None,
            indication: None,
            stage: None,
            status: None,
            event_date: None,
            url: None,
            days_until: None,
            fundamentals: None,
            headlines: None,
            outcome: None,
            trading_score: None,
        }
    }

    /// Lowercased free-text haystack for keyword heuristics.
    pub fn search_text(&self) -> String {
        let mut text = String::new();
        for part in [
            self.drug_name.as_deref(),
            self.indication.as_deref(),
            self.stage.as_deref(),
            Some(self.category.as_str()),
            self.company.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(part);
        }
        text.to_lowercase()
    }
}

/// One recent news item attached during enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub publisher: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<UtcDateTime>,
    pub summary: Option<String>,
}

impl Headline {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            publisher: None,
            url: None,
            published_at: None,
            summary: None,
        }
    }

    /// Attach a summary, truncated to a display-friendly length.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        self.summary = Some(if summary.chars().count() > MAX_SUMMARY_LEN {
            let truncated: String = summary.chars().take(MAX_SUMMARY_LEN - 3).collect();
            format!("{truncated}...")
        } else {
            summary
        });
        self
    }
}

/// How much the outcome estimate can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    /// The outcome already happened; no estimation involved.
    Confirmed,
}

/// Estimated probability that the catalyst resolves positively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeProbability {
    /// Percentage in `0..=100`.
    pub value: u8,
    pub confidence: Confidence,
    /// Human-readable adjustment trail, reproducible byte-for-byte for
    /// identical inputs.
    pub factors: Vec<String>,
}

/// How tradeable the event is, independent of the expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingScore {
    /// Total in `0..=100`.
    pub value: u8,
    pub factors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_joins_lowercased_fields() {
        let provider = ProviderId::parse("rttnews").expect("must parse");
        let ticker = Ticker::parse("SRPT").expect("must parse");
        let mut event = CatalystEvent::new(ticker, CatalystCategory::TrialPhase3, provider);
        event.drug_name = Some("SRP-9001".to_owned());
        event.indication = Some("Duchenne Muscular Dystrophy".to_owned());

        let text = event.search_text();
        assert!(text.contains("srp-9001"));
        assert!(text.contains("duchenne muscular dystrophy"));
        assert!(text.contains("trial_phase3"));
    }

    #[test]
    fn long_summaries_are_truncated() {
        let headline = Headline::new("title").with_summary("x".repeat(400));
        let summary = headline.summary.expect("summary set");
        assert_eq!(summary.chars().count(), 300);
        assert!(summary.ends_with("..."));
    }
}
