//! Deterministic scoring of merged catalyst events.

mod probability;
mod tables;
mod trade_score;

pub use probability::outcome_probability;
pub use tables::ScoringTables;
pub use trade_score::trading_score;

use crate::domain::CatalystEvent;

/// Attach both scores to an event in place.
pub fn score_event(event: &mut CatalystEvent, tables: &ScoringTables) {
    event.outcome = Some(outcome_probability(event, tables));
    event.trading_score = Some(trading_score(event, tables));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalystCategory, EventStatus, Fundamentals, Ticker};
    use crate::ProviderId;

    fn base_event(category: CatalystCategory) -> CatalystEvent {
        CatalystEvent::new(
            Ticker::parse("SRPT").expect("must parse"),
            category,
            ProviderId::parse("rttnews").expect("must parse"),
        )
    }

    #[test]
    fn filing_base_rate_is_85() {
        let outcome = outcome_probability(
            &base_event(CatalystCategory::RegulatoryDecision),
            &ScoringTables::default(),
        );
        assert_eq!(outcome.value, 85);
        assert_eq!(
            outcome.factors[0],
            "Base rate: first-cycle filing approval 85%"
        );
    }

    #[test]
    fn supplemental_filings_use_higher_base() {
        let mut event = base_event(CatalystCategory::RegulatoryDecision);
        event.indication = Some("sBLA label expansion".to_owned());
        let outcome = outcome_probability(&event, &ScoringTables::default());
        assert_eq!(outcome.value, 93);
    }

    #[test]
    fn terminal_status_short_circuits() {
        let mut event = base_event(CatalystCategory::RegulatoryDecision);
        event.status = Some(EventStatus::Approved);
        let outcome = outcome_probability(&event, &ScoringTables::default());
        assert_eq!(outcome.value, 100);
        assert_eq!(outcome.confidence, crate::domain::Confidence::Confirmed);

        event.status = Some(EventStatus::ResponseLetter);
        let outcome = outcome_probability(&event, &ScoringTables::default());
        assert_eq!(outcome.value, 0);
    }

    #[test]
    fn live_probability_stays_inside_working_band() {
        let mut event = base_event(CatalystCategory::TrialPhase1);
        event.indication = Some("alzheimer crispr".to_owned());
        let outcome = outcome_probability(&event, &ScoringTables::default());
        assert!((3..=97).contains(&outcome.value));

        let mut event = base_event(CatalystCategory::RegulatoryDecision);
        event.indication = Some("hematology breakthrough orphan keytruda".to_owned());
        let outcome = outcome_probability(&event, &ScoringTables::default());
        assert!((3..=97).contains(&outcome.value));
    }

    #[test]
    fn identical_inputs_yield_identical_factor_trails() {
        let mut event = base_event(CatalystCategory::TrialPhase3);
        event.indication = Some("pivotal oncology gene therapy".to_owned());
        let mut f = Fundamentals::new();
        f.insert("Price", "10.00");
        f.insert("Target Price", "15.00");
        event.fundamentals = Some(f);

        let tables = ScoringTables::default();
        let a = outcome_probability(&event, &tables);
        let b = outcome_probability(&event, &tables);
        assert_eq!(a, b);
        assert_eq!(trading_score(&event, &tables), trading_score(&event, &tables));
    }

    #[test]
    fn trading_score_rewards_imminent_confirmed_events() {
        let mut event = base_event(CatalystCategory::RegulatoryDecision);
        event.days_until = Some(0);
        event
            .sources
            .insert(ProviderId::parse("drugs_com").expect("must parse"));
        event
            .sources
            .insert(ProviderId::parse("checkrare").expect("must parse"));

        let score = trading_score(&event, &ScoringTables::default());
        // 20 timing + 6 sources + 5 category bonus
        assert_eq!(score.value, 31);
        assert!(score.factors.iter().any(|f| f == "Catalyst today (+20)"));
    }

    #[test]
    fn trading_score_is_clamped_to_zero() {
        let mut event = base_event(CatalystCategory::Other);
        event.days_until = Some(-400);
        let mut f = Fundamentals::new();
        f.insert("Insider Trans", "-25%");
        f.insert("Inst Trans", "-12%");
        f.insert("Recom", "4.5");
        f.insert("Price", "10.00");
        f.insert("Target Price", "5.00");
        event.fundamentals = Some(f);

        let score = trading_score(&event, &ScoringTables::default());
        assert_eq!(score.value, 0);
    }
}
