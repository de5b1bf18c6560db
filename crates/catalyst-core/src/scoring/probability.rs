//! Layered outcome-probability estimate.
//!
//! Five layers over a published base rate: category base rate, therapeutic
//! area, drug modality, regulatory designations, then live market signals
//! from the enrichment snapshot. Decided events short-circuit to 0 or 100.
//! The function is pure: identical inputs produce the identical value and
//! the identical factor trail, byte for byte.

use crate::domain::{CatalystCategory, CatalystEvent, Confidence, EventStatus, OutcomeProbability};
use crate::scoring::ScoringTables;

/// Working floor/ceiling while layering adjustments.
const FLOOR: f64 = 3.0;
const CEILING: f64 = 97.0;
/// Negative market signals bottom out higher: bad sentiment alone never
/// drags a live catalyst into lottery-ticket territory.
const MARKET_FLOOR: f64 = 10.0;

pub fn outcome_probability(event: &CatalystEvent, tables: &ScoringTables) -> OutcomeProbability {
    if let Some(decided) = decided_outcome(event) {
        return decided;
    }

    let text = event.search_text();
    let mut factors: Vec<String> = Vec::new();

    let supplemental = ["sbla", "snda", "supplemental", "label expansion"]
        .iter()
        .any(|w| text.contains(w));

    let mut probability = base_rate(event.category, supplemental, &text, &mut factors);

    apply_area_modifier(event.category, supplemental, &text, tables, &mut probability, &mut factors);
    apply_modality_modifier(&text, tables, &mut probability, &mut factors);
    apply_designations(&text, tables, &mut probability, &mut factors);
    let has_market_data = apply_market_signals(event, &mut probability, &mut factors);

    let confidence = match (has_market_data, event.sources.len() >= 2) {
        (true, true) => Confidence::High,
        (true, false) | (false, true) => Confidence::Medium,
        (false, false) => Confidence::Low,
    };
    if event.sources.len() >= 2 {
        factors.push(format!(
            "Confirmed by {} independent sources",
            event.sources.len()
        ));
    }

    OutcomeProbability {
        value: probability.clamp(FLOOR, CEILING).round() as u8,
        confidence,
        factors,
    }
}

fn decided_outcome(event: &CatalystEvent) -> Option<OutcomeProbability> {
    let confirmed = |value: u8, factor: &str| OutcomeProbability {
        value,
        confidence: Confidence::Confirmed,
        factors: vec![factor.to_owned()],
    };

    match event.status {
        Some(EventStatus::Approved) => return Some(confirmed(100, "Approval granted")),
        Some(EventStatus::Rejected) => return Some(confirmed(0, "Application rejected")),
        Some(EventStatus::ResponseLetter) => {
            return Some(confirmed(0, "Complete response letter issued"))
        }
        _ => {}
    }
    match event.category {
        CatalystCategory::Approval => Some(confirmed(100, "Already approved")),
        CatalystCategory::Rejection => Some(confirmed(0, "Already rejected")),
        _ => None,
    }
}

fn base_rate(
    category: CatalystCategory,
    supplemental: bool,
    text: &str,
    factors: &mut Vec<String>,
) -> f64 {
    match category {
        CatalystCategory::RegulatoryDecision
        | CatalystCategory::NewDrugFiling
        | CatalystCategory::BiologicsFiling => {
            if supplemental {
                factors.push("Base rate: supplemental filing approval 93%".to_owned());
                93.0
            } else {
                factors.push("Base rate: first-cycle filing approval 85%".to_owned());
                85.0
            }
        }
        CatalystCategory::AdvisoryReview => {
            factors.push("Base rate: advisory committee to approval 75%".to_owned());
            75.0
        }
        CatalystCategory::TrialPhase3 => {
            if text.contains("pivotal") {
                factors.push("Base rate: pivotal phase 3 to approval 62%".to_owned());
                62.0
            } else {
                factors.push("Base rate: phase 3 to approval 58%".to_owned());
                58.0
            }
        }
        CatalystCategory::TrialPhase2 => {
            factors.push("Base rate: phase 2 to approval 15%".to_owned());
            15.0
        }
        CatalystCategory::TrialPhase1 => {
            factors.push("Base rate: phase 1 to approval 6.7%".to_owned());
            6.7
        }
        _ => {
            factors.push("No category base rate".to_owned());
            50.0
        }
    }
}

fn is_filing(category: CatalystCategory) -> bool {
    matches!(
        category,
        CatalystCategory::RegulatoryDecision
            | CatalystCategory::NewDrugFiling
            | CatalystCategory::BiologicsFiling
    )
}

fn is_trial(category: CatalystCategory) -> bool {
    matches!(
        category,
        CatalystCategory::TrialPhase1 | CatalystCategory::TrialPhase2 | CatalystCategory::TrialPhase3
    )
}

fn apply_area_modifier(
    category: CatalystCategory,
    supplemental: bool,
    text: &str,
    tables: &ScoringTables,
    probability: &mut f64,
    factors: &mut Vec<String>,
) {
    if is_filing(category) && !supplemental {
        if let Some((keyword, rate)) = tables
            .filing_approval_by_area
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
        {
            let diff = rate - 85.0;
            if diff != 0.0 {
                *probability = (*probability + diff).clamp(MARKET_FLOOR, CEILING);
                factors.push(format!(
                    "Therapeutic area ({keyword}): filing approval {rate:.0}% ({diff:+.0}%)"
                ));
            }
        }
        return;
    }

    if is_trial(category) {
        if let Some((keyword, rate)) = tables
            .area_success
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
        {
            let ratio = rate / tables.average_area_success;
            let modifier = (((ratio - 1.0) * 10.0) as i32).clamp(-10, 10);
            if modifier != 0 {
                *probability = (*probability + f64::from(modifier)).clamp(FLOOR, CEILING);
                let direction = if modifier > 0 { "above" } else { "below" };
                factors.push(format!(
                    "Therapeutic area ({keyword}): success rate {rate:.1}%, {direction} average ({modifier:+}%)"
                ));
            }
        }
    }
}

fn apply_modality_modifier(
    text: &str,
    tables: &ScoringTables,
    probability: &mut f64,
    factors: &mut Vec<String>,
) {
    if let Some((modality, modifier)) = tables
        .modality_modifiers
        .iter()
        .find(|(modality, _)| text.contains(modality))
    {
        if *modifier != 0 {
            *probability = (*probability + f64::from(*modifier)).clamp(FLOOR, CEILING);
            factors.push(format!("Drug modality ({modality}): {modifier:+}%"));
        }
    }
}

fn apply_designations(
    text: &str,
    tables: &ScoringTables,
    probability: &mut f64,
    factors: &mut Vec<String>,
) {
    let raise = |delta: f64, factor: &str, probability: &mut f64, factors: &mut Vec<String>| {
        *probability = (*probability + delta).min(CEILING);
        factors.push(factor.to_owned());
    };

    if text.contains("breakthrough") {
        raise(4.0, "Breakthrough therapy designation: +4%", probability, factors);
    } else if text.contains("priority review") || text.contains("priority") {
        raise(3.0, "Priority review: +3%", probability, factors);
    } else if text.contains("accelerated approval") || text.contains("accelerated") {
        raise(3.0, "Accelerated approval pathway: +3%", probability, factors);
    } else if text.contains("fast track") {
        raise(2.0, "Fast track designation: +2%", probability, factors);
    }

    if ["orphan", "rare disease", "ultra-rare"]
        .iter()
        .any(|w| text.contains(w))
    {
        raise(4.0, "Orphan drug designation: +4%", probability, factors);
    }

    if tables
        .rare_disease_indicators
        .iter()
        .any(|indicator| text.contains(indicator))
    {
        raise(
            3.0,
            "Rare genetic disease, high unmet need: +3%",
            probability,
            factors,
        );
    }

    if tables.established_drugs.iter().any(|drug| text.contains(drug)) {
        raise(
            4.0,
            "Established drug, label extension: +4%",
            probability,
            factors,
        );
    }
}

/// Layer the live market signals in. Returns whether any signal was present.
fn apply_market_signals(
    event: &CatalystEvent,
    probability: &mut f64,
    factors: &mut Vec<String>,
) -> bool {
    let Some(fundamentals) = event.fundamentals.as_ref() else {
        return false;
    };
    let mut has_market_data = false;

    let raise = |delta: f64, factor: String, probability: &mut f64, factors: &mut Vec<String>| {
        *probability = (*probability + delta).min(CEILING);
        factors.push(factor);
    };
    let lower = |delta: f64, factor: String, probability: &mut f64, factors: &mut Vec<String>| {
        *probability = (*probability - delta).max(MARKET_FLOOR);
        factors.push(factor);
    };

    if let (Some(upside), Some(target)) = (
        fundamentals.target_upside_pct(),
        fundamentals.target_price(),
    ) {
        has_market_data = true;
        if upside >= 40.0 {
            raise(5.0, format!("Analyst target ${target:.0} ({upside:+.0}% upside): +5%"), probability, factors);
        } else if upside >= 20.0 {
            raise(3.0, format!("Analyst target ${target:.0} ({upside:+.0}% upside): +3%"), probability, factors);
        } else if upside >= 5.0 {
            raise(1.0, format!("Analyst target ${target:.0} ({upside:+.0}% upside): +1%"), probability, factors);
        } else if upside < -15.0 {
            lower(5.0, format!("Analyst target ${target:.0} ({upside:.0}% downside): -5%"), probability, factors);
        } else if upside < -5.0 {
            lower(2.0, format!("Analyst target below price ({upside:.0}%): -2%"), probability, factors);
        }
    }

    if let Some(recom) = fundamentals.recommendation() {
        has_market_data = true;
        if recom <= 1.5 {
            raise(3.0, format!("Analyst consensus strong buy ({recom:.1}/5): +3%"), probability, factors);
        } else if recom <= 2.2 {
            raise(2.0, format!("Analyst consensus buy ({recom:.1}/5): +2%"), probability, factors);
        } else if recom >= 3.5 {
            lower(3.0, format!("Analyst consensus underperform ({recom:.1}/5): -3%"), probability, factors);
        } else if recom >= 3.0 {
            lower(1.0, format!("Analyst consensus hold ({recom:.1}/5): -1%"), probability, factors);
        }
    }

    if let Some(insider) = fundamentals.insider_transactions_pct() {
        if insider != 0.0 {
            has_market_data = true;
            if insider > 10.0 {
                raise(4.0, format!("Insider buying {insider:+.0}%: +4%"), probability, factors);
            } else if insider > 2.0 {
                raise(2.0, format!("Insider buying {insider:+.0}%: +2%"), probability, factors);
            } else if insider < -15.0 {
                lower(4.0, format!("Heavy insider selling {insider:.0}%: -4%"), probability, factors);
            } else if insider < -5.0 {
                lower(2.0, format!("Insider selling {insider:.0}%: -2%"), probability, factors);
            }
        }
    }

    if let Some(inst) = fundamentals.institutional_transactions_pct() {
        if inst != 0.0 {
            has_market_data = true;
            if inst > 10.0 {
                raise(3.0, format!("Institutions accumulating {inst:+.0}%: +3%"), probability, factors);
            } else if inst > 3.0 {
                raise(1.0, format!("Institutional buying {inst:+.0}%: +1%"), probability, factors);
            } else if inst < -10.0 {
                lower(3.0, format!("Institutions exiting {inst:.0}%: -3%"), probability, factors);
            } else if inst < -3.0 {
                lower(1.0, format!("Institutional selling {inst:.0}%: -1%"), probability, factors);
            }
        }
    }

    if let Some(perf) = fundamentals.perf_month_pct() {
        if perf.abs() >= 5.0 {
            has_market_data = true;
            if perf >= 20.0 {
                raise(3.0, format!("Stock {perf:+.0}% this month, market pricing in approval: +3%"), probability, factors);
            } else if perf >= 10.0 {
                raise(1.0, format!("Stock {perf:+.0}% this month: +1%"), probability, factors);
            } else if perf <= -20.0 {
                lower(4.0, format!("Stock {perf:.0}% this month, market concerned: -4%"), probability, factors);
            } else if perf <= -10.0 {
                lower(2.0, format!("Stock {perf:.0}% this month: -2%"), probability, factors);
            }
        }
    }

    has_market_data
}
