//! Trading-opportunity score.
//!
//! Measures how tradeable the event is, independent of whether the outcome
//! is likely to be positive. Six capped buckets: timing, volatility setup,
//! volume and liquidity, institutional signal, analyst view, and
//! confirmation. Missing or unparseable enrichment fields contribute zero.

use crate::domain::{CatalystEvent, Fundamentals, TradingScore};
use crate::scoring::ScoringTables;

pub fn trading_score(event: &CatalystEvent, _tables: &ScoringTables) -> TradingScore {
    let mut score: i32 = 0;
    let mut factors: Vec<String> = Vec::new();
    let empty = Fundamentals::new();
    let fundamentals = event.fundamentals.as_ref().unwrap_or(&empty);

    score += timing_points(event.days_until, &mut factors);
    score += volatility_points(fundamentals, &mut factors);
    score += volume_points(fundamentals, &mut factors);
    score += institutional_points(fundamentals, &mut factors);
    score += analyst_points(fundamentals, &mut factors);
    score += confirmation_points(event, fundamentals, &mut factors);

    TradingScore {
        value: score.clamp(0, 100) as u8,
        factors,
    }
}

/// Timing bucket, 0-20. A catalyst today is maximally actionable; stale
/// past events decay to zero.
fn timing_points(days_until: Option<i64>, factors: &mut Vec<String>) -> i32 {
    let Some(days) = days_until else {
        return 2;
    };
    match days {
        0 => {
            factors.push("Catalyst today (+20)".to_owned());
            20
        }
        1..=3 => {
            factors.push(format!("Catalyst in {days}d, imminent (+18)"));
            18
        }
        4..=7 => {
            factors.push("Catalyst this week (+15)".to_owned());
            15
        }
        8..=14 => {
            factors.push("Catalyst in about two weeks (+12)".to_owned());
            12
        }
        15..=30 => {
            factors.push("Catalyst this month (+8)".to_owned());
            8
        }
        31..=60 => {
            factors.push(format!("Catalyst in {days}d (+4)"));
            4
        }
        days if days < 0 => (3 - days.abs() / 7).max(0) as i32,
        _ => 0,
    }
}

/// Volatility bucket, 0-20: daily range, market sensitivity, squeeze setup.
fn volatility_points(fundamentals: &Fundamentals, factors: &mut Vec<String>) -> i32 {
    let mut points = 0;

    if let Some(atr_pct) = fundamentals.atr_pct() {
        if atr_pct >= 5.0 {
            points += 8;
            factors.push(format!("High ATR {atr_pct:.1}%, volatile (+8)"));
        } else if atr_pct >= 3.0 {
            points += 6;
            factors.push(format!("ATR {atr_pct:.1}% (+6)"));
        } else if atr_pct >= 2.0 {
            points += 4;
            factors.push(format!("ATR {atr_pct:.1}% (+4)"));
        } else if atr_pct >= 1.0 {
            points += 2;
        }
    }

    if let Some(beta) = fundamentals.beta() {
        if beta >= 2.0 {
            points += 4;
            factors.push(format!("High beta {beta:.1} (+4)"));
        } else if beta >= 1.5 {
            points += 3;
        } else if beta >= 1.0 {
            points += 1;
        }
    }

    if let Some(short_float) = fundamentals.short_float_pct() {
        if short_float >= 20.0 {
            points += 8;
            factors.push(format!("Short squeeze setup: {short_float:.0}% short (+8)"));
        } else if short_float >= 15.0 {
            points += 6;
            factors.push(format!("High short interest: {short_float:.0}% (+6)"));
        } else if short_float >= 10.0 {
            points += 4;
            factors.push(format!("Elevated short interest: {short_float:.0}% (+4)"));
        } else if short_float >= 5.0 {
            points += 2;
        }
    }

    points
}

/// Volume and liquidity bucket, 0-15.
fn volume_points(fundamentals: &Fundamentals, factors: &mut Vec<String>) -> i32 {
    let mut points = 0;

    if let Some(rel_vol) = fundamentals.relative_volume() {
        if rel_vol >= 3.0 {
            points += 8;
            factors.push(format!("Unusual volume {rel_vol:.1}x (+8)"));
        } else if rel_vol >= 2.0 {
            points += 6;
            factors.push(format!("Volume surge {rel_vol:.1}x (+6)"));
        } else if rel_vol >= 1.5 {
            points += 4;
            factors.push(format!("Above-average volume {rel_vol:.1}x (+4)"));
        } else if rel_vol >= 1.0 {
            points += 2;
        }
    }

    if let Some(avg_vol) = fundamentals.average_volume() {
        if avg_vol >= 2_000_000.0 {
            points += 5;
            factors.push("High liquidity, 2M+ average volume (+5)".to_owned());
        } else if avg_vol >= 500_000.0 {
            points += 4;
            factors.push("Good liquidity (+4)".to_owned());
        } else if avg_vol >= 100_000.0 {
            points += 2;
        } else {
            factors.push("Low liquidity, trade with caution".to_owned());
        }
    }

    if let Some(gap) = fundamentals.gap_pct() {
        if gap.abs() >= 5.0 {
            points += 2;
            factors.push(format!("Gap {gap:+.1}% pre-market (+2)"));
        }
    }

    points
}

/// Institutional bucket, 0-15: smart-money positioning ahead of the event.
fn institutional_points(fundamentals: &Fundamentals, factors: &mut Vec<String>) -> i32 {
    let mut points = 0;

    if let Some(inst_own) = fundamentals.institutional_ownership_pct() {
        if inst_own >= 80.0 {
            points += 6;
            factors.push(format!("Strong institutional ownership {inst_own:.0}% (+6)"));
        } else if inst_own >= 50.0 {
            points += 4;
            factors.push(format!("Institutional ownership {inst_own:.0}% (+4)"));
        } else if inst_own >= 20.0 {
            points += 2;
        }
    }

    if let Some(insider) = fundamentals.insider_transactions_pct() {
        if insider > 5.0 {
            points += 5;
            factors.push(format!("Insider buying {insider:+.0}% (+5)"));
        } else if insider > 0.0 {
            points += 3;
            factors.push(format!("Insider buying {insider:+.0}% (+3)"));
        } else if insider < -10.0 {
            points -= 2;
            factors.push(format!("Insider selling {insider:.0}% (-2)"));
        }
    }

    if let Some(inst) = fundamentals.institutional_transactions_pct() {
        if inst > 5.0 {
            points += 4;
            factors.push(format!("Institutions accumulating {inst:+.0}% (+4)"));
        } else if inst > 0.0 {
            points += 2;
        } else if inst < -5.0 {
            points -= 1;
            factors.push(format!("Institutions reducing {inst:.0}% (-1)"));
        }
    }

    points
}

/// Analyst bucket, 0-15: consensus rating and target upside.
fn analyst_points(fundamentals: &Fundamentals, factors: &mut Vec<String>) -> i32 {
    let mut points = 0;

    if let Some(recom) = fundamentals.recommendation() {
        if recom <= 1.5 {
            points += 8;
            factors.push(format!("Analyst consensus: strong buy ({recom:.1}) (+8)"));
        } else if recom <= 2.0 {
            points += 6;
            factors.push(format!("Analyst consensus: buy ({recom:.1}) (+6)"));
        } else if recom <= 2.5 {
            points += 4;
            factors.push(format!("Analyst consensus: outperform ({recom:.1}) (+4)"));
        } else if recom <= 3.0 {
            points += 2;
        } else if recom > 3.5 {
            points -= 2;
            factors.push(format!("Analyst consensus: underperform ({recom:.1}) (-2)"));
        }
    }

    if let (Some(upside), Some(target)) = (
        fundamentals.target_upside_pct(),
        fundamentals.target_price(),
    ) {
        if upside >= 30.0 {
            points += 7;
            factors.push(format!("Target ${target:.0}, {upside:.0}% upside (+7)"));
        } else if upside >= 15.0 {
            points += 5;
            factors.push(format!("Target ${target:.0}, {upside:.0}% upside (+5)"));
        } else if upside >= 5.0 {
            points += 3;
            factors.push(format!("Target ${target:.0}, {upside:.0}% upside (+3)"));
        } else if upside < -10.0 {
            points -= 2;
            factors.push(format!("Target ${target:.0}, {:.0}% downside (-2)", upside.abs()));
        }
    }

    points
}

/// Confirmation bucket, 0-15: source agreement, category weight, momentum.
fn confirmation_points(
    event: &CatalystEvent,
    fundamentals: &Fundamentals,
    factors: &mut Vec<String>,
) -> i32 {
    let mut points = 0;

    let sources = event.sources.len();
    if sources >= 3 {
        points += 6;
        factors.push(format!("Confirmed by {sources} independent sources (+6)"));
    } else if sources >= 2 {
        points += 4;
        factors.push(format!("Confirmed by {sources} sources (+4)"));
    } else {
        points += 1;
    }

    points += event.category.importance_bonus();

    if let Some(perf_week) = fundamentals.perf_week_pct() {
        if perf_week.abs() >= 10.0 {
            points += 4;
            factors.push(format!("Week performance {perf_week:+.1}%, active (+4)"));
        } else if perf_week.abs() >= 5.0 {
            points += 2;
        }
    }

    points
}
