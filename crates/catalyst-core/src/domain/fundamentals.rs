use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw fundamentals snapshot for one ticker, as reported by an enrichment
/// provider.
///
/// Providers publish loosely formatted strings ("1,234,560", "12.5%", "2.1M"),
/// so all numeric access goes through the fallible parsers below. Scoring
/// treats an unparseable field the same as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fundamentals(BTreeMap<String, String>);

impl Fundamentals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn company_name(&self) -> Option<&str> {
        self.get("Company").filter(|name| !name.trim().is_empty())
    }

    pub fn price(&self) -> Option<f64> {
        self.number("Price")
    }

    pub fn target_price(&self) -> Option<f64> {
        self.number("Target Price")
    }

    /// Analyst target upside over the current price, as a percentage.
    pub fn target_upside_pct(&self) -> Option<f64> {
        let target = self.target_price()?;
        let price = self.price()?;
        if target <= 0.0 || price <= 0.0 {
            return None;
        }
        Some((target - price) / price * 100.0)
    }

    /// Analyst consensus on the 1 (strong buy) to 5 (strong sell) scale.
    pub fn recommendation(&self) -> Option<f64> {
        self.number("Recom").filter(|value| *value > 0.0)
    }

    pub fn insider_transactions_pct(&self) -> Option<f64> {
        self.number("Insider Trans")
    }

    pub fn institutional_transactions_pct(&self) -> Option<f64> {
        self.number("Inst Trans")
    }

    pub fn institutional_ownership_pct(&self) -> Option<f64> {
        self.number("Inst Own")
    }

    pub fn perf_week_pct(&self) -> Option<f64> {
        self.number("Perf Week")
    }

    pub fn perf_month_pct(&self) -> Option<f64> {
        self.number("Perf Month")
    }

    pub fn atr(&self) -> Option<f64> {
        self.number("ATR")
    }

    /// Average true range as a percentage of price.
    pub fn atr_pct(&self) -> Option<f64> {
        let atr = self.atr()?;
        let price = self.price()?;
        if price <= 0.0 {
            return None;
        }
        Some(atr / price * 100.0)
    }

    pub fn beta(&self) -> Option<f64> {
        self.number("Beta")
    }

    pub fn short_float_pct(&self) -> Option<f64> {
        self.number("Short Float")
    }

    pub fn relative_volume(&self) -> Option<f64> {
        self.number("Rel Volume")
    }

    pub fn average_volume(&self) -> Option<f64> {
        self.get("Avg Volume").and_then(parse_volume)
    }

    pub fn gap_pct(&self) -> Option<f64> {
        self.number("Gap")
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_number)
    }
}

impl FromIterator<(String, String)> for Fundamentals {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse a number that may carry `%`, `$`, or comma grouping. `-` alone is a
/// provider placeholder for "no data".
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '%' | '$' | ','))
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok().filter(|value: &f64| value.is_finite())
}

/// Parse a volume figure with an optional `K`/`M`/`B` suffix.
pub fn parse_volume(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (body, scale) = match trimmed.chars().last() {
        Some('K') | Some('k') => (&trimmed[..trimmed.len() - 1], 1_000.0),
        Some('M') | Some('m') => (&trimmed[..trimmed.len() - 1], 1_000_000.0),
        Some('B') | Some('b') => (&trimmed[..trimmed.len() - 1], 1_000_000_000.0),
        _ => (trimmed, 1.0),
    };
    parse_number(body).map(|value| value * scale)
}
