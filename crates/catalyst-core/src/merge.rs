//! Fuzzy deduplication and merging of raw events into canonical events.
//!
//! Two passes: an exact pass over `(ticker, date, category)`, then a
//! near-match pass that unions same-ticker events whose categories are
//! compatible and whose dates sit within a small window (or where a date is
//! missing entirely). Near matching is transitive: if A matches B and B
//! matches C, all three collapse into one canonical event even when A and C
//! would not match directly.
//!
//! The whole operation is order-independent. Candidates are canonically
//! sorted before either pass and every field-level merge rule is a total
//! order (longer value wins, ties broken lexicographically), so any
//! permutation of the input and any repetition of it yields the same output.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{CatalystCategory, CatalystEvent, EventDate, RawEvent, Ticker};

/// Tunables for the deduplicator.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Maximum day distance for the near-match pass.
    pub near_match_window_days: i64,
    /// Category groups that may merge with each other. Identical categories
    /// always merge.
    pub compatible_categories: Vec<BTreeSet<CatalystCategory>>,
    /// Known false-positive "tickers" (acronyms, indications, months).
    pub excluded_tickers: BTreeSet<String>,
    /// Real companies that cannot be traded on covered exchanges.
    pub non_tradeable_tickers: BTreeSet<String>,
}

impl MergeConfig {
    pub fn categories_compatible(&self, a: CatalystCategory, b: CatalystCategory) -> bool {
        if a == b {
            return true;
        }
        self.compatible_categories
            .iter()
            .any(|group| group.contains(&a) && group.contains(&b))
    }

    fn admits(&self, ticker: &Ticker) -> bool {
        !self.excluded_tickers.contains(ticker.as_str())
            && !self.non_tradeable_tickers.contains(ticker.as_str())
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        // Decisions and filings often name the same agency action.
        let decision_aliases: BTreeSet<CatalystCategory> = [
            CatalystCategory::RegulatoryDecision,
            CatalystCategory::NewDrugFiling,
            CatalystCategory::BiologicsFiling,
        ]
        .into_iter()
        .collect();

        Self {
            near_match_window_days: 3,
            compatible_categories: vec![decision_aliases],
            excluded_tickers: DEFAULT_EXCLUDED_TICKERS
                .iter()
                .map(|t| (*t).to_owned())
                .collect(),
            non_tradeable_tickers: DEFAULT_NON_TRADEABLE_TICKERS
                .iter()
                .map(|t| (*t).to_owned())
                .collect(),
        }
    }
}

/// Acronyms that source extractors routinely mistake for tickers.
const DEFAULT_EXCLUDED_TICKERS: &[&str] = &[
    "FDA", "SEC", "CEO", "IPO", "ETF", "USA", "USD", "NDA", "BLA", "CRL", "THE", "FOR", "AND",
    "NEW", "ALL", "NDS", "SNDA", "SBLA", "PDUFA", "AML", "NSCLC", "MPS", "EBV", "PTLD", "NET",
    "NETS", "CML", "NHL", "RCC", "HCC", "GBM", "CLL", "SLE", "IBD", "PRE", "NOT", "ITS", "MAY",
    "DEC", "JAN", "FEB", "MAR", "APR", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DNA", "RNA",
    "CDX", "MDD", "PKU", "GAD", "OCD", "ASD", "IGA", "TED",
];

/// Private or foreign-only companies whose events are not actionable.
const DEFAULT_NON_TRADEABLE_TICKERS: &[&str] = &["BAMXF", "CHIESI", "CIPLA", "LUPIN"];

/// Deduplicate and merge raw events into canonical events.
///
/// Events with an invalid or blacklisted ticker are dropped before either
/// pass. The output is sorted by (ticker, date, category), undated last.
pub fn merge(raw_events: Vec<RawEvent>, config: &MergeConfig) -> Vec<CatalystEvent> {
    let mut candidates: Vec<CatalystEvent> = raw_events
        .into_iter()
        .filter_map(canonicalize)
        .filter(|event| config.admits(&event.ticker))
        .collect();

    // Canonical ordering makes every later fold permutation-independent.
    candidates.sort_by(|a, b| canonical_order(a, b));

    // Exact pass: same ticker, date, and category are one event.
    let mut exact: BTreeMap<(Ticker, Option<EventDate>, CatalystCategory), CatalystEvent> =
        BTreeMap::new();
    for event in candidates {
        let key = (event.ticker.clone(), event.event_date, event.category);
        match exact.get_mut(&key) {
            Some(existing) => absorb(existing, event),
            None => {
                exact.insert(key, event);
            }
        }
    }

    // Near pass: transitive unioning of compatible same-ticker events.
    let canon: Vec<CatalystEvent> = exact.into_values().collect();
    let mut sets = UnionFind::new(canon.len());
    for i in 0..canon.len() {
        for j in (i + 1)..canon.len() {
            if canon[i].ticker != canon[j].ticker {
                continue;
            }
            if !config.categories_compatible(canon[i].category, canon[j].category) {
                continue;
            }
            if dates_near(
                canon[i].event_date,
                canon[j].event_date,
                config.near_match_window_days,
            ) {
                sets.union(i, j);
            }
        }
    }

    let mut classes: BTreeMap<usize, Vec<CatalystEvent>> = BTreeMap::new();
    for (index, event) in canon.into_iter().enumerate() {
        classes.entry(sets.find(index)).or_default().push(event);
    }

    let mut merged: Vec<CatalystEvent> = classes
        .into_values()
        .map(|mut members| {
            members.sort_by(|a, b| canonical_order(a, b));
            let mut iter = members.into_iter();
            let mut base = iter.next().expect("union class cannot be empty");
            for member in iter {
                absorb(&mut base, member);
            }
            base
        })
        .collect();

    merged.sort_by(|a, b| canonical_order(a, b));
    merged
}

fn canonicalize(raw: RawEvent) -> Option<CatalystEvent> {
    let ticker = Ticker::parse(&raw.ticker).ok()?;
    let mut event = CatalystEvent::new(ticker, raw.category, raw.provider);
    event.company = normalize_field(raw.company);
    event.drug_name = normalize_field(raw.drug_name);
    event.indication = normalize_field(raw.indication);
    event.stage = normalize_field(raw.stage);
    event.status = raw.status;
    event.event_date = raw.event_date;
    event.url = normalize_field(raw.url);
    Some(event)
}

fn normalize_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn dates_near(a: Option<EventDate>, b: Option<EventDate>, window_days: i64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.distance_days(b) <= window_days,
        // A missing date never disqualifies a merge; the dated side supplies
        // the calendar position for the combined event.
        _ => true,
    }
}

/// Fold `other` into `target`. Commutative given canonical input ordering.
fn absorb(target: &mut CatalystEvent, other: CatalystEvent) {
    let target_priority = target.category.merge_priority();
    let other_priority = other.category.merge_priority();

    if other_priority > target_priority
        || (other_priority == target_priority
            && other.category.as_str() < target.category.as_str())
    {
        target.category = other.category;
        if other_priority > target_priority {
            // The more specific category's date anchors the merged event.
            target.event_date = other.event_date.or(target.event_date);
        } else {
            target.event_date = earliest(target.event_date, other.event_date);
        }
    } else if other_priority == target_priority {
        target.event_date = earliest(target.event_date, other.event_date);
    } else if target.event_date.is_none() {
        target.event_date = other.event_date;
    }

    target.company = prefer_field(target.company.take(), other.company);
    target.drug_name = prefer_field(target.drug_name.take(), other.drug_name);
    target.indication = prefer_field(target.indication.take(), other.indication);
    target.stage = prefer_field(target.stage.take(), other.stage);
    target.url = prefer_field(target.url.take(), other.url);

    target.status = match (target.status, other.status) {
        (Some(a), Some(b)) => {
            if b.merge_priority() > a.merge_priority()
                || (b.merge_priority() == a.merge_priority() && b.as_str() < a.as_str())
            {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    };

    target.sources.extend(other.sources);
}

/// Longer value wins; equal lengths break lexicographically.
fn prefer_field(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if b.len() > a.len() || (b.len() == a.len() && b < a) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

fn earliest(a: Option<EventDate>, b: Option<EventDate>) -> Option<EventDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn canonical_order(a: &CatalystEvent, b: &CatalystEvent) -> std::cmp::Ordering {
    let key = |e: &CatalystEvent| {
        (
            e.ticker.clone(),
            e.event_date.is_none(),
            e.event_date,
            e.category,
            e.drug_name.clone(),
            e.company.clone(),
            e.indication.clone(),
        )
    };
    key(a).cmp(&key(b))
}

/// Disjoint-set forest keyed by candidate index. Roots stay at the smallest
/// index so class iteration order is stable.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}
