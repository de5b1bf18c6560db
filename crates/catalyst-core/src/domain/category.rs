use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Normalized catalyst category.
///
/// Regulatory decisions, drug filings, and biologics filings frequently
/// describe the same underlying agency action under different names, so they
/// participate in near-match merging; see `merge::MergeConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalystCategory {
    /// Scheduled agency action date (PDUFA-style decision).
    RegulatoryDecision,
    /// Advisory committee review.
    AdvisoryReview,
    TrialPhase1,
    TrialPhase2,
    TrialPhase3,
    /// New drug application filing (NDA/sNDA).
    NewDrugFiling,
    /// Biologics license application filing (BLA/sBLA).
    BiologicsFiling,
    Approval,
    /// Rejection or complete response letter.
    Rejection,
    Earnings,
    Dividend,
    Other,
}

impl CatalystCategory {
    pub const ALL: [Self; 12] = [
        Self::RegulatoryDecision,
        Self::AdvisoryReview,
        Self::TrialPhase1,
        Self::TrialPhase2,
        Self::TrialPhase3,
        Self::NewDrugFiling,
        Self::BiologicsFiling,
        Self::Approval,
        Self::Rejection,
        Self::Earnings,
        Self::Dividend,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegulatoryDecision => "regulatory_decision",
            Self::AdvisoryReview => "advisory_review",
            Self::TrialPhase1 => "trial_phase1",
            Self::TrialPhase2 => "trial_phase2",
            Self::TrialPhase3 => "trial_phase3",
            Self::NewDrugFiling => "new_drug_filing",
            Self::BiologicsFiling => "biologics_filing",
            Self::Approval => "approval",
            Self::Rejection => "rejection",
            Self::Earnings => "earnings",
            Self::Dividend => "dividend",
            Self::Other => "other",
        }
    }

    /// Specificity rank used when merged duplicates disagree on category.
    /// Decided outcomes beat scheduled decisions, which beat filings.
    pub const fn merge_priority(self) -> u8 {
        match self {
            Self::Approval | Self::Rejection => 5,
            Self::RegulatoryDecision => 4,
            Self::NewDrugFiling | Self::BiologicsFiling => 3,
            Self::AdvisoryReview => 2,
            Self::TrialPhase1 | Self::TrialPhase2 | Self::TrialPhase3 => 1,
            Self::Earnings | Self::Dividend | Self::Other => 0,
        }
    }

    /// Flat trading-score bonus for categories that move stocks hardest.
    pub const fn importance_bonus(self) -> i32 {
        match self {
            Self::RegulatoryDecision => 5,
            Self::Approval | Self::AdvisoryReview => 4,
            Self::NewDrugFiling | Self::BiologicsFiling | Self::Rejection => 3,
            _ => 0,
        }
    }
}

impl Display for CatalystCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalystCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|category| category.as_str() == normalized)
            .copied()
            .ok_or(ValidationError::InvalidCategory { value: normalized })
    }
}

/// Lifecycle status attached to an event by its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    UnderReview,
    Approved,
    Rejected,
    /// Complete response letter issued.
    ResponseLetter,
}

impl EventStatus {
    pub const ALL: [Self; 5] = [
        Self::Upcoming,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
        Self::ResponseLetter,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ResponseLetter => "response_letter",
        }
    }

    /// Terminal statuses short-circuit outcome probability to 0 or 100.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::ResponseLetter)
    }

    /// Rank used when merged duplicates disagree on status.
    pub const fn merge_priority(self) -> u8 {
        match self {
            Self::Approved | Self::Rejected | Self::ResponseLetter => 2,
            Self::UnderReview => 1,
            Self::Upcoming => 0,
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|status| status.as_str() == normalized)
            .copied()
            .ok_or(ValidationError::InvalidStatus { value: normalized })
    }
}
