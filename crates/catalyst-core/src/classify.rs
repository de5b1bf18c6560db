//! Keyword heuristics that map free source text onto the domain enums.
//!
//! Calendars and news feeds describe the same agency actions in prose, so
//! adapters run their extracted text through these functions. The output is
//! best-effort: the pipeline treats it as a label, never as ground truth.

use crate::domain::{CatalystCategory, EventStatus};

/// Detect the catalyst category from free text, most specific keyword first.
pub fn detect_category(text: &str) -> CatalystCategory {
    let lower = text.to_lowercase();
    if lower.is_empty() {
        return CatalystCategory::Other;
    }

    if lower.contains("pdufa") {
        return CatalystCategory::RegulatoryDecision;
    }
    if lower.contains("advisory committee") || lower.contains("adcom") {
        return CatalystCategory::AdvisoryReview;
    }
    if lower.contains("complete response letter") || lower.contains("crl") {
        return CatalystCategory::Rejection;
    }
    // Supplemental filings resolve on a scheduled agency action date.
    if lower.contains("snda") || lower.contains("sbla") {
        return CatalystCategory::RegulatoryDecision;
    }
    let filing_context = ["decision", "accept", "submit", "approv"]
        .iter()
        .any(|word| lower.contains(word));
    if lower.contains("bla") && filing_context {
        return CatalystCategory::BiologicsFiling;
    }
    if lower.contains("nda") && filing_context {
        return CatalystCategory::NewDrugFiling;
    }
    if lower.contains("approved") || lower.contains("fda approves") {
        return CatalystCategory::Approval;
    }
    if lower.contains("fda decision") || lower.contains("action date") {
        return CatalystCategory::RegulatoryDecision;
    }
    if lower.contains("phase 3") || lower.contains("phase iii") || lower.contains("pivotal") {
        return CatalystCategory::TrialPhase3;
    }
    if lower.contains("phase 2") || lower.contains("phase ii") {
        return CatalystCategory::TrialPhase2;
    }
    if lower.contains("phase 1") || lower.contains("phase i") {
        return CatalystCategory::TrialPhase1;
    }
    if lower.contains("reject") || lower.contains("refus") {
        return CatalystCategory::Rejection;
    }
    if lower.contains("earnings") || lower.contains("quarterly results") {
        return CatalystCategory::Earnings;
    }
    if lower.contains("dividend") {
        return CatalystCategory::Dividend;
    }
    if lower.contains("bla") {
        return CatalystCategory::BiologicsFiling;
    }
    if lower.contains("nda") {
        return CatalystCategory::NewDrugFiling;
    }
    CatalystCategory::Other
}

/// Detect the development stage label from free text.
pub fn detect_stage(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if lower.contains("phase 3") || lower.contains("phase iii") || lower.contains("pivotal") {
        Some("Phase 3")
    } else if lower.contains("phase 2") || lower.contains("phase ii") {
        Some("Phase 2")
    } else if lower.contains("phase 1") || lower.contains("phase i") {
        Some("Phase 1")
    } else if lower.contains("snda")
        || lower.contains("sbla")
        || lower.contains("nda")
        || lower.contains("bla")
    {
        Some("NDA/BLA")
    } else if lower.contains("approved") {
        Some("Approved")
    } else {
        None
    }
}

/// Detect the lifecycle status from free text. Defaults to `Upcoming`.
pub fn detect_status(text: &str) -> EventStatus {
    let lower = text.to_lowercase();
    if lower.contains("approved") || lower.contains("granted") {
        EventStatus::Approved
    } else if lower.contains("rejected")
        || lower.contains("refused")
        || lower.contains("complete response letter")
    {
        EventStatus::Rejected
    } else if lower.contains("crl") {
        EventStatus::ResponseLetter
    } else if lower.contains("under review")
        || lower.contains("pending")
        || lower.contains("accepted")
    {
        EventStatus::UnderReview
    } else {
        EventStatus::Upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdufa_beats_filing_keywords() {
        let category = detect_category("PDUFA action date for NDA 215-039");
        assert_eq!(category, CatalystCategory::RegulatoryDecision);
    }

    #[test]
    fn crl_reads_as_rejection() {
        assert_eq!(
            detect_category("FDA issues Complete Response Letter"),
            CatalystCategory::Rejection
        );
    }

    #[test]
    fn filings_need_action_context() {
        assert_eq!(
            detect_category("BLA accepted for priority review"),
            CatalystCategory::BiologicsFiling
        );
        // Bare mention without action context still resolves, but later.
        assert_eq!(detect_category("the bla program"), CatalystCategory::BiologicsFiling);
    }

    #[test]
    fn pivotal_reads_as_phase3() {
        assert_eq!(
            detect_category("topline data from pivotal study"),
            CatalystCategory::TrialPhase3
        );
        assert_eq!(detect_stage("pivotal readout"), Some("Phase 3"));
    }

    #[test]
    fn status_defaults_to_upcoming() {
        assert_eq!(detect_status("scheduled for review"), EventStatus::Upcoming);
        assert_eq!(detect_status("NDA accepted by FDA"), EventStatus::UnderReview);
        assert_eq!(detect_status("approval granted"), EventStatus::Approved);
    }
}
