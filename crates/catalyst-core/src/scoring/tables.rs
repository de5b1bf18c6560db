//! Empirical reference tables behind the scoring engine.
//!
//! Success rates come from published clinical-development statistics for the
//! 2015-2023 window. Keyword order matters: the first keyword found in the
//! event text wins, so more specific entries sit above broader ones.

/// Reference data the scoring functions read. Rows are matched against the
/// event's lowercased free text.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    /// Average overall success rate across all therapeutic areas, used to
    /// scale area modifiers for trial-stage events.
    pub average_area_success: f64,
    /// Overall phase-1-to-approval success rate per therapeutic area.
    pub area_success: &'static [(&'static str, f64)],
    /// Filing-stage approval rate per therapeutic area (late-stage drugs
    /// only, hence higher than the overall rates).
    pub filing_approval_by_area: &'static [(&'static str, f64)],
    /// Probability adjustment per drug modality, versus a small-molecule
    /// baseline.
    pub modality_modifiers: &'static [(&'static str, i32)],
    /// Indications implying a rare genetic disease with high unmet need.
    pub rare_disease_indicators: &'static [&'static str],
    /// Marketed drugs whose filings are label extensions, not first cycles.
    pub established_drugs: &'static [&'static str],
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self {
            average_area_success: 7.0,
            area_success: AREA_SUCCESS,
            filing_approval_by_area: FILING_APPROVAL_BY_AREA,
            modality_modifiers: MODALITY_MODIFIERS,
            rare_disease_indicators: RARE_DISEASE_INDICATORS,
            established_drugs: ESTABLISHED_DRUGS,
        }
    }
}

const AREA_SUCCESS: &[(&str, f64)] = &[
    ("hematology", 18.5),
    ("blood", 18.5),
    ("rare disease", 15.0),
    ("orphan", 15.0),
    ("metabolic", 14.0),
    ("endocrine", 14.0),
    ("diabetes", 14.0),
    ("musculoskeletal", 13.0),
    ("bone", 13.0),
    ("immune", 12.0),
    ("autoimmune", 12.0),
    ("rheumatology", 12.0),
    ("dermatology", 10.0),
    ("skin", 10.0),
    ("ophthalmology", 9.5),
    ("eye", 9.5),
    ("retinal", 9.5),
    ("gastroenterology", 8.0),
    ("urology", 8.0),
    ("hepatology", 7.0),
    ("liver", 7.0),
    ("psychiatry", 6.0),
    ("nephrology", 6.0),
    ("kidney", 6.0),
    ("neurology", 5.5),
    ("cns", 5.5),
    ("cardiovascular", 5.0),
    ("heart", 5.0),
    ("parkinson", 5.0),
    ("infectious", 5.0),
    ("infection", 5.0),
    ("antiviral", 5.0),
    ("oncology", 4.7),
    ("cancer", 4.7),
    ("tumor", 4.7),
    ("respiratory", 4.5),
    ("lung", 4.5),
    ("asthma", 4.5),
    ("alzheimer", 3.0),
];

const FILING_APPROVAL_BY_AREA: &[(&str, f64)] = &[
    ("hematology", 92.0),
    ("blood", 92.0),
    ("rare disease", 90.0),
    ("orphan", 90.0),
    ("metabolic", 88.0),
    ("dermatology", 87.0),
    ("ophthalmology", 85.0),
    ("gastroenterology", 85.0),
    ("cardiovascular", 82.0),
    ("infectious", 82.0),
    ("neurology", 80.0),
    ("cns", 80.0),
    ("respiratory", 80.0),
    ("oncology", 78.0),
    ("cancer", 78.0),
];

const MODALITY_MODIFIERS: &[(&str, i32)] = &[
    ("antibody", 3),
    ("monoclonal", 3),
    ("bispecific", 2),
    ("adc", 1),
    ("car-t", -2),
    ("cell therapy", -3),
    ("gene therapy", -5),
    ("sirna", 1),
    ("mrna", -2),
    ("crispr", -5),
    ("antisense", 0),
    ("peptide", 1),
    ("protein", 1),
    ("small molecule", 0),
];

const RARE_DISEASE_INDICATORS: &[&str] = &[
    "mucopolysaccharidosis",
    "phenylketonuria",
    "achondroplasia",
    "gaucher",
    "menkes",
    "leber",
    "hunter syndrome",
    "fabry",
    "pompe",
];

const ESTABLISHED_DRUGS: &[&str] = &[
    "keytruda", "opdivo", "dupixent", "darzalex", "palynziq", "sarclisa", "filspari", "vyvgart",
    "inqovi", "sotyktu",
];
