//! Deficiency analysis over an intake history.
//!
//! For each nutrient, in enumeration order:
//! 1. Look up the allowance for the demographic and the deficiency profile
//!    (nutrients missing either are skipped)
//! 2. Measure the below-allowance streak
//! 3. Classify the streak into zero or one warning
//!
//! The collected warnings are then ranked by severity.

use crate::classify::classify;
use crate::knowledge::KnowledgeBase;
use crate::rank::rank_warnings;
use crate::streak::consecutive_days_low;
use crate::{DailyIntakeRecord, DemographicGroup, NutrientType, PotentialDeficiencyWarning};
use serde::{Deserialize, Serialize};

/// Why a nutrient was left out of the analysis
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoAllowance,
    NoProfile,
}

/// Full result of one analysis run
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub days_analyzed: usize,
    pub warnings: Vec<PotentialDeficiencyWarning>,
    pub skipped: Vec<(NutrientType, SkipReason)>,
}

/// Ranked deficiency warnings for a history sorted newest first
///
/// Returns an empty list for an empty history. Never fails.
pub fn analyze(
    history: &[DailyIntakeRecord],
    knowledge: &KnowledgeBase,
    demographic: DemographicGroup,
    assumes_prior_deficiency: bool,
) -> Vec<PotentialDeficiencyWarning> {
    assess(history, knowledge, demographic, assumes_prior_deficiency).warnings
}

/// Same as [`analyze`], also reporting which nutrients were skipped
pub fn assess(
    history: &[DailyIntakeRecord],
    knowledge: &KnowledgeBase,
    demographic: DemographicGroup,
    assumes_prior_deficiency: bool,
) -> AnalysisReport {
    let mut report = AnalysisReport {
        days_analyzed: history.len(),
        warnings: Vec::new(),
        skipped: Vec::new(),
    };

    if history.is_empty() {
        tracing::debug!("Empty intake history, nothing to analyze");
        return report;
    }

    for nutrient in NutrientType::ALL {
        let Some(allowance) = knowledge.allowance(nutrient, demographic) else {
            tracing::debug!("Skipping {}: no allowance for {}", nutrient, demographic);
            report.skipped.push((nutrient, SkipReason::NoAllowance));
            continue;
        };
        let Some(profile) = knowledge.deficiency_profile(nutrient) else {
            tracing::debug!("Skipping {}: no deficiency profile", nutrient);
            report.skipped.push((nutrient, SkipReason::NoProfile));
            continue;
        };

        let days = consecutive_days_low(nutrient, allowance, history);
        if days == 0 {
            continue;
        }

        let name = knowledge
            .record(nutrient)
            .map(|r| r.name.as_str())
            .unwrap_or_else(|| nutrient.as_str());

        if let Some(classification) = classify(name, profile, days, assumes_prior_deficiency) {
            tracing::debug!(
                "{} low for {} days: {}",
                nutrient,
                days,
                classification.severity
            );
            report.warnings.push(PotentialDeficiencyWarning {
                nutrient,
                consecutive_days_low: days,
                message: classification.message,
                severity: classification.severity,
                deficiency_profile: profile.clone(),
            });
        }
    }

    report.warnings = rank_warnings(report.warnings);

    tracing::info!(
        "Analyzed {} days for {}: {} warnings",
        report.days_analyzed,
        demographic,
        report.warnings.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{build_default_knowledge_base, NutrientRecord};
    use crate::{Amount, DeficiencyProfile, NutrientCategory, RiskModel, Severity};
    use chrono::{Duration, NaiveDate};
    use std::collections::{BTreeMap, HashMap};

    /// `days` consecutive records with the given nutrient amounts, newest first
    fn history(days: usize, totals: &[(NutrientType, Amount)]) -> Vec<DailyIntakeRecord> {
        let newest = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        (0..days)
            .map(|i| DailyIntakeRecord {
                date: newest - Duration::days(i as i64),
                totals: totals.iter().cloned().collect::<BTreeMap<_, _>>(),
            })
            .collect()
    }

    fn record(nutrient: NutrientType, model: RiskModel) -> NutrientRecord {
        NutrientRecord {
            nutrient,
            name: nutrient.to_string(),
            category: NutrientCategory::Mineral,
            solubility: None,
            allowances: HashMap::from([(DemographicGroup::AdultMale, Amount::new(10.0, "mg"))]),
            dietary_sources: vec![],
            deficiency_profile: Some(DeficiencyProfile {
                common_name: format!("{} deficiency", nutrient),
                risk_model: model,
                key_symptoms: vec![],
                at_risk_populations: vec![],
            }),
        }
    }

    #[test]
    fn test_empty_history_yields_nothing() {
        let kb = build_default_knowledge_base();
        let warnings = analyze(&[], &kb, DemographicGroup::AdultFemale, true);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_ranking_with_evaluation_order_tie_break() {
        // Evaluation order: VitaminA, VitaminC, Calcium, Iron
        let kb = KnowledgeBase::from_records(vec![
            record(NutrientType::VitaminA, RiskModel::AcuteRegulated),
            record(NutrientType::VitaminC, RiskModel::DailyEssential { onset_hours: 24 }),
            record(NutrientType::Calcium, RiskModel::DailyTurnover { onset_weeks: 2 }),
            record(NutrientType::Iron, RiskModel::DailyTurnover { onset_weeks: 1 }),
        ]);

        let warnings = analyze(&history(8, &[]), &kb, DemographicGroup::AdultMale, false);
        let ranked: Vec<_> = warnings.iter().map(|w| (w.nutrient, w.severity)).collect();

        assert_eq!(
            ranked,
            vec![
                (NutrientType::VitaminC, Severity::HighRisk),
                (NutrientType::Iron, Severity::HighRisk),
                (NutrientType::Calcium, Severity::Warning),
                (NutrientType::VitaminA, Severity::Monitoring),
            ]
        );
        assert!(warnings.iter().all(|w| w.consecutive_days_low == 8));
    }

    #[test]
    fn test_nutrients_without_reference_data_are_skipped() {
        let mut no_profile = record(NutrientType::Zinc, RiskModel::AcuteRegulated);
        no_profile.deficiency_profile = None;
        let kb = KnowledgeBase::from_records(vec![
            record(NutrientType::Iron, RiskModel::AcuteRegulated),
            no_profile,
        ]);

        let report = assess(&history(5, &[]), &kb, DemographicGroup::AdultMale, false);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].nutrient, NutrientType::Iron);
        assert!(report
            .skipped
            .contains(&(NutrientType::Zinc, SkipReason::NoProfile)));
        assert!(report
            .skipped
            .contains(&(NutrientType::VitaminC, SkipReason::NoAllowance)));

        // Iron has no allowance for other demographics
        let report = assess(&history(5, &[]), &kb, DemographicGroup::Child, false);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_compliant_newest_day_produces_no_warning() {
        let kb = KnowledgeBase::from_records(vec![record(
            NutrientType::Iron,
            RiskModel::DailyEssential { onset_hours: 1 },
        )]);
        let mut h = history(5, &[]);
        h[0].totals.insert(NutrientType::Iron, Amount::new(10.0, "mg"));

        assert!(analyze(&h, &kb, DemographicGroup::AdultMale, false).is_empty());
    }

    #[test]
    fn test_default_knowledge_base_flags_dehydration_first() {
        let kb = build_default_knowledge_base();
        // Nothing logged for ten days except a little water
        let h = history(10, &[(NutrientType::Water, Amount::new(0.5, "L"))]);
        let warnings = analyze(&h, &kb, DemographicGroup::AdultFemale, false);

        assert!(!warnings.is_empty());
        assert_eq!(warnings[0].severity, Severity::HighRisk);
        assert!(warnings
            .iter()
            .any(|w| w.nutrient == NutrientType::Water && w.severity == Severity::HighRisk));
        assert!(warnings.iter().all(|w| w.nutrient != NutrientType::Fiber));
        for pair in warnings.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn test_fast_track_flags_slow_nutrients() {
        let kb = build_default_knowledge_base();
        let h = history(10, &[]);

        let standard = analyze(&h, &kb, DemographicGroup::AdultMale, false);
        let fast = analyze(&h, &kb, DemographicGroup::AdultMale, true);

        assert!(standard.iter().all(|w| w.nutrient != NutrientType::VitaminA));
        let vitamin_a = fast
            .iter()
            .find(|w| w.nutrient == NutrientType::VitaminA)
            .expect("vitamin A fast-track warning");
        assert_eq!(vitamin_a.severity, Severity::Monitoring);
        assert!(vitamin_a.message.contains("fast-track"));
        assert!(vitamin_a.message.contains("10"));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let kb = build_default_knowledge_base();
        let h = history(40, &[(NutrientType::Calcium, Amount::new(200.0, "mg"))]);

        let first = analyze(&h, &kb, DemographicGroup::ElderlyFemale, true);
        let second = analyze(&h, &kb, DemographicGroup::ElderlyFemale, true);
        assert_eq!(first, second);
    }
}
