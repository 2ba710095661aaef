//! Deficiency risk classification.
//!
//! Turns a below-allowance streak into an optional severity and message,
//! using one rule function per `RiskModel` variant. All thresholds are
//! integer day counts.
//!
//! | Model | Rules (first match wins) |
//! |---|---|
//! | daily essential | `days >= max(1, hours / 24)` → high risk |
//! | daily turnover | `days >= 7w` → high risk, `> 7w / 2` → warning, `> 3` → monitoring |
//! | long-term storage | fast-track `7 <= days < 30m / 2` → monitoring, `>= 30m` → high risk, `> 30m / 2` → warning, `> 30` → monitoring |
//! | structural | fast-track `7 <= days < 30m / 2` → monitoring, `> 30m / 2` → warning, `> 60` → monitoring |
//! | acute regulated | `days > 3` → monitoring |
//! | adaptive | never |

use crate::{DeficiencyProfile, RiskModel, Severity};

/// Minimum streak before fast-track applies
const FAST_TRACK_MIN_DAYS: u32 = 7;
const DAYS_PER_WEEK: u32 = 7;
const DAYS_PER_MONTH: u32 = 30;

/// Severity and explanation for a flagged nutrient
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    pub message: String,
}

impl Classification {
    fn new(severity: Severity, message: String) -> Option<Self> {
        Some(Self { severity, message })
    }
}

/// Classify a streak of `days` below allowance
///
/// `fast_track` assumes the person entered tracking already low, and only
/// affects long-term storage and structural nutrients.
pub fn classify(
    nutrient_name: &str,
    profile: &DeficiencyProfile,
    days: u32,
    fast_track: bool,
) -> Option<Classification> {
    let input = Streak {
        nutrient_name,
        profile,
        days,
        fast_track,
    };

    match profile.risk_model {
        RiskModel::DailyEssential { onset_hours } => daily_essential(&input, onset_hours),
        RiskModel::DailyTurnover { onset_weeks } => daily_turnover(&input, onset_weeks),
        RiskModel::LongTermStorage { depletion_months } => {
            long_term_storage(&input, depletion_months)
        }
        RiskModel::Structural { depletion_months } => structural(&input, depletion_months),
        RiskModel::AcuteRegulated => acute_regulated(&input),
        RiskModel::Adaptive => None,
    }
}

struct Streak<'a> {
    nutrient_name: &'a str,
    profile: &'a DeficiencyProfile,
    days: u32,
    fast_track: bool,
}

impl Streak<'_> {
    fn condition(&self) -> &str {
        &self.profile.common_name
    }

    fn fast_tracked(&self, depletion_days: u32) -> bool {
        self.fast_track && self.days >= FAST_TRACK_MIN_DAYS && self.days < depletion_days / 2
    }
}

fn daily_essential(s: &Streak<'_>, onset_hours: u32) -> Option<Classification> {
    let onset_days = (onset_hours / 24).max(1);
    if s.days >= onset_days {
        return Classification::new(
            Severity::HighRisk,
            format!(
                "{} intake has been critically low for {} day(s). Risk of {} is imminent.",
                s.nutrient_name,
                s.days,
                s.condition()
            ),
        );
    }
    None
}

fn daily_turnover(s: &Streak<'_>, onset_weeks: u32) -> Option<Classification> {
    let onset_days = onset_weeks * DAYS_PER_WEEK;
    let days = s.days;

    if days >= onset_days {
        Classification::new(
            Severity::HighRisk,
            format!(
                "{} intake low for {} days, exceeding the {}-week onset time for {}.",
                s.nutrient_name,
                days,
                onset_weeks,
                s.condition()
            ),
        )
    } else if days > onset_days / 2 {
        Classification::new(
            Severity::Warning,
            format!(
                "{} intake low for {} days. You are approaching the risk window for {}.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else if days > 3 {
        Classification::new(
            Severity::Monitoring,
            format!(
                "{} intake low for {} days. Consistent intake is required to avoid {}.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else {
        None
    }
}

fn long_term_storage(s: &Streak<'_>, depletion_months: u32) -> Option<Classification> {
    let depletion_days = depletion_months * DAYS_PER_MONTH;
    let days = s.days;

    if s.fast_tracked(depletion_days) {
        Classification::new(
            Severity::Monitoring,
            format!(
                "{} intake low for {} days (fast-track): this diet may not be meeting long-term needs and could lead to {}.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else if days >= depletion_days {
        Classification::new(
            Severity::HighRisk,
            format!(
                "{} intake has been chronically low for {} days. Body stores may be depleted; risk of {}.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else if days > depletion_days / 2 {
        Classification::new(
            Severity::Warning,
            format!(
                "{} intake low for {} days. This is not sustainable and may be depleting body stores (risk of {}).",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else if days > DAYS_PER_MONTH {
        Classification::new(
            Severity::Monitoring,
            format!(
                "{} intake low for {} days, over a month. Stores remain, but {} is a long-term concern.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else {
        None
    }
}

fn structural(s: &Streak<'_>, depletion_months: u32) -> Option<Classification> {
    let depletion_days = depletion_months * DAYS_PER_MONTH;
    let days = s.days;

    if s.fast_tracked(depletion_days) {
        Classification::new(
            Severity::Monitoring,
            format!(
                "{} intake low for {} days (fast-track): this diet may not be meeting long-term needs for preventing {}.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else if days > depletion_days / 2 {
        Classification::new(
            Severity::Warning,
            format!(
                "{} intake has been chronically low for {} days. Risk of {}.",
                s.nutrient_name,
                days,
                s.condition()
            ),
        )
    } else if days > 2 * DAYS_PER_MONTH {
        let symptom = s
            .profile
            .key_symptoms
            .first()
            .map(|symptom| format!(" such as {}", symptom.to_lowercase()))
            .unwrap_or_default();
        Classification::new(
            Severity::Monitoring,
            format!(
                "{} intake low for {} days, over 2 months. This can lead to {}{}.",
                s.nutrient_name,
                days,
                s.condition(),
                symptom
            ),
        )
    } else {
        None
    }
}

fn acute_regulated(s: &Streak<'_>) -> Option<Classification> {
    if s.days > 3 {
        return Classification::new(
            Severity::Monitoring,
            format!(
                "{} intake has been low for {} days. Body levels are tightly regulated with no buffer; watch for {}.",
                s.nutrient_name,
                s.days,
                s.condition()
            ),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(risk_model: RiskModel) -> DeficiencyProfile {
        DeficiencyProfile {
            common_name: "Test deficiency".into(),
            risk_model,
            key_symptoms: vec!["Brittle bones".into()],
            at_risk_populations: vec![],
        }
    }

    fn severity(model: RiskModel, days: u32, fast_track: bool) -> Option<Severity> {
        classify("Nutrient X", &profile(model), days, fast_track).map(|c| c.severity)
    }

    #[test]
    fn test_daily_turnover_thresholds() {
        let model = RiskModel::DailyTurnover { onset_weeks: 2 };
        assert_eq!(severity(model, 14, false), Some(Severity::HighRisk));
        assert_eq!(severity(model, 8, false), Some(Severity::Warning));
        assert_eq!(severity(model, 7, false), Some(Severity::Monitoring));
        assert_eq!(severity(model, 4, false), Some(Severity::Monitoring));
        assert_eq!(severity(model, 3, false), None);
    }

    #[test]
    fn test_daily_turnover_ignores_fast_track() {
        let model = RiskModel::DailyTurnover { onset_weeks: 2 };
        assert_eq!(severity(model, 3, true), None);
    }

    #[test]
    fn test_daily_essential_ignores_fast_track() {
        let model = RiskModel::DailyEssential { onset_hours: 72 };
        assert_eq!(severity(model, 2, true), None);
        assert_eq!(severity(model, 3, true), Some(Severity::HighRisk));
    }

    #[test]
    fn test_daily_essential_minimum_one_day() {
        let model = RiskModel::DailyEssential { onset_hours: 12 };
        assert_eq!(severity(model, 1, false), Some(Severity::HighRisk));

        let model = RiskModel::DailyEssential { onset_hours: 72 };
        assert_eq!(severity(model, 2, false), None);
        assert_eq!(severity(model, 3, false), Some(Severity::HighRisk));
    }

    #[test]
    fn test_long_term_storage_fast_track() {
        let model = RiskModel::LongTermStorage { depletion_months: 3 };
        let result = classify("Vitamin A", &profile(model), 10, true).unwrap();
        assert_eq!(result.severity, Severity::Monitoring);
        assert!(result.message.contains("fast-track"));
        assert!(result.message.contains("10"));
        assert!(result.message.contains("Test deficiency"));
    }

    #[test]
    fn test_long_term_storage_standard() {
        let model = RiskModel::LongTermStorage { depletion_months: 3 };
        assert_eq!(severity(model, 10, false), None);
        assert_eq!(severity(model, 30, false), None);
        assert_eq!(severity(model, 31, false), Some(Severity::Monitoring));
        assert_eq!(severity(model, 45, false), Some(Severity::Monitoring));
        assert_eq!(severity(model, 46, false), Some(Severity::Warning));
        assert_eq!(severity(model, 90, false), Some(Severity::HighRisk));
    }

    #[test]
    fn test_fast_track_window_is_bounded() {
        let model = RiskModel::LongTermStorage { depletion_months: 3 };
        assert_eq!(severity(model, 6, true), None);
        // At half the depletion window the standard rules take over again
        let at_half = classify("Vitamin A", &profile(model), 45, true).unwrap();
        assert_eq!(at_half.severity, Severity::Monitoring);
        assert!(!at_half.message.contains("fast-track"));
        assert_eq!(severity(model, 90, true), Some(Severity::HighRisk));
    }

    #[test]
    fn test_structural_rules() {
        let model = RiskModel::Structural { depletion_months: 12 };
        assert_eq!(severity(model, 60, false), None);
        assert_eq!(severity(model, 61, false), Some(Severity::Monitoring));
        assert_eq!(severity(model, 181, false), Some(Severity::Warning));
        // No high-risk tier for structural reserves
        assert_eq!(severity(model, 1000, false), Some(Severity::Warning));
        assert_eq!(severity(model, 7, true), Some(Severity::Monitoring));
    }

    #[test]
    fn test_structural_message_mentions_symptom() {
        let model = RiskModel::Structural { depletion_months: 12 };
        let result = classify("Calcium", &profile(model), 61, false).unwrap();
        assert!(result.message.contains("brittle bones"));
        assert!(result.message.contains("61"));
    }

    #[test]
    fn test_acute_regulated() {
        assert_eq!(severity(RiskModel::AcuteRegulated, 3, false), None);
        assert_eq!(
            severity(RiskModel::AcuteRegulated, 4, false),
            Some(Severity::Monitoring)
        );
        assert_eq!(severity(RiskModel::AcuteRegulated, 3, true), None);
    }

    #[test]
    fn test_adaptive_never_warns() {
        for days in [0, 1, 10, 100, 10_000] {
            assert_eq!(severity(RiskModel::Adaptive, days, false), None);
            assert_eq!(severity(RiskModel::Adaptive, days, true), None);
        }
    }

    #[test]
    fn test_messages_name_streak_and_condition() {
        let models = [
            RiskModel::DailyEssential { onset_hours: 24 },
            RiskModel::DailyTurnover { onset_weeks: 1 },
            RiskModel::LongTermStorage { depletion_months: 1 },
            RiskModel::Structural { depletion_months: 1 },
            RiskModel::AcuteRegulated,
        ];
        for model in models {
            let result = classify("Nutrient X", &profile(model), 400, false).unwrap();
            assert!(result.message.contains("400"), "{}", result.message);
            assert!(result.message.contains("Test deficiency"), "{}", result.message);
        }
    }
}
