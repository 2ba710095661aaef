//! Below-allowance streak measurement.
//!
//! Walks a nutrient's history from the most recent record backward and
//! counts consecutive records whose intake is under the allowance.
//!
//! Days with no record at all are not part of the sequence, so a gap in
//! logging neither extends nor breaks a streak.

use crate::{Amount, DailyIntakeRecord, NutrientType};
use std::cmp::Ordering;

/// Count the most recent consecutive records below `allowance`
///
/// `history` must be sorted newest first with one record per day. A missing
/// nutrient counts as zero intake. A record whose unit does not match the
/// allowance cannot be compared and ends the streak.
pub fn consecutive_days_low(
    nutrient: NutrientType,
    allowance: &Amount,
    history: &[DailyIntakeRecord],
) -> u32 {
    let zero = Amount::zero(allowance.unit.clone());
    let mut days = 0;

    for record in history {
        let intake = record.intake(nutrient).unwrap_or(&zero);

        match intake.compare(allowance) {
            Some(Ordering::Less) => days += 1,
            Some(_) => break,
            None => {
                tracing::warn!(
                    "Cannot compare {} intake of {} on {} with allowance {}; ending streak",
                    nutrient,
                    intake,
                    record.date,
                    allowance
                );
                break;
            }
        }
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    /// Build a newest-first history from daily vitamin C values (mg)
    fn history(values: &[Option<f64>]) -> Vec<DailyIntakeRecord> {
        let newest = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut totals = BTreeMap::new();
                if let Some(v) = v {
                    totals.insert(NutrientType::VitaminC, Amount::new(*v, "mg"));
                }
                DailyIntakeRecord {
                    date: newest - Duration::days(i as i64),
                    totals,
                }
            })
            .collect()
    }

    fn rda() -> Amount {
        Amount::new(90.0, "mg")
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &[]), 0);
    }

    #[test]
    fn test_newest_day_meets_allowance() {
        let h = history(&[Some(90.0), Some(10.0), Some(10.0)]);
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &h), 0);
    }

    #[test]
    fn test_stops_at_first_compliant_day() {
        let h = history(&[Some(10.0), Some(89.9), Some(120.0), Some(5.0)]);
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &h), 2);
    }

    #[test]
    fn test_missing_nutrient_counts_as_zero() {
        let h = history(&[None, None, Some(10.0)]);
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &h), 3);
    }

    #[test]
    fn test_whole_history_low() {
        let h = history(&[Some(1.0); 20]);
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &h), 20);
    }

    #[test]
    fn test_logging_gap_is_invisible() {
        // Two records five days apart still form a two-day streak
        let mut h = history(&[Some(1.0), Some(1.0)]);
        h[1].date = h[0].date - Duration::days(5);
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &h), 2);
    }

    #[test]
    fn test_unit_mismatch_ends_streak() {
        let mut h = history(&[Some(1.0), Some(1.0), Some(1.0)]);
        h[1]
            .totals
            .insert(NutrientType::VitaminC, Amount::new(0.001, "g"));
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &rda(), &h), 1);
    }

    #[test]
    fn test_zero_allowance_never_low() {
        let h = history(&[None, None]);
        let zero = Amount::zero("mg");
        assert_eq!(consecutive_days_low(NutrientType::VitaminC, &zero, &h), 0);
    }
}
