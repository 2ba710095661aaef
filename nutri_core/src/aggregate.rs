//! Daily intake aggregation.
//!
//! Collapses the food entries logged on one calendar day into a single
//! `DailyIntakeRecord`. Amounts are only summed when their units agree.

use crate::{Amount, DailyIntakeRecord, Error, FoodEntry, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// Calendar-day floor of a timestamp, in the timestamp's own time zone
pub fn day_key<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    timestamp.date_naive()
}

/// Noon of `day` in `tz`, as a UTC timestamp
///
/// Used as the log time of entries back-dated to `day`, so that
/// `day_key` in the same zone gives `day` again.
pub fn day_timestamp<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let noon = day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    tz.from_local_datetime(&noon)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| noon.and_utc())
}

/// Sum one day's entries into a daily record
///
/// Fails with `UnitMismatch` when two contributions to the same nutrient
/// use different units.
pub fn aggregate_day(date: NaiveDate, entries: &[FoodEntry]) -> Result<DailyIntakeRecord> {
    let mut totals: BTreeMap<_, Amount> = BTreeMap::new();

    for entry in entries {
        for (nutrient, amount) in &entry.nutrients {
            let total = totals
                .entry(*nutrient)
                .or_insert_with(|| Amount::zero(amount.unit.clone()));

            let sum = total
                .checked_add(amount)
                .ok_or_else(|| Error::UnitMismatch {
                    nutrient: *nutrient,
                    date,
                    expected: total.unit.clone(),
                    found: amount.unit.clone(),
                })?;
            *total = sum;
        }
    }

    tracing::trace!(
        "Aggregated {} entries into {} nutrient totals for {}",
        entries.len(),
        totals.len(),
        date
    );

    Ok(DailyIntakeRecord { date, totals })
}

/// Group a flat list of entries by the day of their log timestamp in `tz`
pub fn group_by_day<Tz: TimeZone>(
    entries: impl IntoIterator<Item = FoodEntry>,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<FoodEntry>> {
    let mut days: BTreeMap<NaiveDate, Vec<FoodEntry>> = BTreeMap::new();
    for entry in entries {
        let day = day_key(&entry.logged_at.with_timezone(tz));
        days.entry(day).or_default().push(entry);
    }
    days
}

/// Aggregate every day, returning records sorted newest first
pub fn aggregate_history(days: &BTreeMap<NaiveDate, Vec<FoodEntry>>) -> Result<Vec<DailyIntakeRecord>> {
    let mut records = days
        .iter()
        .map(|(date, entries)| aggregate_day(*date, entries))
        .collect::<Result<Vec<_>>>()?;

    records.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(records)
}
