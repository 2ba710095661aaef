//! Log store abstraction.
//!
//! A log store persists food entries grouped by calendar day and serves the
//! aggregated history to the analysis. Every write is validated by the
//! aggregator first, so a stored day always aggregates cleanly.

use crate::aggregate::{aggregate_day, aggregate_history};
use crate::{DailyIntakeRecord, FoodEntry, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Persistence for daily food logs
pub trait LogStore {
    /// All days, aggregated, newest first
    fn fetch_all_daily_records(&self) -> Result<Vec<DailyIntakeRecord>>;

    /// Raw entries logged on one day, in insertion order
    fn entries_for_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>>;

    /// Add an entry to a day, creating the day if needed
    fn upsert_daily_record(&mut self, day: NaiveDate, entry: FoodEntry) -> Result<()>;

    /// Remove one entry; false if no entry has this id
    fn delete_food_entry(&mut self, id: Uuid) -> Result<bool>;

    /// Remove a day and all of its entries; false if the day was not logged
    fn delete_daily_record(&mut self, day: NaiveDate) -> Result<bool>;
}

/// Day-keyed entry log shared by the store implementations
#[derive(Clone, Debug, Default)]
pub(crate) struct DayLog {
    days: BTreeMap<NaiveDate, Vec<FoodEntry>>,
}

impl DayLog {
    pub(crate) fn records(&self) -> Result<Vec<DailyIntakeRecord>> {
        aggregate_history(&self.days)
    }

    pub(crate) fn entries(&self, day: NaiveDate) -> Vec<FoodEntry> {
        self.days.get(&day).cloned().unwrap_or_default()
    }

    /// Reject an entry that would make the day's totals inconsistent
    pub(crate) fn check_insert(&self, day: NaiveDate, entry: &FoodEntry) -> Result<()> {
        let mut candidate = self.entries(day);
        candidate.push(entry.clone());
        aggregate_day(day, &candidate).map(|_| ())
    }

    pub(crate) fn insert(&mut self, day: NaiveDate, entry: FoodEntry) {
        self.days.entry(day).or_default().push(entry);
    }

    pub(crate) fn contains_entry(&self, id: Uuid) -> bool {
        self.days.values().flatten().any(|e| e.id == id)
    }

    pub(crate) fn contains_day(&self, day: NaiveDate) -> bool {
        self.days.contains_key(&day)
    }

    /// Remove an entry; a day left without entries stays logged
    pub(crate) fn remove_entry(&mut self, id: Uuid) -> bool {
        for entries in self.days.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    pub(crate) fn remove_day(&mut self, day: NaiveDate) -> bool {
        self.days.remove(&day).is_some()
    }
}

/// In-process log store
#[derive(Clone, Debug, Default)]
pub struct MemoryLogStore {
    log: DayLog,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryLogStore {
    fn fetch_all_daily_records(&self) -> Result<Vec<DailyIntakeRecord>> {
        self.log.records()
    }

    fn entries_for_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>> {
        Ok(self.log.entries(day))
    }

    fn upsert_daily_record(&mut self, day: NaiveDate, entry: FoodEntry) -> Result<()> {
        self.log.check_insert(day, &entry)?;
        self.log.insert(day, entry);
        Ok(())
    }

    fn delete_food_entry(&mut self, id: Uuid) -> Result<bool> {
        Ok(self.log.remove_entry(id))
    }

    fn delete_daily_record(&mut self, day: NaiveDate) -> Result<bool> {
        Ok(self.log.remove_day(day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Amount, Error, NutrientType};
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn food(mg: f64) -> FoodEntry {
        FoodEntry::new("spinach", Utc::now())
            .with_nutrient(NutrientType::Iron, Amount::new(mg, "mg"))
    }

    #[test]
    fn test_upsert_creates_and_extends_days() {
        let mut store = MemoryLogStore::new();
        store.upsert_daily_record(day(1), food(2.0)).unwrap();
        store.upsert_daily_record(day(1), food(3.0)).unwrap();
        store.upsert_daily_record(day(2), food(1.0)).unwrap();

        let records = store.fetch_all_daily_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, day(2));
        assert_eq!(
            records[1].intake(NutrientType::Iron),
            Some(&Amount::new(5.0, "mg"))
        );
    }

    #[test]
    fn test_upsert_rejects_unit_clash() {
        let mut store = MemoryLogStore::new();
        store.upsert_daily_record(day(1), food(2.0)).unwrap();

        let clash = FoodEntry::new("supplement", Utc::now())
            .with_nutrient(NutrientType::Iron, Amount::new(0.01, "g"));
        let result = store.upsert_daily_record(day(1), clash);
        assert!(matches!(result, Err(Error::UnitMismatch { .. })));

        // Rejected entry was not stored
        assert_eq!(store.entries_for_day(day(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_entry() {
        let mut store = MemoryLogStore::new();
        let entry = food(2.0);
        let id = entry.id;
        store.upsert_daily_record(day(1), entry).unwrap();
        store.upsert_daily_record(day(1), food(4.0)).unwrap();

        assert!(store.delete_food_entry(id).unwrap());
        assert!(!store.delete_food_entry(id).unwrap());

        let records = store.fetch_all_daily_records().unwrap();
        assert_eq!(
            records[0].intake(NutrientType::Iron),
            Some(&Amount::new(4.0, "mg"))
        );
    }

    #[test]
    fn test_delete_day_cascades() {
        let mut store = MemoryLogStore::new();
        store.upsert_daily_record(day(1), food(2.0)).unwrap();
        store.upsert_daily_record(day(1), food(4.0)).unwrap();

        assert!(store.delete_daily_record(day(1)).unwrap());
        assert!(!store.delete_daily_record(day(1)).unwrap());
        assert!(store.entries_for_day(day(1)).unwrap().is_empty());
        assert!(store.fetch_all_daily_records().unwrap().is_empty());
    }
}
