//! Per-profile access to a log store.
//!
//! A `ProfileTracker` owns one profile's store behind a mutex, so at most
//! one log mutation or analysis runs against a profile at a time. The
//! `TrackerRegistry` hands out a single shared tracker per profile name;
//! different profiles never contend.

use crate::analysis::{assess, AnalysisReport};
use crate::journal::JsonlLogStore;
use crate::knowledge::KnowledgeBase;
use crate::store::LogStore;
use crate::units::normalize_entry;
use crate::{
    DailyIntakeRecord, DemographicGroup, Error, FoodEntry, PotentialDeficiencyWarning, Result,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// Journal file name inside a profile directory
pub const JOURNAL_FILE: &str = "intake.jsonl";

/// Serialized access to one profile's food log
pub struct ProfileTracker<S> {
    profile: String,
    knowledge: Arc<KnowledgeBase>,
    store: Mutex<S>,
}

impl<S: LogStore> ProfileTracker<S> {
    pub fn new(profile: impl Into<String>, knowledge: Arc<KnowledgeBase>, store: S) -> Self {
        Self {
            profile: profile.into(),
            knowledge,
            store: Mutex::new(store),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store.lock().map_err(|_| {
            Error::State(format!("log store lock for profile '{}' is poisoned", self.profile))
        })
    }

    /// Log a food entry on `day`
    ///
    /// Nutrient amounts are converted to the knowledge base's unit first;
    /// an amount with no conversion rejects the whole entry. Returns the entry id.
    pub fn add_food(&self, day: NaiveDate, entry: FoodEntry) -> Result<Uuid> {
        let entry = normalize_entry(&self.knowledge, entry)?;
        let id = entry.id;
        let name = entry.name.clone();

        self.lock()?.upsert_daily_record(day, entry)?;

        tracing::info!("Logged '{}' ({}) on {} for {}", name, id, day, self.profile);
        Ok(id)
    }

    /// Remove one entry; false if the id is unknown
    pub fn delete_food(&self, id: Uuid) -> Result<bool> {
        let removed = self.lock()?.delete_food_entry(id)?;
        if removed {
            tracing::info!("Deleted entry {} for {}", id, self.profile);
        }
        Ok(removed)
    }

    /// Remove a whole day; false if nothing was logged on it
    pub fn delete_day(&self, day: NaiveDate) -> Result<bool> {
        let removed = self.lock()?.delete_daily_record(day)?;
        if removed {
            tracing::info!("Deleted log for {} ({})", day, self.profile);
        }
        Ok(removed)
    }

    /// Aggregated history, newest first
    pub fn daily_records(&self) -> Result<Vec<DailyIntakeRecord>> {
        self.lock()?.fetch_all_daily_records()
    }

    pub fn entries_for_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>> {
        self.lock()?.entries_for_day(day)
    }

    /// Ranked deficiency warnings for this profile's history
    pub fn potential_deficiencies(
        &self,
        demographic: DemographicGroup,
        assumes_prior_deficiency: bool,
    ) -> Result<Vec<PotentialDeficiencyWarning>> {
        Ok(self.report(demographic, assumes_prior_deficiency)?.warnings)
    }

    /// Full analysis report, including skipped nutrients
    pub fn report(
        &self,
        demographic: DemographicGroup,
        assumes_prior_deficiency: bool,
    ) -> Result<AnalysisReport> {
        // Hold the lock across the read and the analysis
        let store = self.lock()?;
        let history = store.fetch_all_daily_records()?;
        Ok(assess(
            &history,
            &self.knowledge,
            demographic,
            assumes_prior_deficiency,
        ))
    }
}

type StoreFactory<S> = Box<dyn Fn(&str) -> Result<S> + Send + Sync>;

/// One shared tracker per profile name
pub struct TrackerRegistry<S> {
    knowledge: Arc<KnowledgeBase>,
    trackers: Mutex<HashMap<String, Arc<ProfileTracker<S>>>>,
    open_store: StoreFactory<S>,
}

impl<S: LogStore> TrackerRegistry<S> {
    /// Create a registry that opens stores with `open_store(profile)`
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        open_store: impl Fn(&str) -> Result<S> + Send + Sync + 'static,
    ) -> Self {
        Self {
            knowledge,
            trackers: Mutex::new(HashMap::new()),
            open_store: Box::new(open_store),
        }
    }

    /// Get the tracker for a profile, opening its store on first use
    pub fn tracker(&self, profile: &str) -> Result<Arc<ProfileTracker<S>>> {
        validate_profile_name(profile)?;

        let mut trackers = self
            .trackers
            .lock()
            .map_err(|_| Error::State("tracker registry lock is poisoned".into()))?;

        if let Some(tracker) = trackers.get(profile) {
            return Ok(Arc::clone(tracker));
        }

        let store = (self.open_store)(profile)?;
        let tracker = Arc::new(ProfileTracker::new(
            profile,
            Arc::clone(&self.knowledge),
            store,
        ));
        trackers.insert(profile.to_string(), Arc::clone(&tracker));
        tracing::debug!("Opened tracker for profile '{}'", profile);
        Ok(tracker)
    }

    /// Names of the profiles opened so far, sorted
    pub fn profiles(&self) -> Result<Vec<String>> {
        let trackers = self
            .trackers
            .lock()
            .map_err(|_| Error::State("tracker registry lock is poisoned".into()))?;
        let mut names: Vec<_> = trackers.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl TrackerRegistry<JsonlLogStore> {
    /// Registry of journal-backed trackers under `data_dir/profiles/`
    pub fn journals(
        data_dir: impl Into<PathBuf>,
        lock_timeout: Duration,
        knowledge: Arc<KnowledgeBase>,
    ) -> Self {
        let data_dir = data_dir.into();
        Self::new(knowledge, move |profile| {
            Ok(JsonlLogStore::new(journal_path(&data_dir, profile)).with_lock_timeout(lock_timeout))
        })
    }
}

/// Location of a profile's journal
pub fn journal_path(data_dir: &Path, profile: &str) -> PathBuf {
    data_dir.join("profiles").join(profile).join(JOURNAL_FILE)
}

/// Profile names become directory names, so keep them to a safe alphabet
pub fn validate_profile_name(profile: &str) -> Result<()> {
    let valid = !profile.is_empty()
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !profile.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "profile name '{}' must be non-empty and use only letters, digits, '-', '_' or '.'",
            profile
        )))
    }
}
