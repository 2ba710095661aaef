//! JSON Lines journal backing a profile's food log.
//!
//! Every change is appended as one JSON event per line under an exclusive
//! file lock; reads replay the journal under a shared lock. Lock waits are
//! bounded so a stalled writer surfaces as `StoreUnavailable` instead of
//! hanging the caller.

use crate::store::{DayLog, LogStore};
use crate::{DailyIntakeRecord, Error, FoodEntry, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Default bound on waiting for the journal lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// One line of the journal
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum JournalEvent {
    AddFood { day: NaiveDate, entry: FoodEntry },
    DeleteFood { id: Uuid },
    DeleteDay { day: NaiveDate },
}

#[derive(Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// File-backed log store with advisory locking
#[derive(Clone, Debug)]
pub struct JsonlLogStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl JsonlLogStore {
    /// Create a journal store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, err: impl std::fmt::Display) -> Error {
        Error::store(self.path.clone(), err)
    }

    /// Wait for the lock, polling until the timeout expires
    fn acquire(&self, file: &File, mode: LockMode) -> Result<()> {
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            let attempt = match mode {
                LockMode::Shared => FileExt::try_lock_shared(file),
                LockMode::Exclusive => FileExt::try_lock_exclusive(file),
            };

            match attempt {
                Ok(()) => return Ok(()),
                Err(e) if is_contended(&e) => {
                    if Instant::now() >= deadline {
                        return Err(self.unavailable(format!(
                            "timed out after {:?} waiting for journal lock",
                            self.lock_timeout
                        )));
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(self.unavailable(e)),
            }
        }
    }

    fn release(&self, file: &File) -> Result<()> {
        FileExt::unlock(file).map_err(|e| self.unavailable(e))
    }

    /// Replay the journal into a day log
    ///
    /// Unparseable lines (e.g. a write torn by a crash) are skipped.
    fn replay(&self, file: &File) -> Result<DayLog> {
        let reader = BufReader::new(file);
        let mut log = DayLog::default();

        // Split on raw bytes so a line torn inside a multi-byte character is skipped like any other
        for (line_num, line_result) in reader.split(b'\n').enumerate() {
            let line = line_result.map_err(|e| self.unavailable(e))?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice::<JournalEvent>(&line) {
                Ok(JournalEvent::AddFood { day, entry }) => log.insert(day, entry),
                Ok(JournalEvent::DeleteFood { id }) => {
                    log.remove_entry(id);
                }
                Ok(JournalEvent::DeleteDay { day }) => {
                    log.remove_day(day);
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable journal line {} in {:?}: {}",
                        line_num + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        Ok(log)
    }

    /// Read the current state under a shared lock
    fn load(&self) -> Result<DayLog> {
        if !self.path.exists() {
            return Ok(DayLog::default());
        }

        let file = File::open(&self.path).map_err(|e| self.unavailable(e))?;
        self.acquire(&file, LockMode::Shared)?;
        let log = self.replay(&file);
        self.release(&file)?;
        log
    }

    /// Run `f` against the current state under an exclusive lock and append
    /// the event it returns, if any
    fn mutate<T>(&self, f: impl FnOnce(&DayLog) -> Result<(T, Option<JournalEvent>)>) -> Result<T> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.unavailable(e))?;

        self.acquire(&file, LockMode::Exclusive)?;
        let result = self
            .replay(&file)
            .and_then(|log| f(&log))
            .and_then(|(value, event)| {
                if let Some(event) = event {
                    self.append(&file, &event)?;
                }
                Ok(value)
            });
        self.release(&file)?;
        result
    }

    fn append(&self, file: &File, event: &JournalEvent) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        // Never glue a new event onto a torn final line
        if !ends_with_newline(file).map_err(|e| self.unavailable(e))? {
            line.insert(0, '\n');
        }

        let mut writer = io::BufWriter::new(file);
        writer
            .write_all(line.as_bytes())
            .map_err(|e| self.unavailable(e))?;
        writer.flush().map_err(|e| self.unavailable(e))?;
        drop(writer);
        file.sync_data().map_err(|e| self.unavailable(e))?;

        tracing::debug!("Appended {:?} event to {:?}", event_kind(event), self.path);
        Ok(())
    }
}

fn event_kind(event: &JournalEvent) -> &'static str {
    match event {
        JournalEvent::AddFood { .. } => "add_food",
        JournalEvent::DeleteFood { .. } => "delete_food",
        JournalEvent::DeleteDay { .. } => "delete_day",
    }
}

/// True for an empty file or one whose last byte is a newline
fn ends_with_newline(mut file: &File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl LogStore for JsonlLogStore {
    fn fetch_all_daily_records(&self) -> Result<Vec<DailyIntakeRecord>> {
        let records = self.load()?.records()?;
        tracing::debug!("Read {} daily records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn entries_for_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>> {
        Ok(self.load()?.entries(day))
    }

    fn upsert_daily_record(&mut self, day: NaiveDate, entry: FoodEntry) -> Result<()> {
        self.mutate(|log| {
            log.check_insert(day, &entry)?;
            Ok(((), Some(JournalEvent::AddFood { day, entry })))
        })
    }

    fn delete_food_entry(&mut self, id: Uuid) -> Result<bool> {
        self.mutate(|log| {
            if log.contains_entry(id) {
                Ok((true, Some(JournalEvent::DeleteFood { id })))
            } else {
                Ok((false, None))
            }
        })
    }

    fn delete_daily_record(&mut self, day: NaiveDate) -> Result<bool> {
        self.mutate(|log| {
            if log.contains_day(day) {
                Ok((true, Some(JournalEvent::DeleteDay { day })))
            } else {
                Ok((false, None))
            }
        })
    }
}
