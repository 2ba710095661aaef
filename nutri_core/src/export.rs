//! CSV export of daily nutrient totals.
//!
//! The file is written to a temporary sibling, synced, then renamed over the
//! destination, so readers never observe a half-written export.

use crate::{DailyIntakeRecord, Error, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    nutrient: &'a str,
    value: f64,
    unit: &'a str,
}

/// Write one row per (day, nutrient) total and return the row count
///
/// Rows follow the record order (newest day first when given the store's
/// history) and nutrient enumeration order within a day.
pub fn export_daily_totals(records: &[DailyIntakeRecord], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    // Temp file in the same directory for atomic rename
    let temp = NamedTempFile::new_in(parent)?;
    let mut rows = 0;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        for record in records {
            let date = record.date.format("%Y-%m-%d").to_string();
            for (nutrient, amount) in &record.totals {
                writer.serialize(CsvRow {
                    date: date.clone(),
                    nutrient: nutrient.as_str(),
                    value: amount.value,
                    unit: &amount.unit,
                })?;
                rows += 1;
            }
        }
        if rows == 0 {
            writer.write_record(["date", "nutrient", "value", "unit"])?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} rows to {:?}", rows, path);
    Ok(rows)
}
