//! Error types for the nutri_core library.

use crate::types::NutrientType;
use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nutri_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two amounts of the same nutrient on the same day carry different units
    #[error("Unit mismatch for {nutrient} on {date}: expected '{expected}', found '{found}'")]
    UnitMismatch {
        nutrient: NutrientType,
        date: NaiveDate,
        expected: String,
        found: String,
    },

    /// No conversion exists between the requested units
    #[error("Cannot convert {nutrient} from '{from}' to '{to}'")]
    UnitConversion {
        nutrient: NutrientType,
        from: String,
        to: String,
    },

    /// The log store could not be read or written
    #[error("Log store unavailable at {path:?}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A referenced entry or day does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed user input (amounts, nutrient keys, dates)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Knowledge base validation error
    #[error("Knowledge base validation error: {0}")]
    KnowledgeBase(String),

    /// Shared state error (poisoned profile lock)
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an IO failure against a store path
    pub(crate) fn store(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::StoreUnavailable {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
