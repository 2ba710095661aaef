#![forbid(unsafe_code)]

//! Core domain model and analysis engine for Nutriwatch.
//!
//! This crate provides:
//! - Domain types (amounts, nutrients, demographics, risk models, warnings)
//! - The nutrient knowledge base and unit conversion
//! - Longitudinal deficiency analysis (aggregate, streak, classify, rank)
//! - Persistence (log store trait, in-memory store, locked JSONL journal)
//! - Per-profile trackers, CSV export, configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod knowledge;
pub mod units;
pub mod aggregate;
pub mod streak;
pub mod classify;
pub mod rank;
pub mod analysis;
pub mod store;
pub mod journal;
pub mod tracker;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use knowledge::{default_knowledge_base, KnowledgeBase, NutrientRecord};
pub use analysis::{analyze, assess, AnalysisReport, SkipReason};
pub use store::{LogStore, MemoryLogStore};
pub use journal::JsonlLogStore;
pub use tracker::{ProfileTracker, TrackerRegistry};
pub use export::export_daily_totals;
