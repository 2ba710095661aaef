//! Core domain types for the nutrient tracking system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Amounts with units
//! - Nutrient and demographic identifiers
//! - Deficiency risk models and profiles
//! - Food entries and daily intake records
//! - Analysis output (warnings and severities)

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Amounts
// ============================================================================

/// A quantity with a unit (e.g. `30 mg`, `2.4 µg`)
///
/// Amounts only combine or compare when their units are identical.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Amount {
    pub value: f64,
    pub unit: String,
}

impl Amount {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Zero of the given unit
    pub fn zero(unit: impl Into<String>) -> Self {
        Self::new(0.0, unit)
    }

    pub fn same_unit(&self, other: &Amount) -> bool {
        self.unit == other.unit
    }

    /// Sum of two amounts, or None when the units differ
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        if !self.same_unit(other) {
            return None;
        }
        Some(Amount::new(self.value + other.value, self.unit.clone()))
    }

    /// Ordering of two amounts, or None when the units differ (or a value is NaN)
    pub fn compare(&self, other: &Amount) -> Option<Ordering> {
        if !self.same_unit(other) {
            return None;
        }
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parses `30mg`, `2.4 µg`, `400 IU`, `1.5 L`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+'))
            .map(|(i, _)| i)
            .unwrap_or(s.len());

        let (number, unit) = s.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| Error::InvalidInput(format!("'{}' does not start with a number", s)))?;
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(Error::InvalidInput(format!("'{}' is missing a unit", s)));
        }
        let mut chars = unit.chars();
        if matches!(chars.next(), Some('e' | 'E'))
            && matches!(chars.next(), Some(c) if c.is_ascii_digit() || c == '+' || c == '-')
        {
            return Err(Error::InvalidInput(format!(
                "'{}' uses exponent notation, which is not supported",
                s
            )));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidInput(format!(
                "'{}' must be a non-negative amount",
                s
            )));
        }
        Ok(Amount::new(value, unit))
    }
}

// ============================================================================
// Nutrients and Demographics
// ============================================================================

/// Every nutrient the system tracks
///
/// Declaration order is the analysis evaluation order, which is also the
/// tie-break order between warnings of equal severity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NutrientType {
    // Vitamins
    VitaminA,
    VitaminB1,
    VitaminB2,
    VitaminB3,
    VitaminB5,
    VitaminB6,
    VitaminB7,
    VitaminB9,
    VitaminB12,
    VitaminC,
    VitaminD,
    VitaminE,
    VitaminK,

    // Minerals
    Calcium,
    Magnesium,
    Phosphorus,
    Potassium,
    Sodium,
    Chloride,
    Iron,
    Zinc,
    Copper,
    Manganese,
    Iodine,
    Selenium,
    Molybdenum,
    Chromium,
    Fluoride,

    // Macronutrients
    Carbohydrates,
    Proteins,
    Fats,
    Water,
    Fiber,
}

impl NutrientType {
    /// All nutrients in evaluation order
    pub const ALL: [NutrientType; 33] = [
        NutrientType::VitaminA,
        NutrientType::VitaminB1,
        NutrientType::VitaminB2,
        NutrientType::VitaminB3,
        NutrientType::VitaminB5,
        NutrientType::VitaminB6,
        NutrientType::VitaminB7,
        NutrientType::VitaminB9,
        NutrientType::VitaminB12,
        NutrientType::VitaminC,
        NutrientType::VitaminD,
        NutrientType::VitaminE,
        NutrientType::VitaminK,
        NutrientType::Calcium,
        NutrientType::Magnesium,
        NutrientType::Phosphorus,
        NutrientType::Potassium,
        NutrientType::Sodium,
        NutrientType::Chloride,
        NutrientType::Iron,
        NutrientType::Zinc,
        NutrientType::Copper,
        NutrientType::Manganese,
        NutrientType::Iodine,
        NutrientType::Selenium,
        NutrientType::Molybdenum,
        NutrientType::Chromium,
        NutrientType::Fluoride,
        NutrientType::Carbohydrates,
        NutrientType::Proteins,
        NutrientType::Fats,
        NutrientType::Water,
        NutrientType::Fiber,
    ];

    /// Stable snake_case key, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientType::VitaminA => "vitamin_a",
            NutrientType::VitaminB1 => "vitamin_b1",
            NutrientType::VitaminB2 => "vitamin_b2",
            NutrientType::VitaminB3 => "vitamin_b3",
            NutrientType::VitaminB5 => "vitamin_b5",
            NutrientType::VitaminB6 => "vitamin_b6",
            NutrientType::VitaminB7 => "vitamin_b7",
            NutrientType::VitaminB9 => "vitamin_b9",
            NutrientType::VitaminB12 => "vitamin_b12",
            NutrientType::VitaminC => "vitamin_c",
            NutrientType::VitaminD => "vitamin_d",
            NutrientType::VitaminE => "vitamin_e",
            NutrientType::VitaminK => "vitamin_k",
            NutrientType::Calcium => "calcium",
            NutrientType::Magnesium => "magnesium",
            NutrientType::Phosphorus => "phosphorus",
            NutrientType::Potassium => "potassium",
            NutrientType::Sodium => "sodium",
            NutrientType::Chloride => "chloride",
            NutrientType::Iron => "iron",
            NutrientType::Zinc => "zinc",
            NutrientType::Copper => "copper",
            NutrientType::Manganese => "manganese",
            NutrientType::Iodine => "iodine",
            NutrientType::Selenium => "selenium",
            NutrientType::Molybdenum => "molybdenum",
            NutrientType::Chromium => "chromium",
            NutrientType::Fluoride => "fluoride",
            NutrientType::Carbohydrates => "carbohydrates",
            NutrientType::Proteins => "proteins",
            NutrientType::Fats => "fats",
            NutrientType::Water => "water",
            NutrientType::Fiber => "fiber",
        }
    }
}

impl fmt::Display for NutrientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NutrientType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        NutrientType::ALL
            .iter()
            .copied()
            .find(|n| n.as_str() == key)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown nutrient: {}", s)))
    }
}

/// Broad nutrient family
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutrientCategory {
    Vitamin,
    Mineral,
    Macronutrient,
}

/// Vitamin solubility
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Solubility {
    WaterSoluble,
    FatSoluble,
}

/// Age/sex/physiological band used to select an allowance
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DemographicGroup {
    Infant,
    Child,
    TeenageMale,
    TeenageFemale,
    AdultMale,
    AdultFemale,
    PregnantFemale,
    LactatingFemale,
    ElderlyMale,
    ElderlyFemale,
}

impl DemographicGroup {
    pub const ALL: [DemographicGroup; 10] = [
        DemographicGroup::Infant,
        DemographicGroup::Child,
        DemographicGroup::TeenageMale,
        DemographicGroup::TeenageFemale,
        DemographicGroup::AdultMale,
        DemographicGroup::AdultFemale,
        DemographicGroup::PregnantFemale,
        DemographicGroup::LactatingFemale,
        DemographicGroup::ElderlyMale,
        DemographicGroup::ElderlyFemale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemographicGroup::Infant => "infant",
            DemographicGroup::Child => "child",
            DemographicGroup::TeenageMale => "teenage_male",
            DemographicGroup::TeenageFemale => "teenage_female",
            DemographicGroup::AdultMale => "adult_male",
            DemographicGroup::AdultFemale => "adult_female",
            DemographicGroup::PregnantFemale => "pregnant_female",
            DemographicGroup::LactatingFemale => "lactating_female",
            DemographicGroup::ElderlyMale => "elderly_male",
            DemographicGroup::ElderlyFemale => "elderly_female",
        }
    }
}

impl fmt::Display for DemographicGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemographicGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        DemographicGroup::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == key)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown demographic group: {}", s)))
    }
}

// ============================================================================
// Deficiency Risk Types
// ============================================================================

/// How quickly a nutrient's body reserve depletes
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RiskModel {
    /// Very fast turnover, no body reserve
    DailyEssential { onset_hours: u32 },
    /// Moderate reserve measured in weeks
    DailyTurnover { onset_weeks: u32 },
    /// Large reserve (fat-soluble vitamins, B12, iron)
    LongTermStorage { depletion_months: u32 },
    /// Reserve bound into body structures (bone minerals)
    Structural { depletion_months: u32 },
    /// Tightly regulated; diet alone rarely causes deficiency
    AcuteRegulated,
    /// No dietary-onset deficiency model
    Adaptive,
}

/// Deficiency knowledge attached to a nutrient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeficiencyProfile {
    pub common_name: String,
    pub risk_model: RiskModel,
    pub key_symptoms: Vec<String>,
    pub at_risk_populations: Vec<String>,
}

/// Ordinal risk level of a warning
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Monitoring,
    Warning,
    HighRisk,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Monitoring => "monitoring",
            Severity::Warning => "warning",
            Severity::HighRisk => "high risk",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// One logged food with its nutrient contributions
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub serving_size: Option<Amount>,
    pub logged_at: DateTime<Utc>,
    pub nutrients: BTreeMap<NutrientType, Amount>,
}

impl FoodEntry {
    pub fn new(name: impl Into<String>, logged_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            serving_size: None,
            logged_at,
            nutrients: BTreeMap::new(),
        }
    }

    pub fn with_nutrient(mut self, nutrient: NutrientType, amount: Amount) -> Self {
        self.nutrients.insert(nutrient, amount);
        self
    }

    pub fn with_serving_size(mut self, serving: Amount) -> Self {
        self.serving_size = Some(serving);
        self
    }

    /// Amount of a nutrient in this food, if listed
    pub fn amount_of(&self, nutrient: NutrientType) -> Option<&Amount> {
        self.nutrients.get(&nutrient)
    }
}

/// Nutrient totals for one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyIntakeRecord {
    pub date: NaiveDate,
    pub totals: BTreeMap<NutrientType, Amount>,
}

impl DailyIntakeRecord {
    pub fn intake(&self, nutrient: NutrientType) -> Option<&Amount> {
        self.totals.get(&nutrient)
    }
}

// ============================================================================
// Analysis Output
// ============================================================================

/// A nutrient flagged by the analysis
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PotentialDeficiencyWarning {
    pub nutrient: NutrientType,
    pub consecutive_days_low: u32,
    pub message: String,
    pub severity: Severity,
    pub deficiency_profile: DeficiencyProfile,
}
