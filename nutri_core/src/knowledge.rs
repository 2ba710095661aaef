//! Built-in nutrient knowledge base.
//!
//! One immutable registry maps each nutrient to its display name, family,
//! per-demographic recommended daily allowance, ranked dietary sources and
//! (optionally) a deficiency profile. Nutrients without a profile are never
//! analyzed.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Cached default knowledge base - built once and shared by all trackers
static DEFAULT_KNOWLEDGE_BASE: Lazy<Arc<KnowledgeBase>> =
    Lazy::new(|| Arc::new(build_default_knowledge_base()));

/// Shared handle to the built-in knowledge base
pub fn default_knowledge_base() -> Arc<KnowledgeBase> {
    Arc::clone(&DEFAULT_KNOWLEDGE_BASE)
}

/// Reference data for a single nutrient
#[derive(Clone, Debug)]
pub struct NutrientRecord {
    pub nutrient: NutrientType,
    pub name: String,
    pub category: NutrientCategory,
    pub solubility: Option<Solubility>,
    pub allowances: HashMap<DemographicGroup, Amount>,
    pub dietary_sources: Vec<String>,
    pub deficiency_profile: Option<DeficiencyProfile>,
}

impl NutrientRecord {
    /// Canonical unit for this nutrient (the unit of its allowances)
    pub fn unit(&self) -> Option<&str> {
        DemographicGroup::ALL
            .iter()
            .find_map(|d| self.allowances.get(d))
            .map(|a| a.unit.as_str())
    }
}

/// Read-only nutrient registry
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    records: BTreeMap<NutrientType, NutrientRecord>,
}

impl KnowledgeBase {
    pub fn from_records(records: impl IntoIterator<Item = NutrientRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.nutrient, r)).collect(),
        }
    }

    pub fn record(&self, nutrient: NutrientType) -> Option<&NutrientRecord> {
        self.records.get(&nutrient)
    }

    /// Records in nutrient evaluation order
    pub fn records(&self) -> impl Iterator<Item = &NutrientRecord> {
        self.records.values()
    }

    pub fn allowance(&self, nutrient: NutrientType, group: DemographicGroup) -> Option<&Amount> {
        self.record(nutrient).and_then(|r| r.allowances.get(&group))
    }

    pub fn deficiency_profile(&self, nutrient: NutrientType) -> Option<&DeficiencyProfile> {
        self.record(nutrient)
            .and_then(|r| r.deficiency_profile.as_ref())
    }

    /// Check internal consistency, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for nutrient in NutrientType::ALL {
            let Some(record) = self.record(nutrient) else {
                errors.push(format!("Missing record for {}", nutrient));
                continue;
            };

            for group in DemographicGroup::ALL {
                if !record.allowances.contains_key(&group) {
                    errors.push(format!("{}: no allowance for {}", nutrient, group));
                }
            }

            if let Some(unit) = record.unit() {
                if record.allowances.values().any(|a| a.unit != unit) {
                    errors.push(format!("{}: allowances use more than one unit", nutrient));
                }
            }

            if let Some(profile) = &record.deficiency_profile {
                if profile.common_name.trim().is_empty() {
                    errors.push(format!("{}: deficiency profile has no name", nutrient));
                }
                let zero_param = match profile.risk_model {
                    RiskModel::DailyEssential { onset_hours } => onset_hours == 0,
                    RiskModel::DailyTurnover { onset_weeks } => onset_weeks == 0,
                    RiskModel::LongTermStorage { depletion_months }
                    | RiskModel::Structural { depletion_months } => depletion_months == 0,
                    RiskModel::AcuteRegulated | RiskModel::Adaptive => false,
                };
                if zero_param {
                    errors.push(format!("{}: risk model parameter must be positive", nutrient));
                }
            }
        }

        errors
    }
}

/// Builds the default knowledge base
///
/// **Note**: For production use, prefer `default_knowledge_base()` which
/// returns a shared handle.
pub fn build_default_knowledge_base() -> KnowledgeBase {
    use NutrientCategory::*;
    use NutrientType as N;
    use RiskModel::*;

    let records = vec![
        // ====================================================================
        // Vitamins
        // ====================================================================
        vitamin(N::VitaminA, "Vitamin A", Solubility::FatSoluble)
            .allowances("µg RAE", [400.0, 600.0, 900.0, 700.0, 900.0, 700.0, 770.0, 1300.0, 900.0, 700.0])
            .sources(&["Liver", "Carrots", "Eggs", "Leafy greens"])
            .profile(
                "Vitamin A deficiency",
                LongTermStorage { depletion_months: 12 },
                &["Night blindness", "Dry eyes", "Frequent infections"],
                &["Pregnant women", "Young children", "People with fat malabsorption"],
            ),
        vitamin(N::VitaminB1, "Vitamin B1", Solubility::WaterSoluble)
            .allowances("mg", [0.3, 0.6, 1.2, 1.0, 1.2, 1.1, 1.4, 1.4, 1.2, 1.1])
            .sources(&["Pork", "Whole grains", "Legumes", "Sunflower seeds"])
            .profile(
                "Beriberi",
                DailyTurnover { onset_weeks: 2 },
                &["Fatigue", "Irritability", "Numbness in the limbs"],
                &["Heavy alcohol users", "Older adults", "People with diabetes"],
            ),
        vitamin(N::VitaminB2, "Vitamin B2", Solubility::WaterSoluble)
            .allowances("mg", [0.4, 0.6, 1.3, 1.0, 1.3, 1.1, 1.4, 1.6, 1.3, 1.1])
            .sources(&["Dairy", "Eggs", "Lean meat", "Almonds"])
            .profile(
                "Ariboflavinosis",
                DailyTurnover { onset_weeks: 8 },
                &["Cracks at the corners of the mouth", "Sore throat", "Skin rash"],
                &["Vegans", "Athletes", "Pregnant women"],
            ),
        vitamin(N::VitaminB3, "Vitamin B3", Solubility::WaterSoluble)
            .allowances("mg", [2.0, 8.0, 16.0, 14.0, 16.0, 14.0, 18.0, 17.0, 16.0, 14.0])
            .sources(&["Poultry", "Fish", "Peanuts", "Fortified cereals"])
            .profile(
                "Pellagra",
                DailyTurnover { onset_weeks: 8 },
                &["Dermatitis", "Diarrhea", "Confusion"],
                &["Heavy alcohol users", "People on maize-based diets"],
            ),
        vitamin(N::VitaminB5, "Vitamin B5", Solubility::WaterSoluble)
            .allowances("mg", [1.8, 3.0, 5.0, 5.0, 5.0, 5.0, 6.0, 7.0, 5.0, 5.0])
            .sources(&["Mushrooms", "Avocado", "Chicken", "Whole grains"])
            .profile(
                "Pantothenic acid deficiency",
                Adaptive,
                &["Burning feet", "Fatigue"],
                &["People with severe malnutrition"],
            ),
        vitamin(N::VitaminB6, "Vitamin B6", Solubility::WaterSoluble)
            .allowances("mg", [0.3, 0.6, 1.3, 1.2, 1.3, 1.3, 1.9, 2.0, 1.7, 1.5])
            .sources(&["Chickpeas", "Tuna", "Salmon", "Potatoes", "Bananas"])
            .profile(
                "Vitamin B6 deficiency",
                DailyTurnover { onset_weeks: 4 },
                &["Microcytic anemia", "Depression", "Cheilitis"],
                &["People with kidney disease", "Heavy alcohol users"],
            ),
        vitamin(N::VitaminB7, "Vitamin B7", Solubility::WaterSoluble)
            .allowances("µg", [5.0, 12.0, 25.0, 25.0, 30.0, 30.0, 30.0, 35.0, 30.0, 30.0])
            .sources(&["Eggs", "Nuts", "Seeds", "Sweet potatoes"])
            .profile(
                "Biotin deficiency",
                Adaptive,
                &["Hair thinning", "Scaly rash"],
                &["People who eat raw egg whites regularly"],
            ),
        vitamin(N::VitaminB9, "Vitamin B9", Solubility::WaterSoluble)
            .allowances("µg DFE", [65.0, 150.0, 400.0, 400.0, 400.0, 400.0, 600.0, 500.0, 400.0, 400.0])
            .sources(&["Leafy greens", "Legumes", "Asparagus", "Fortified grains"])
            .profile(
                "Folate deficiency anemia",
                LongTermStorage { depletion_months: 4 },
                &["Megaloblastic anemia", "Fatigue", "Mouth sores"],
                &["Pregnant women", "Heavy alcohol users"],
            ),
        vitamin(N::VitaminB12, "Vitamin B12", Solubility::WaterSoluble)
            .allowances("µg", [0.4, 1.2, 2.4, 2.4, 2.4, 2.4, 2.6, 2.8, 2.4, 2.4])
            .sources(&["Clams", "Beef liver", "Fish", "Dairy", "Fortified plant milk"])
            .profile(
                "Pernicious anemia",
                LongTermStorage { depletion_months: 36 },
                &["Tingling in hands and feet", "Memory problems", "Fatigue"],
                &["Vegans", "Older adults", "People taking metformin"],
            ),
        vitamin(N::VitaminC, "Vitamin C", Solubility::WaterSoluble)
            .allowances("mg", [40.0, 45.0, 75.0, 65.0, 90.0, 75.0, 85.0, 120.0, 90.0, 75.0])
            .sources(&["Citrus fruits", "Berries", "Bell peppers"])
            .profile(
                "Scurvy",
                DailyTurnover { onset_weeks: 4 },
                &["Bleeding gums", "Slow wound healing", "Joint pain"],
                &["Smokers", "People with limited food variety"],
            ),
        vitamin(N::VitaminD, "Vitamin D", Solubility::FatSoluble)
            .allowances("µg", [10.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 20.0, 20.0])
            .sources(&["Sunlight", "Fatty fish", "Fortified milk"])
            .profile(
                "Rickets / osteomalacia",
                LongTermStorage { depletion_months: 2 },
                &["Bone pain", "Muscle weakness"],
                &["People with little sun exposure", "Older adults", "Breastfed infants"],
            ),
        vitamin(N::VitaminE, "Vitamin E", Solubility::FatSoluble)
            .allowances("mg", [4.0, 7.0, 15.0, 15.0, 15.0, 15.0, 15.0, 19.0, 15.0, 15.0])
            .sources(&["Nuts", "Seeds", "Vegetable oils"])
            .profile(
                "Vitamin E deficiency",
                LongTermStorage { depletion_months: 12 },
                &["Nerve damage", "Muscle weakness", "Vision problems"],
                &["People with fat malabsorption", "Premature infants"],
            ),
        vitamin(N::VitaminK, "Vitamin K", Solubility::FatSoluble)
            .allowances("µg", [2.0, 30.0, 75.0, 75.0, 120.0, 90.0, 90.0, 90.0, 120.0, 90.0])
            .sources(&["Leafy greens", "Vegetable oils"])
            .profile(
                "Vitamin K deficiency bleeding",
                DailyTurnover { onset_weeks: 2 },
                &["Easy bruising", "Excessive bleeding"],
                &["Newborns", "People on long-term antibiotics"],
            ),
        // ====================================================================
        // Minerals
        // ====================================================================
        nutrient(N::Calcium, "Calcium", Mineral)
            .allowances("mg", [200.0, 700.0, 1300.0, 1300.0, 1000.0, 1000.0, 1000.0, 1000.0, 1200.0, 1200.0])
            .sources(&["Cheese", "Yogurt", "Milk", "Sardines with bones", "Spinach", "Tofu", "Fortified plant milk", "Almonds"])
            .profile(
                "Osteoporosis",
                Structural { depletion_months: 12 },
                &["Brittle bones", "Muscle cramps", "Numbness"],
                &["Postmenopausal women", "Vegans", "People with lactose intolerance"],
            ),
        nutrient(N::Magnesium, "Magnesium", Mineral)
            .allowances("mg", [30.0, 130.0, 410.0, 360.0, 420.0, 320.0, 350.0, 310.0, 420.0, 320.0])
            .sources(&["Pumpkin seeds", "Almonds", "Spinach", "Cashews", "Black beans", "Dark chocolate", "Avocado"])
            .profile(
                "Hypomagnesemia",
                Structural { depletion_months: 6 },
                &["Muscle cramps", "Fatigue", "Irregular heartbeat"],
                &["People with type 2 diabetes", "Older adults", "Heavy alcohol users"],
            ),
        nutrient(N::Phosphorus, "Phosphorus", Mineral)
            .allowances("mg", [100.0, 460.0, 1250.0, 1250.0, 700.0, 700.0, 700.0, 700.0, 700.0, 700.0])
            .sources(&["Meat", "Fish", "Dairy products", "Eggs", "Nuts", "Legumes", "Whole grains"])
            .profile(
                "Hypophosphatemia",
                Structural { depletion_months: 12 },
                &["Bone pain", "Weakness", "Loss of appetite"],
                &["People recovering from starvation", "Heavy alcohol users"],
            ),
        nutrient(N::Potassium, "Potassium", Mineral)
            .allowances("mg", [400.0, 3000.0, 4700.0, 4700.0, 4700.0, 4700.0, 4700.0, 5100.0, 4700.0, 4700.0])
            .sources(&["Potatoes", "Bananas", "Spinach", "Beans", "Avocado", "Tomatoes", "Orange juice"])
            .profile(
                "Hypokalemia",
                AcuteRegulated,
                &["Muscle weakness", "Cramps", "Palpitations"],
                &["People taking diuretics", "People with prolonged vomiting or diarrhea"],
            ),
        nutrient(N::Sodium, "Sodium", Mineral)
            .allowances("mg", [120.0, 1000.0, 1500.0, 1500.0, 1500.0, 1500.0, 1500.0, 1500.0, 1500.0, 1500.0])
            .sources(&["Table salt", "Processed foods", "Soy sauce", "Cured meats", "Cheese"])
            .profile(
                "Hyponatremia",
                AcuteRegulated,
                &["Headache", "Nausea", "Confusion"],
                &["Endurance athletes", "Older adults"],
            ),
        nutrient(N::Chloride, "Chloride", Mineral)
            .allowances("g", [0.5, 1.5, 2.3, 2.3, 2.3, 2.3, 2.3, 2.3, 2.3, 2.3])
            .sources(&["Table salt", "Seaweed", "Rye", "Tomatoes", "Lettuce"])
            .profile(
                "Hypochloremia",
                AcuteRegulated,
                &["Dehydration", "Weakness"],
                &["People with prolonged vomiting"],
            ),
        nutrient(N::Iron, "Iron", Mineral)
            .allowances("mg", [11.0, 7.0, 11.0, 15.0, 8.0, 18.0, 27.0, 9.0, 8.0, 8.0])
            .sources(&["Beef liver", "Clams", "Red meat", "Spinach", "Lentils", "Fortified cereals", "Tofu"])
            .profile(
                "Iron-deficiency anemia",
                LongTermStorage { depletion_months: 6 },
                &["Fatigue", "Pale skin", "Shortness of breath"],
                &["Menstruating women", "Pregnant women", "Vegetarians", "Infants"],
            ),
        nutrient(N::Zinc, "Zinc", Mineral)
            .allowances("mg", [3.0, 5.0, 11.0, 9.0, 11.0, 8.0, 11.0, 12.0, 11.0, 8.0])
            .sources(&["Oysters", "Beef", "Crab", "Lamb", "Pumpkin seeds", "Chickpeas", "Cashews"])
            .profile(
                "Zinc deficiency",
                DailyTurnover { onset_weeks: 4 },
                &["Hair loss", "Loss of taste", "Slow wound healing"],
                &["Vegetarians", "Pregnant women", "Older adults"],
            ),
        nutrient(N::Copper, "Copper", Mineral)
            .allowances("mg", [0.22, 0.34, 0.9, 0.9, 0.9, 0.9, 1.0, 1.3, 0.9, 0.9])
            .sources(&["Liver", "Shellfish", "Nuts", "Seeds", "Dark chocolate", "Legumes"])
            .profile(
                "Copper deficiency",
                LongTermStorage { depletion_months: 6 },
                &["Anemia", "Neutropenia", "Numbness"],
                &["People taking high-dose zinc", "People after bariatric surgery"],
            ),
        nutrient(N::Manganese, "Manganese", Mineral)
            .allowances("mg", [0.003, 1.2, 2.2, 1.6, 2.3, 1.8, 2.0, 2.6, 2.3, 1.8])
            .sources(&["Nuts", "Whole grains", "Legumes", "Pineapple", "Leafy vegetables", "Tea"])
            .profile(
                "Manganese deficiency",
                Adaptive,
                &["Impaired growth", "Skin rash"],
                &["People on long-term parenteral nutrition"],
            ),
        nutrient(N::Iodine, "Iodine", Mineral)
            .allowances("µg", [110.0, 90.0, 150.0, 150.0, 150.0, 150.0, 220.0, 290.0, 150.0, 150.0])
            .sources(&["Seaweed", "Iodized salt", "Dairy", "Fish", "Eggs"])
            .profile(
                "Goiter",
                LongTermStorage { depletion_months: 3 },
                &["Neck swelling", "Fatigue", "Weight gain"],
                &["Pregnant women", "People avoiding iodized salt"],
            ),
        nutrient(N::Selenium, "Selenium", Mineral)
            .allowances("µg", [15.0, 20.0, 55.0, 55.0, 55.0, 55.0, 60.0, 70.0, 55.0, 55.0])
            .sources(&["Brazil nuts", "Seafood", "Meat", "Eggs", "Cereal grains"])
            .profile(
                "Selenium deficiency",
                LongTermStorage { depletion_months: 6 },
                &["Muscle weakness", "Fatigue", "Hair loss"],
                &["People on dialysis", "People living in selenium-poor regions"],
            ),
        nutrient(N::Molybdenum, "Molybdenum", Mineral)
            .allowances("µg", [2.0, 17.0, 45.0, 43.0, 45.0, 45.0, 50.0, 50.0, 45.0, 45.0])
            .sources(&["Legumes", "Grains", "Nuts", "Organ meats"])
            .profile(
                "Molybdenum deficiency",
                Adaptive,
                &["Rapid heartbeat", "Headache"],
                &["People on long-term parenteral nutrition"],
            ),
        nutrient(N::Chromium, "Chromium", Mineral)
            .allowances("µg", [0.0, 11.0, 35.0, 25.0, 35.0, 25.0, 30.0, 45.0, 35.0, 25.0])
            .sources(&["Whole grains", "Meat", "Broccoli", "Grape juice", "Potatoes"])
            .profile(
                "Chromium deficiency",
                Adaptive,
                &["Impaired glucose tolerance"],
                &["People on long-term parenteral nutrition"],
            ),
        nutrient(N::Fluoride, "Fluoride", Mineral)
            .allowances("mg", [0.01, 0.5, 4.0, 3.0, 4.0, 3.0, 3.0, 3.0, 4.0, 3.0])
            .sources(&["Fluoridated water", "Tea", "Fish with bones", "Toothpaste ingestion (non-food source)"])
            .profile(
                "Dental caries",
                Structural { depletion_months: 24 },
                &["Tooth decay"],
                &["Children without fluoridated water"],
            ),
        // ====================================================================
        // Macronutrients
        // ====================================================================
        nutrient(N::Carbohydrates, "Carbohydrates", Macronutrient)
            .allowances("g", [60.0, 130.0, 130.0, 130.0, 130.0, 130.0, 175.0, 210.0, 130.0, 130.0])
            .sources(&["Whole grains", "Rice", "Wheat", "Oats", "Potatoes", "Fruits", "Legumes"])
            .profile(
                "Carbohydrate restriction",
                Adaptive,
                &["Fatigue", "Headache"],
                &["Endurance athletes"],
            ),
        nutrient(N::Proteins, "Proteins", Macronutrient)
            .allowances("g", [9.0, 19.0, 52.0, 46.0, 56.0, 46.0, 71.0, 71.0, 56.0, 46.0])
            .sources(&["Meat", "Fish", "Eggs", "Dairy", "Soy products", "Legumes", "Nuts", "Seeds"])
            .profile(
                "Protein-energy malnutrition",
                DailyTurnover { onset_weeks: 4 },
                &["Muscle wasting", "Edema", "Weakened immunity"],
                &["Older adults", "People with eating disorders"],
            ),
        nutrient(N::Fats, "Total Fat", Macronutrient)
            .allowances("g", [31.0, 25.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0])
            .sources(&["Olive oil", "Nuts", "Seeds", "Avocado", "Fatty fish", "Butter", "Cheese"])
            .profile(
                "Essential fatty acid deficiency",
                LongTermStorage { depletion_months: 3 },
                &["Dry, scaly skin", "Hair loss", "Poor wound healing"],
                &["People on very low-fat diets", "People with fat malabsorption"],
            ),
        nutrient(N::Water, "Water", Macronutrient)
            .allowances("L", [0.7, 1.3, 3.3, 2.3, 3.7, 2.7, 3.0, 3.8, 3.7, 2.7])
            .sources(&["Water", "Beverages", "Fruits", "Vegetables"])
            .profile(
                "Dehydration",
                DailyEssential { onset_hours: 72 },
                &["Thirst", "Dark urine", "Dizziness"],
                &["Older adults", "Infants", "Athletes"],
            ),
        nutrient(N::Fiber, "Fiber", Macronutrient)
            .allowances("g", [0.0, 19.0, 38.0, 26.0, 38.0, 25.0, 28.0, 29.0, 30.0, 21.0])
            .sources(&["Whole grains", "Fruits", "Vegetables", "Legumes", "Nuts", "Seeds"]),
    ];

    KnowledgeBase::from_records(records.into_iter().map(RecordBuilder::build))
}

// ============================================================================
// Record builder
// ============================================================================

struct RecordBuilder(NutrientRecord);

fn nutrient(nutrient: NutrientType, name: &str, category: NutrientCategory) -> RecordBuilder {
    RecordBuilder(NutrientRecord {
        nutrient,
        name: name.into(),
        category,
        solubility: None,
        allowances: HashMap::new(),
        dietary_sources: Vec::new(),
        deficiency_profile: None,
    })
}

fn vitamin(n: NutrientType, name: &str, solubility: Solubility) -> RecordBuilder {
    let mut builder = nutrient(n, name, NutrientCategory::Vitamin);
    builder.0.solubility = Some(solubility);
    builder
}

impl RecordBuilder {
    /// Values follow `DemographicGroup::ALL` order
    fn allowances(mut self, unit: &str, values: [f64; 10]) -> Self {
        self.0.allowances = DemographicGroup::ALL
            .iter()
            .zip(values)
            .map(|(group, value)| (*group, Amount::new(value, unit)))
            .collect();
        self
    }

    fn sources(mut self, sources: &[&str]) -> Self {
        self.0.dietary_sources = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    fn profile(
        mut self,
        common_name: &str,
        risk_model: RiskModel,
        key_symptoms: &[&str],
        at_risk_populations: &[&str],
    ) -> Self {
        self.0.deficiency_profile = Some(DeficiencyProfile {
            common_name: common_name.into(),
            risk_model,
            key_symptoms: key_symptoms.iter().map(|s| s.to_string()).collect(),
            at_risk_populations: at_risk_populations.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    fn build(self) -> NutrientRecord {
        self.0
    }
}
