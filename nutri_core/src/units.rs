//! Unit conversion for nutrient amounts.
//!
//! Supports metric mass scaling, litre/millilitre, and the two
//! vitamin-specific international unit mappings (vitamin A and D).
//! Qualified units such as `µg RAE` or `µg DFE` only convert to themselves
//! (and to IU where a mapping exists).

use crate::knowledge::KnowledgeBase;
use crate::{Amount, Error, FoodEntry, NutrientType, Result};

/// µg RAE per IU of vitamin A is 1/3.33
const VITAMIN_A_IU_PER_UG_RAE: f64 = 3.33;
/// 1 µg of vitamin D = 40 IU
const VITAMIN_D_IU_PER_UG: f64 = 40.0;

/// Canonical spelling for unit aliases
fn canonical_unit(unit: &str) -> &str {
    match unit.trim() {
        "ug" | "mcg" | "μg" => "µg",
        "ml" | "mL" => "ml",
        "l" => "L",
        "iu" => "IU",
        other => other,
    }
}

/// Scale of a plain mass unit relative to one microgram
fn mass_in_micrograms(unit: &str) -> Option<f64> {
    match unit {
        "g" => Some(1_000_000.0),
        "mg" => Some(1_000.0),
        "µg" => Some(1.0),
        _ => None,
    }
}

fn volume_in_millilitres(unit: &str) -> Option<f64> {
    match unit {
        "L" => Some(1_000.0),
        "ml" => Some(1.0),
        _ => None,
    }
}

/// Convert an amount of a nutrient into `target` unit
pub fn convert(nutrient: NutrientType, amount: &Amount, target: &str) -> Result<Amount> {
    let from = canonical_unit(&amount.unit);
    let to = canonical_unit(target);

    if from == to {
        return Ok(Amount::new(amount.value, target));
    }

    if let (Some(a), Some(b)) = (mass_in_micrograms(from), mass_in_micrograms(to)) {
        return Ok(Amount::new(amount.value * a / b, target));
    }

    if let (Some(a), Some(b)) = (volume_in_millilitres(from), volume_in_millilitres(to)) {
        return Ok(Amount::new(amount.value * a / b, target));
    }

    let value = match (nutrient, from, to) {
        (NutrientType::VitaminA, "IU", "µg RAE") => Some(amount.value / VITAMIN_A_IU_PER_UG_RAE),
        (NutrientType::VitaminA, "µg RAE", "IU") => Some(amount.value * VITAMIN_A_IU_PER_UG_RAE),
        (NutrientType::VitaminD, "IU", _) => {
            mass_in_micrograms(to).map(|scale| amount.value / VITAMIN_D_IU_PER_UG / scale)
        }
        (NutrientType::VitaminD, _, "IU") => {
            mass_in_micrograms(from).map(|scale| amount.value * scale * VITAMIN_D_IU_PER_UG)
        }
        _ => None,
    };

    value
        .map(|v| Amount::new(v, target))
        .ok_or_else(|| Error::UnitConversion {
            nutrient,
            from: amount.unit.clone(),
            to: target.to_string(),
        })
}

/// Rewrite every nutrient amount of an entry into the knowledge base's unit
///
/// Fails with `Error::UnitConversion` if a known nutrient is given in a unit
/// that has no conversion. Nutrients without a reference unit pass through.
pub fn normalize_entry(knowledge: &KnowledgeBase, mut entry: FoodEntry) -> Result<FoodEntry> {
    for (nutrient, amount) in entry.nutrients.iter_mut() {
        let Some(unit) = knowledge.record(*nutrient).and_then(|r| r.unit()) else {
            continue;
        };
        *amount = convert(*nutrient, amount, unit)?;
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::build_default_knowledge_base;
    use chrono::Utc;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mass_scaling() {
        let grams = Amount::new(1.0, "g");
        let mg = convert(NutrientType::Calcium, &grams, "mg").unwrap();
        assert_eq!(mg, Amount::new(1000.0, "mg"));

        let mcg = Amount::new(500.0, "mcg");
        let mg = convert(NutrientType::Iodine, &mcg, "mg").unwrap();
        assert!(approx(mg.value, 0.5));
    }

    #[test]
    fn test_alias_keeps_target_spelling() {
        let converted = convert(NutrientType::VitaminB12, &Amount::new(2.4, "ug"), "µg").unwrap();
        assert_eq!(converted, Amount::new(2.4, "µg"));
    }

    #[test]
    fn test_vitamin_d_international_units() {
        let iu = Amount::new(400.0, "IU");
        let ug = convert(NutrientType::VitaminD, &iu, "µg").unwrap();
        assert!(approx(ug.value, 10.0));

        let back = convert(NutrientType::VitaminD, &ug, "IU").unwrap();
        assert!(approx(back.value, 400.0));
    }

    #[test]
    fn test_vitamin_a_international_units() {
        let iu = Amount::new(3330.0, "IU");
        let rae = convert(NutrientType::VitaminA, &iu, "µg RAE").unwrap();
        assert!(approx(rae.value, 1000.0));
    }

    #[test]
    fn test_iu_not_defined_for_other_nutrients() {
        let result = convert(NutrientType::VitaminC, &Amount::new(100.0, "IU"), "mg");
        assert!(matches!(result, Err(Error::UnitConversion { .. })));
    }

    #[test]
    fn test_qualified_units_do_not_scale() {
        let result = convert(NutrientType::VitaminB9, &Amount::new(400.0, "µg"), "µg DFE");
        assert!(result.is_err());
    }

    #[test]
    fn test_volume_scaling() {
        let ml = Amount::new(250.0, "ml");
        let litres = convert(NutrientType::Water, &ml, "L").unwrap();
        assert!(approx(litres.value, 0.25));
    }

    #[test]
    fn test_normalize_entry() {
        let kb = build_default_knowledge_base();
        let entry = FoodEntry::new("Cheese", Utc::now())
            .with_nutrient(NutrientType::Calcium, Amount::new(0.2, "g"))
            .with_nutrient(NutrientType::Iron, Amount::new(2.0, "mg"));

        let normalized = normalize_entry(&kb, entry).unwrap();
        let calcium = normalized.amount_of(NutrientType::Calcium).unwrap();
        assert_eq!(calcium.unit, "mg");
        assert!(approx(calcium.value, 200.0));
        assert_eq!(
            normalized.amount_of(NutrientType::Iron),
            Some(&Amount::new(2.0, "mg"))
        );
    }

    #[test]
    fn test_normalize_entry_rejects_unconvertible_unit() {
        let kb = build_default_knowledge_base();
        let entry = FoodEntry::new("Supplement", Utc::now())
            .with_nutrient(NutrientType::Calcium, Amount::new(0.2, "g"))
            .with_nutrient(NutrientType::VitaminC, Amount::new(5.0, "IU"));

        let result = normalize_entry(&kb, entry);
        assert!(matches!(
            result,
            Err(Error::UnitConversion { nutrient: NutrientType::VitaminC, .. })
        ));
    }
}
