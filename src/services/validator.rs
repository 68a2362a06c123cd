// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Safety thresholds for computed nutrition targets.
//!
//! The validator reports every violation it finds; deciding whether to
//! persist is the caller's job.

use crate::services::calculator::NutritionCalculationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_CALORIES: i64 = 1200;
pub const MAX_CALORIES: i64 = 5000;
pub const MIN_PROTEIN_GRAMS: i64 = 50;
pub const MIN_FAT_GRAMS: i64 = 30;
pub const MIN_CARBS_GRAMS: i64 = 50;
/// Allowed fat share of macro calories, in percent.
pub const MIN_FAT_PERCENTAGE: f64 = 20.0;
pub const MAX_FAT_PERCENTAGE: f64 = 35.0;

/// Which target a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationField {
    Calories,
    Protein,
    Fats,
    Carbs,
    FatsPercentage,
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationField::Calories => "calories",
            ValidationField::Protein => "protein",
            ValidationField::Fats => "fats",
            ValidationField::Carbs => "carbs",
            ValidationField::FatsPercentage => "fatsPercentage",
        };
        f.write_str(name)
    }
}

/// A single threshold violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: ValidationField,
    pub message: String,
}

impl ValidationError {
    fn new(field: ValidationField, message: String) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a calculation against the safety thresholds.
///
/// Checks run in a fixed order (calories low, calories high, protein, fat,
/// carbs, fat percentage) and all violations are returned. An empty vector
/// means the plan is acceptable.
pub fn validate_nutrition_targets(result: &NutritionCalculationResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if result.adjusted_calories < MIN_CALORIES {
        errors.push(ValidationError::new(
            ValidationField::Calories,
            format!(
                "Daily calories ({}) are below the safe minimum of {}. Please adjust your goals.",
                result.adjusted_calories, MIN_CALORIES
            ),
        ));
    }

    if result.adjusted_calories > MAX_CALORIES {
        errors.push(ValidationError::new(
            ValidationField::Calories,
            format!(
                "Daily calories ({}) exceed the maximum of {}. Please review your activity level and goals.",
                result.adjusted_calories, MAX_CALORIES
            ),
        ));
    }

    if result.protein_grams < MIN_PROTEIN_GRAMS {
        errors.push(ValidationError::new(
            ValidationField::Protein,
            format!(
                "Protein target ({}g) is below the safe minimum of {}g.",
                result.protein_grams, MIN_PROTEIN_GRAMS
            ),
        ));
    }

    if result.fats_grams < MIN_FAT_GRAMS {
        errors.push(ValidationError::new(
            ValidationField::Fats,
            format!(
                "Fat target ({}g) is below the safe minimum of {}g. Fats are essential for hormone production.",
                result.fats_grams, MIN_FAT_GRAMS
            ),
        ));
    }

    // Also catches negative carbs from the remainder calculation
    if result.carbs_grams < MIN_CARBS_GRAMS {
        errors.push(ValidationError::new(
            ValidationField::Carbs,
            format!(
                "Carbohydrate target ({}g) is below the safe minimum of {}g.",
                result.carbs_grams, MIN_CARBS_GRAMS
            ),
        ));
    }

    if result.fats_percentage < MIN_FAT_PERCENTAGE || result.fats_percentage > MAX_FAT_PERCENTAGE
    {
        errors.push(ValidationError::new(
            ValidationField::FatsPercentage,
            format!(
                "Fat percentage ({:.1}%) should be between {}% and {}% of total calories.",
                result.fats_percentage, MIN_FAT_PERCENTAGE, MAX_FAT_PERCENTAGE
            ),
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> NutritionCalculationResult {
        NutritionCalculationResult {
            bmr: 1780.0,
            tdee: 2759,
            adjusted_calories: 2259,
            protein_grams: 176,
            carbs_grams: 247,
            fats_grams: 63,
            protein_calories: 704,
            carbs_calories: 988,
            fats_calories: 567,
            protein_percentage: 31.16,
            carbs_percentage: 43.74,
            fats_percentage: 25.10,
        }
    }

    #[test]
    fn test_healthy_plan_has_no_errors() {
        assert!(validate_nutrition_targets(&healthy()).is_empty());
    }

    #[test]
    fn test_low_calories_flagged() {
        let result = NutritionCalculationResult {
            adjusted_calories: 1000,
            ..healthy()
        };
        let errors = validate_nutrition_targets(&result);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, ValidationField::Calories);
        assert!(errors[0].message.contains("below the safe minimum of 1200"));
    }

    #[test]
    fn test_high_calories_flagged() {
        let result = NutritionCalculationResult {
            adjusted_calories: 5200,
            ..healthy()
        };
        let errors = validate_nutrition_targets(&result);
        assert_eq!(errors[0].field, ValidationField::Calories);
        assert!(errors[0].message.contains("exceed the maximum of 5000"));
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        let result = NutritionCalculationResult {
            adjusted_calories: 1200,
            protein_grams: 50,
            fats_grams: 30,
            carbs_grams: 50,
            fats_percentage: 35.0,
            ..healthy()
        };
        assert!(validate_nutrition_targets(&result).is_empty());

        let result = NutritionCalculationResult {
            adjusted_calories: 5000,
            fats_percentage: 20.0,
            ..healthy()
        };
        assert!(validate_nutrition_targets(&result).is_empty());
    }

    #[test]
    fn test_fat_percentage_out_of_range() {
        let result = NutritionCalculationResult {
            fats_percentage: 15.0,
            ..healthy()
        };
        let errors = validate_nutrition_targets(&result);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, ValidationField::FatsPercentage);
        assert_eq!(
            errors[0].message,
            "Fat percentage (15.0%) should be between 20% and 35% of total calories."
        );
    }

    #[test]
    fn test_all_violations_reported_in_order() {
        let result = NutritionCalculationResult {
            adjusted_calories: 900,
            protein_grams: 40,
            fats_grams: 20,
            carbs_grams: -10,
            fats_percentage: 40.0,
            ..healthy()
        };
        let fields: Vec<ValidationField> = validate_nutrition_targets(&result)
            .into_iter()
            .map(|e| e.field)
            .collect();

        assert_eq!(
            fields,
            vec![
                ValidationField::Calories,
                ValidationField::Protein,
                ValidationField::Fats,
                ValidationField::Carbs,
                ValidationField::FatsPercentage,
            ]
        );
    }

    #[test]
    fn test_field_tags_serialize_like_client() {
        assert_eq!(
            serde_json::to_string(&ValidationField::FatsPercentage).unwrap(),
            "\"fatsPercentage\""
        );
        assert_eq!(ValidationField::Carbs.to_string(), "carbs");
    }
}
